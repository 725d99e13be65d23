// -- < Testing shader objects > ---------------------------
#[cfg(test)]
pub mod shader_test {
    use crate::prelude::*;

    use super::super::shared_shaders::shaders::*;

    #[test]
    fn test_compile_and_drop() {
        let (backend, context) = headless_context();
        let shader = ShaderObject::compile(&context, ShaderStage::Vertex, VERTEX_SOURCE)
            .expect("Vertex shader should compile");

        assert_eq!(shader.stage(), ShaderStage::Vertex);
        assert!(shader.handle().is_valid());
        assert_eq!(backend.live_shaders(), 1);

        drop(shader);
        assert_eq!(backend.live_shaders(), 0);
        assert_eq!(backend.stats().shaders_deleted, 1);
    }

    #[test]
    fn test_compilation_error() {
        let (backend, context) = headless_context();

        match ShaderObject::compile(&context, ShaderStage::Fragment, BROKEN_SOURCE) {
            Err(ShaderError::CompilationError(info_log)) => assert!(info_log.contains("main")),
            other => panic!("Expected a compilation error, got {:?}", other),
        }
        assert_eq!(backend.live_shaders(), 0);
    }

    #[test]
    fn test_shader_allocation_failure() {
        let (backend, context) = headless_context();
        backend.set_fail_allocations(true);

        assert!(matches!(
            ShaderObject::compile(&context, ShaderStage::Vertex, VERTEX_SOURCE),
            Err(ShaderError::Allocation(_))
        ));
    }

    #[test]
    fn test_shader_deleted_while_attached() {
        let (backend, _context) = headless_context();
        let program = backend.create_program().unwrap();
        let shader = backend
            .compile_shader(ShaderStage::Vertex, VERTEX_SOURCE)
            .unwrap();

        backend.attach_shader(program, shader);
        backend.delete_shader(shader);
        // Still alive until detached
        assert_eq!(backend.live_shaders(), 1);
        assert!(backend.link_program(program).is_ok());

        backend.detach_shader(program, shader);
        assert_eq!(backend.live_shaders(), 0);
        backend.delete_program(program);
        assert_eq!(backend.stats().invalid_calls, 0);
    }

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(ShaderDataType::Float3.get_size(), 12);
        assert_eq!(ShaderDataType::Mat4.get_size(), 64);
        assert_eq!(ShaderDataType::from_glsl("mat3"), Some(ShaderDataType::Mat3));
        assert_eq!(ShaderDataType::from_glsl("sampler2D"), Some(ShaderDataType::Int));
        assert_eq!(ShaderDataType::from_glsl("dvec2"), None);
    }
}
