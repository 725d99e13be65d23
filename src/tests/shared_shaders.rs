// -- < Shaders and helpers shared by the rendering tests > ---------------------------
pub mod shaders {
    use std::sync::Arc;

    use crate::prelude::*;

    pub const VERTEX_SOURCE: &str = "
        #version 330 core
        in vec3 position;
        out vec3 world_position;
        uniform mat4 view_projection;

        void main() {
            world_position = position;
            gl_Position = view_projection * vec4(position, 1.0);
        }
    ";

    pub const FRAGMENT_SOURCE: &str = "
        #version 330 core
        in vec3 world_position;
        out vec4 frag_color;
        uniform vec4 color;

        void main() {
            frag_color = color;
        }
    ";

    /// Reads an input the vertex stage never writes
    pub const MISMATCHED_FRAGMENT_SOURCE: &str = "
        #version 330 core
        in vec2 texture_coords;
        out vec4 frag_color;
        uniform sampler2D albedo;

        void main() {
            frag_color = texture(albedo, texture_coords);
        }
    ";

    pub const BROKEN_SOURCE: &str = "
        #version 330 core
        out vec4 frag_color;
    ";

    pub fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub fn headless_context() -> (Arc<HeadlessRenderBackend>, RenderContext) {
        init_logging();
        let backend = Arc::new(HeadlessRenderBackend::new());
        let context = RenderContext::new(backend.clone());
        (backend, context)
    }

    pub fn compile_stages(context: &RenderContext) -> (ShaderObject, ShaderObject) {
        let vertex = ShaderObject::compile(context, ShaderStage::Vertex, VERTEX_SOURCE)
            .expect("Vertex shader should compile");
        let fragment = ShaderObject::compile(context, ShaderStage::Fragment, FRAGMENT_SOURCE)
            .expect("Fragment shader should compile");
        (vertex, fragment)
    }

    pub fn linked_program(context: &RenderContext) -> ProgramResource {
        let (vertex, fragment) = compile_stages(context);
        let mut program = ProgramResource::new(context);
        program
            .link(&[&vertex, &fragment])
            .expect("Program should link");
        program
    }
}
