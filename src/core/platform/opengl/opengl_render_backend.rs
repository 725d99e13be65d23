use std::num::NonZeroU32;

use glow::{Context, HasContext, NativeProgram, NativeShader, NativeUniformLocation};
use glutin::context::PossiblyCurrentContext;
use glutin::display::{GetGlDisplay, GlDisplay};
use parking_lot::RwLock;

use proto_gfx::core::rendering::handle::{ProgramHandle, ShaderHandle};
use proto_gfx::core::rendering::render_api::{RenderBackend, API};
use proto_gfx::core::rendering::shader::{ShaderError, ShaderStage};
use proto_gfx::core::rendering::uniform::{UniformBinding, UniformValue};

/// Note that the gl context wrapped by this backend is thread local.
///
/// If the backend is created in the render thread, as intended, there will
/// be no problem. But if it's created in the main thread along with the
/// window and then moved, the context has to be made current again in the
/// thread that uses it.
pub struct OpenGLRenderBackend {
    gl: RwLock<Context>,
}

unsafe impl Send for OpenGLRenderBackend {}
unsafe impl Sync for OpenGLRenderBackend {}

impl OpenGLRenderBackend {
    pub fn new(gl: Context) -> Self {
        let backend = OpenGLRenderBackend {
            gl: RwLock::new(gl),
        };
        backend.init();
        backend
    }

    /// Load gl functions from a glutin context that is current in this thread
    pub fn from_glutin_context(context: &PossiblyCurrentContext) -> Self {
        Self::new(glow_context(context))
    }

    fn init(&self) {
        log::info!("Glow OpenGL successfully initialized!");
        log::info!("\tOpenGL Version: {}", self.get_string(glow::VERSION));
        log::info!("\tOpenGL Renderer: {}", self.get_string(glow::RENDERER));
        log::info!("\tOpenGL Vendor: {}", self.get_string(glow::VENDOR));
    }

    #[inline(always)]
    fn get_string(&self, variant: u32) -> String {
        unsafe { self.gl.read().get_parameter_string(variant) }
    }
}

impl RenderBackend for OpenGLRenderBackend {
    fn get_api(&self) -> API {
        API::OpenGL
    }

    fn create_program(&self) -> Result<ProgramHandle, String> {
        let program = unsafe { self.gl.read().create_program()? };
        Ok(ProgramHandle::from_raw(program.0.get()))
    }

    fn delete_program(&self, program: ProgramHandle) {
        if let Some(program) = native_program(program) {
            unsafe { self.gl.read().delete_program(program) }
        }
    }

    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderHandle, ShaderError> {
        let gl = self.gl.read();
        unsafe {
            let shader = gl
                .create_shader(gl_shader_type(stage))
                .map_err(ShaderError::Allocation)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            // Check if compilation for this shader went ok
            if !gl.get_shader_compile_status(shader) {
                let info_log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);

                log::error!("Error compiling {:?} shader: {}", stage, info_log);
                return Err(ShaderError::CompilationError(info_log));
            }

            Ok(ShaderHandle::from_raw(shader.0.get()))
        }
    }

    fn delete_shader(&self, shader: ShaderHandle) {
        if let Some(shader) = native_shader(shader) {
            unsafe { self.gl.read().delete_shader(shader) }
        }
    }

    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        if let (Some(program), Some(shader)) = (native_program(program), native_shader(shader)) {
            unsafe { self.gl.read().attach_shader(program, shader) }
        }
    }

    fn detach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        if let (Some(program), Some(shader)) = (native_program(program), native_shader(shader)) {
            unsafe { self.gl.read().detach_shader(program, shader) }
        }
    }

    fn link_program(&self, program: ProgramHandle) -> Result<(), String> {
        let program =
            native_program(program).ok_or_else(|| "invalid program handle".to_string())?;
        let gl = self.gl.read();
        unsafe {
            gl.link_program(program);
            if !gl.get_program_link_status(program) {
                return Err(gl.get_program_info_log(program));
            }
        }
        Ok(())
    }

    fn use_program(&self, program: Option<ProgramHandle>) {
        unsafe { self.gl.read().use_program(program.and_then(native_program)) }
    }

    fn current_program(&self) -> Option<ProgramHandle> {
        let current = unsafe { self.gl.read().get_parameter_i32(glow::CURRENT_PROGRAM) };
        match current {
            0 => None,
            id => Some(ProgramHandle::from_raw(id as u32)),
        }
    }

    fn get_uniform_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        let program = native_program(program)?;
        let location = unsafe { self.gl.read().get_uniform_location(program, name) };
        location.map(|location| location.0)
    }

    fn get_attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        let program = native_program(program)?;
        unsafe { self.gl.read().get_attrib_location(program, name) }
    }

    fn set_uniform(&self, binding: &UniformBinding, value: &UniformValue) {
        let Some(location) = binding.location().map(NativeUniformLocation) else {
            return;
        };
        let location = Some(&location);
        let gl = self.gl.read();

        unsafe {
            match *value {
                UniformValue::Float(v) => gl.uniform_1_f32(location, v),
                UniformValue::Float2(v) => gl.uniform_2_f32(location, v.x, v.y),
                UniformValue::Float3(v) => gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Float4(v) => gl.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Int(v) => gl.uniform_1_i32(location, v),
                UniformValue::Int2(v) => gl.uniform_2_i32(location, v.x, v.y),
                UniformValue::Int3(v) => gl.uniform_3_i32(location, v.x, v.y, v.z),
                UniformValue::Int4(v) => gl.uniform_4_i32(location, v.x, v.y, v.z, v.w),
                UniformValue::Bool(v) => gl.uniform_1_i32(location, v as i32),
                UniformValue::Mat3(v) => {
                    gl.uniform_matrix_3_f32_slice(location, false, &v.to_cols_array())
                }
                UniformValue::Mat4(v) => {
                    gl.uniform_matrix_4_f32_slice(location, false, &v.to_cols_array())
                }
            }
        }
    }
}

fn gl_shader_type(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        ShaderStage::TessControl => glow::TESS_CONTROL_SHADER,
        ShaderStage::TessEvaluation => glow::TESS_EVALUATION_SHADER,
        ShaderStage::Compute => glow::COMPUTE_SHADER,
    }
}

#[inline(always)]
fn native_program(program: ProgramHandle) -> Option<NativeProgram> {
    NonZeroU32::new(program.raw()).map(NativeProgram)
}

#[inline(always)]
fn native_shader(shader: ShaderHandle) -> Option<NativeShader> {
    NonZeroU32::new(shader.raw()).map(NativeShader)
}

fn glow_context(context: &PossiblyCurrentContext) -> glow::Context {
    unsafe {
        glow::Context::from_loader_function_cstr(|s| context.display().get_proc_address(s).cast())
    }
}
