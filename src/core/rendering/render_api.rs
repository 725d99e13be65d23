use std::sync::Arc;

use proto_gfx::core::platform::headless::HeadlessRenderBackend;
use proto_gfx::core::rendering::handle::{ProgramHandle, ShaderHandle};
use proto_gfx::core::rendering::shader::{ShaderError, ShaderStage};
use proto_gfx::core::rendering::uniform::{UniformBinding, UniformValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum API {
    OpenGL,
    Headless,
}

/// This is the behaviour that a render api instance should implement,
/// translating the platform-specific details of the API to this trait.
///
/// Every call is a synchronous driver round-trip. Handles passed in are the
/// ones the same backend handed out earlier.
pub trait RenderBackend: Send + Sync {
    fn get_api(&self) -> API;

    // Resource creation and destruction
    fn create_program(&self) -> Result<ProgramHandle, String>;
    fn delete_program(&self, program: ProgramHandle);
    /// Create a shader object of the given stage and compile `source` into it.
    /// On failure the shader object is already released.
    fn compile_shader(&self, stage: ShaderStage, source: &str)
        -> Result<ShaderHandle, ShaderError>;
    fn delete_shader(&self, shader: ShaderHandle);

    // Linking
    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle);
    fn detach_shader(&self, program: ProgramHandle, shader: ShaderHandle);
    /// Link the attached stages. The error holds the driver's info log
    fn link_program(&self, program: ProgramHandle) -> Result<(), String>;

    // Bindings
    fn use_program(&self, program: Option<ProgramHandle>);
    fn current_program(&self) -> Option<ProgramHandle>;

    // Operations: Programs
    fn get_uniform_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;
    fn get_attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;
    fn set_uniform(&self, binding: &UniformBinding, value: &UniformValue);
}

pub type RenderBackendPtr = Arc<dyn RenderBackend>;

/// RenderContext is what you use to interface with the backend driving one
/// rendering context.
///
/// It's a cheap shared reference: resources created from it keep a clone
/// so they can release their driver objects when dropped. The "current
/// program" slot belongs to the context, not to any program, so it is
/// cleared through [RenderContext::deactivate_program].
#[derive(Clone)]
pub struct RenderContext {
    backend: RenderBackendPtr,
}

impl RenderContext {
    pub fn new(backend: RenderBackendPtr) -> Self {
        log::info!("Render context created for {:?} backend", backend.get_api());
        RenderContext { backend }
    }

    /// Context over an in-memory backend, no GPU needed
    pub fn headless() -> Self {
        Self::new(Arc::new(HeadlessRenderBackend::new()))
    }

    #[inline(always)]
    pub fn backend(&self) -> &RenderBackendPtr {
        &self.backend
    }

    pub fn get_current_api(&self) -> API {
        self.backend.get_api()
    }

    /// Clear the current program slot. Whatever program was active stops
    /// being used for draws
    pub fn deactivate_program(&self) {
        self.backend.use_program(None);
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.backend.current_program()
    }

    /// Upload a value through a binding resolved by
    /// [ProgramResource::get_uniform](super::program::ProgramResource::get_uniform).
    /// Absent bindings are ignored.
    pub fn set_uniform(&self, binding: &UniformBinding, value: impl Into<UniformValue>) {
        if !binding.is_active() {
            return;
        }
        self.backend.set_uniform(binding, &value.into());
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("api", &self.backend.get_api())
            .finish()
    }
}
