pub use crate::core::platform::headless::{BackendStats, HeadlessRenderBackend};
pub use crate::core::platform::opengl::OpenGLRenderBackend;
pub use crate::core::rendering::handle::{ProgramHandle, ShaderHandle};
pub use crate::core::rendering::program::{ProgramError, ProgramResource, ProgramState};
pub use crate::core::rendering::render_api::{RenderBackend, RenderBackendPtr, RenderContext, API};
pub use crate::core::rendering::shader::{ShaderDataType, ShaderError, ShaderObject, ShaderStage};
pub use crate::core::rendering::uniform::{UniformBinding, UniformValue};
