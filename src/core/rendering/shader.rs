use thiserror::Error;

use super::handle::ShaderHandle;
use super::render_api::{RenderBackendPtr, RenderContext};

/// Possible uniform data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderDataType {
    None,
    Float,
    Float2,
    Float3,
    Float4,
    Mat3,
    Mat4,
    Int,
    Int2,
    Int3,
    Int4,
    Bool,
}

impl ShaderDataType {
    /// Size in bytes for this data type
    pub fn get_size(&self) -> u32 {
        match self {
            ShaderDataType::None => 0,
            ShaderDataType::Float | ShaderDataType::Int => 4,
            ShaderDataType::Float2 | ShaderDataType::Int2 => 2 * 4,
            ShaderDataType::Float3 | ShaderDataType::Int3 => 3 * 4,
            ShaderDataType::Float4 | ShaderDataType::Int4 => 4 * 4,
            ShaderDataType::Mat3 => 3 * 3 * 4,
            ShaderDataType::Mat4 => 4 * 4 * 4,
            ShaderDataType::Bool => 1,
        }
    }

    /// Parse a GLSL type keyword, `None` for types we don't upload (samplers
    /// are uploaded as `Int`)
    pub fn from_glsl(keyword: &str) -> Option<ShaderDataType> {
        let data_type = match keyword {
            "float" => ShaderDataType::Float,
            "vec2" => ShaderDataType::Float2,
            "vec3" => ShaderDataType::Float3,
            "vec4" => ShaderDataType::Float4,
            "mat3" => ShaderDataType::Mat3,
            "mat4" => ShaderDataType::Mat4,
            "int" => ShaderDataType::Int,
            "ivec2" => ShaderDataType::Int2,
            "ivec3" => ShaderDataType::Int3,
            "ivec4" => ShaderDataType::Int4,
            "bool" => ShaderDataType::Bool,
            sampler if sampler.starts_with("sampler") => ShaderDataType::Int,
            _ => return None,
        };
        Some(data_type)
    }
}

/// Pipeline stage a shader object is compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl ShaderStage {
    /// Order in which stages run in the graphics pipeline
    pub fn pipeline_order(&self) -> u8 {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::TessControl => 1,
            ShaderStage::TessEvaluation => 2,
            ShaderStage::Geometry => 3,
            ShaderStage::Fragment => 4,
            ShaderStage::Compute => 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    /// Could not compile this shader
    #[error("could not compile shader: {0}")]
    CompilationError(String),
    /// The driver could not create a shader object
    #[error("could not create shader object: {0}")]
    Allocation(String),
}

/// A compiled shader stage. The caller owns it: programs only borrow
/// shader objects while linking, so a shader can be dropped as soon as the
/// programs using it are linked.
pub struct ShaderObject {
    handle: ShaderHandle,
    stage: ShaderStage,
    backend: RenderBackendPtr,
}

impl ShaderObject {
    pub fn compile(
        context: &RenderContext,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderObject, ShaderError> {
        let backend = context.backend().clone();
        let handle = backend.compile_shader(stage, source)?;
        log::debug!("Compiled {:?} shader {}", stage, handle);

        Ok(ShaderObject {
            handle,
            stage,
            backend,
        })
    }

    #[inline(always)]
    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }

    #[inline(always)]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl std::fmt::Debug for ShaderObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderObject")
            .field("handle", &self.handle)
            .field("stage", &self.stage)
            .finish()
    }
}

impl Drop for ShaderObject {
    fn drop(&mut self) {
        self.backend.delete_shader(self.handle);
    }
}
