use super::handle::ProgramHandle;
use super::shader::ShaderDataType;

/// Resolved binding of a uniform inside a linked program.
///
/// This does not own the program, it's just the `(program, location)` pair
/// the driver needs to upload a value. Using it after the program was
/// destroyed is a caller error. An absent location means the program does
/// not have an active uniform with that name: uploads through it are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformBinding {
    program: ProgramHandle,
    location: Option<u32>,
}

impl UniformBinding {
    pub fn new(program: ProgramHandle, location: Option<u32>) -> Self {
        UniformBinding { program, location }
    }

    /// Binding for a name the program doesn't know
    pub fn absent(program: ProgramHandle) -> Self {
        UniformBinding {
            program,
            location: None,
        }
    }

    #[inline(always)]
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    #[inline(always)]
    pub fn location(&self) -> Option<u32> {
        self.location
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.location.is_some()
    }
}

/// Typed value to upload through a [UniformBinding]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Float2(glam::Vec2),
    Float3(glam::Vec3),
    Float4(glam::Vec4),
    Int(i32),
    Int2(glam::IVec2),
    Int3(glam::IVec3),
    Int4(glam::IVec4),
    Bool(bool),
    Mat3(glam::Mat3),
    Mat4(glam::Mat4),
}

impl UniformValue {
    pub fn data_type(&self) -> ShaderDataType {
        match self {
            UniformValue::Float(_) => ShaderDataType::Float,
            UniformValue::Float2(_) => ShaderDataType::Float2,
            UniformValue::Float3(_) => ShaderDataType::Float3,
            UniformValue::Float4(_) => ShaderDataType::Float4,
            UniformValue::Int(_) => ShaderDataType::Int,
            UniformValue::Int2(_) => ShaderDataType::Int2,
            UniformValue::Int3(_) => ShaderDataType::Int3,
            UniformValue::Int4(_) => ShaderDataType::Int4,
            UniformValue::Bool(_) => ShaderDataType::Bool,
            UniformValue::Mat3(_) => ShaderDataType::Mat3,
            UniformValue::Mat4(_) => ShaderDataType::Mat4,
        }
    }
}

macro_rules! uniform_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

uniform_value_from!(
    f32 => Float,
    glam::Vec2 => Float2,
    glam::Vec3 => Float3,
    glam::Vec4 => Float4,
    i32 => Int,
    glam::IVec2 => Int2,
    glam::IVec3 => Int3,
    glam::IVec4 => Int4,
    bool => Bool,
    glam::Mat3 => Mat3,
    glam::Mat4 => Mat4,
);
