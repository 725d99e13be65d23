pub mod opengl_render_backend;

pub use opengl_render_backend::OpenGLRenderBackend;
