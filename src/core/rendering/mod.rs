pub mod handle;
pub mod program;
pub mod render_api;
pub mod shader;
pub mod uniform;
