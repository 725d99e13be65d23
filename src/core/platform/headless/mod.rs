pub mod headless_render_backend;
pub mod interface;

pub use headless_render_backend::{BackendStats, HeadlessRenderBackend};
