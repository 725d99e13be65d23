pub mod platform;
pub mod rendering;
