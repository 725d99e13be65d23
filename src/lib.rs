pub mod core;
pub mod prelude;

// Kinda hack so that we can use absolute crate paths everywhere.
extern crate self as proto_gfx;

#[cfg(test)]
mod tests;
