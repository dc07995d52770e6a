//! Procedural geometry generators.
//!
//! All generators produce plain `f32` vertex data with explicit layouts so
//! the GPU crate can upload them without further transformation.

pub mod builder;
pub mod heightmap;
pub mod skybox;
pub mod solids;
