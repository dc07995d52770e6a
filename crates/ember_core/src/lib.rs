//! Ember Core
//!
//! Foundational types shared by every ember crate:
//!
//! - **Math**: `Point3`, `Vec3`, `Mat4` (column-major) tuned for GPU upload
//! - **Color**: linear-space RGBA with HSV construction
//! - **Errors**: the engine-wide error taxonomy and `Result` alias
//! - **Timing**: the monotonic frame clock that drives particle birth times

pub mod color;
pub mod error;
pub mod math;
pub mod time;

pub use color::Color;
pub use error::{EmberError, Result};
pub use math::{Mat4, Point3, Vec3};
pub use time::FrameClock;
