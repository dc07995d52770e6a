//! Scene-side data for the Ember renderer.
//!
//! Everything in this crate is CPU-resident and GPU-agnostic:
//!
//! - **Geometry**: procedural solids (pucks, mallets), heightmap terrain,
//!   and the unit skybox cube
//! - **Particles**: a fixed-capacity particle store plus directional and
//!   fireworks emitters that feed it
//! - **View**: orbit/zoom/tap input state and the matrices derived from it
//!
//! The GPU crate consumes these types verbatim; vertex layouts here are
//! `bytemuck`-castable so upload is a memcpy.

pub mod geometry;
pub mod particles;
pub mod view;

pub use geometry::builder::{
    create_mallet, create_puck, DrawCommand, SolidBuilder, SolidMesh, SolidTopology,
};
pub use geometry::heightmap::{HeightField, HeightmapMesh};
pub use geometry::skybox::SkyboxMesh;
pub use geometry::solids::{Circle, Cylinder};
pub use particles::buffer::{ParticleBuffer, ParticleRecord};
pub use particles::fireworks::Fireworks;
pub use particles::shooter::ParticleShooter;
pub use view::ViewRig;
