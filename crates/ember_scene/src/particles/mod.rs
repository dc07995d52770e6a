//! Particle storage and emitters.
//!
//! Particles never die on the CPU. Emitters stamp records into a
//! fixed-capacity ring ([`buffer::ParticleBuffer`]) and the shader fades
//! them out by age; once the ring wraps, new records silently reclaim the
//! oldest slots.

pub mod buffer;
pub mod fireworks;
pub mod shooter;
