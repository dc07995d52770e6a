//! Fixed-capacity particle ring.

use bytemuck::{Pod, Zeroable};
use ember_core::{Color, EmberError, Point3, Result, Vec3};

/// One particle as the GPU sees it, 48 bytes.
///
/// Never-written slots stay zeroed; the shader treats a zero birth time and
/// zero color as a particle that faded out long ago, so a partially filled
/// ring can be drawn in full.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleRecord {
    /// World position in `xyz`, birth time in seconds in `w`.
    pub position_and_birth: [f32; 4],
    /// RGBA color at emission.
    pub color: [f32; 4],
    /// Initial velocity in `xyz`; `w` is padding.
    pub direction: [f32; 4],
}

impl ParticleRecord {
    fn new(position: Point3, color: Color, direction: Vec3, birth_time: f32) -> Self {
        Self {
            position_and_birth: [position.x, position.y, position.z, birth_time],
            color: color.to_array(),
            direction: [direction.x, direction.y, direction.z, 0.0],
        }
    }

    pub fn birth_time(&self) -> f32 {
        self.position_and_birth[3]
    }
}

impl Default for ParticleRecord {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Ring of particle records with a monotonically advancing write cursor.
///
/// Adding past capacity overwrites the oldest slot without any error or
/// log; steady-state emission is expected to wrap continuously.
#[derive(Clone, Debug)]
pub struct ParticleBuffer {
    records: Vec<ParticleRecord>,
    cursor: usize,
}

impl ParticleBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(EmberError::InvalidParameter {
                what: "particle buffer capacity must be at least 1",
            });
        }
        Ok(Self {
            records: vec![ParticleRecord::zeroed(); capacity],
            cursor: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// All slots, written or not. Suitable for a full-buffer GPU upload via
    /// `bytemuck::cast_slice`.
    pub fn records(&self) -> &[ParticleRecord] {
        &self.records
    }

    /// Index of the slot the next add will claim.
    pub fn next_slot(&self) -> usize {
        self.cursor % self.records.len()
    }

    pub fn add_particle(&mut self, position: Point3, color: Color, direction: Vec3, birth_time: f32) {
        let slot = self.cursor % self.records.len();
        self.records[slot] = ParticleRecord::new(position, color, direction, birth_time);
        self.cursor += 1;
    }

    /// Clears every slot back to the zeroed state.
    pub fn reset(&mut self) {
        self.records.fill(ParticleRecord::zeroed());
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_stamped(buffer: &mut ParticleBuffer, time: f32) {
        buffer.add_particle(
            Point3::new(time, 0.0, 0.0),
            Color::WHITE,
            Vec3::UP,
            time,
        );
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(ParticleBuffer::new(0).is_err());
        assert!(ParticleBuffer::new(1).is_ok());
    }

    #[test]
    fn fills_slots_in_order_until_capacity() {
        let mut buffer = ParticleBuffer::new(8).unwrap();
        for t in 0..5 {
            add_stamped(&mut buffer, t as f32);
        }
        let written: Vec<usize> = buffer
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| **r != ParticleRecord::zeroed())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(written, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn wraps_over_the_oldest_slot() {
        // Six adds into a ring of four: times 4 and 5 reclaim slots 0 and 1.
        let mut buffer = ParticleBuffer::new(4).unwrap();
        for t in 0..6 {
            add_stamped(&mut buffer, t as f32);
        }
        let births: Vec<f32> = buffer.records().iter().map(|r| r.birth_time()).collect();
        assert_eq!(births, vec![4.0, 5.0, 2.0, 3.0]);
        assert_eq!(buffer.next_slot(), 2);
    }

    #[test]
    fn untouched_slots_stay_zeroed() {
        let mut buffer = ParticleBuffer::new(16).unwrap();
        for t in 0..3 {
            add_stamped(&mut buffer, t as f32);
        }
        let zeroed = buffer
            .records()
            .iter()
            .filter(|r| **r == ParticleRecord::zeroed())
            .count();
        assert_eq!(zeroed, 13);
    }

    #[test]
    fn reset_rewinds_the_cursor() {
        let mut buffer = ParticleBuffer::new(4).unwrap();
        for t in 0..7 {
            add_stamped(&mut buffer, t as f32);
        }
        buffer.reset();
        assert_eq!(buffer.next_slot(), 0);
        assert!(buffer.records().iter().all(|r| *r == ParticleRecord::zeroed()));
    }
}
