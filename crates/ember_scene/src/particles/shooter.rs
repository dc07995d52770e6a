//! Directional particle emitter.

use ember_core::{Color, Mat4, Point3, Vec3};

use crate::particles::buffer::ParticleBuffer;

/// Emits particles along a base direction, each nudged by a random Euler
/// rotation and stretched by a random speed multiplier. Every emission also
/// stamps a short trail of copies behind the lead particle.
///
/// The perturbation draws three independent angles, one per axis, inside
/// `angle_variance`. That concentrates directions near the axes of the cone
/// rather than spreading them uniformly; the visual clumping is part of the
/// effect's look and is kept intentionally.
#[derive(Clone, Copy, Debug)]
pub struct ParticleShooter {
    pub position: Point3,
    pub direction: Vec3,
    pub color: Color,
    /// Full width of the per-axis angle range, in degrees. Each axis draws
    /// from `-angle_variance / 2 ..= angle_variance / 2`.
    pub angle_variance: f32,
    /// Speed multiplier range above 1.0. A value of `1.0` draws speeds
    /// from `1.0..=2.0`.
    pub speed_variance: f32,
    /// Trailing copies stamped behind each lead particle.
    pub trailing_count: u32,
    /// Gap between consecutive trail copies, along the normalized
    /// emission direction.
    pub trailing_spacing: f32,
}

impl ParticleShooter {
    pub const DEFAULT_TRAILING_COUNT: u32 = 2;
    pub const DEFAULT_TRAILING_SPACING: f32 = 0.05;

    pub fn new(
        position: Point3,
        direction: Vec3,
        color: Color,
        angle_variance: f32,
        speed_variance: f32,
    ) -> Self {
        Self {
            position,
            direction,
            color,
            angle_variance,
            speed_variance,
            trailing_count: Self::DEFAULT_TRAILING_COUNT,
            trailing_spacing: Self::DEFAULT_TRAILING_SPACING,
        }
    }

    pub fn with_trailing(mut self, count: u32, spacing: f32) -> Self {
        self.trailing_count = count;
        self.trailing_spacing = spacing;
        self
    }

    /// Stamps `count` emissions into `buffer`, each one lead particle plus
    /// `trailing_count` trail copies. `rng` must yield values in `0.0..1.0`.
    pub fn add_particles(
        &self,
        buffer: &mut ParticleBuffer,
        current_time: f32,
        count: u32,
        rng: &mut impl FnMut() -> f32,
    ) {
        for _ in 0..count {
            let pitch = (rng() - 0.5) * self.angle_variance;
            let yaw = (rng() - 0.5) * self.angle_variance;
            let roll = (rng() - 0.5) * self.angle_variance;
            let rotation = Mat4::rotation_z(roll.to_radians())
                .mul(&Mat4::rotation_y(yaw.to_radians()))
                .mul(&Mat4::rotation_x(pitch.to_radians()));
            let speed = 1.0 + rng() * self.speed_variance;
            let this_direction = rotation.transform_vec3(self.direction).scaled(speed);

            buffer.add_particle(self.position, self.color, this_direction, current_time);

            let backward = this_direction.normalize();
            for step in 1..=self.trailing_count {
                let trail_position = self
                    .position
                    .stepped(backward, -(self.trailing_spacing * step as f32));
                buffer.add_particle(trail_position, self.color, this_direction, current_time);
            }
        }
    }

    /// Records written per emission.
    pub fn records_per_emission(&self) -> usize {
        1 + self.trailing_count as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::buffer::ParticleRecord;
    use bytemuck::Zeroable;

    fn lcg(seed: u32) -> impl FnMut() -> f32 {
        let mut state = seed;
        move || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / 16_777_216.0
        }
    }

    fn shooter(angle_variance: f32, speed_variance: f32) -> ParticleShooter {
        ParticleShooter::new(
            Point3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
            Color::RED,
            angle_variance,
            speed_variance,
        )
    }

    #[test]
    fn zero_variance_keeps_the_base_direction_and_speed() {
        let shooter = shooter(0.0, 0.0);
        let mut buffer = ParticleBuffer::new(64).unwrap();
        let mut rng = lcg(7);
        shooter.add_particles(&mut buffer, 1.0, 8, &mut rng);

        for record in &buffer.records()[..8 * shooter.records_per_emission()] {
            let direction = Vec3::new(record.direction[0], record.direction[1], record.direction[2]);
            assert!(direction.angle_to(shooter.direction) < 1e-4);
            assert!((direction.length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn perturbed_directions_stay_inside_the_cone() {
        // Three per-axis rotations of at most variance/2 each bound the
        // total deflection by 1.5 * variance.
        let shooter = shooter(10.0, 1.0);
        let bound = (1.5 * 10.0_f32).to_radians() + 1e-3;
        let mut buffer = ParticleBuffer::new(1024).unwrap();
        let mut rng = lcg(99);
        shooter.add_particles(&mut buffer, 0.0, 100, &mut rng);

        let per_emission = shooter.records_per_emission();
        for emission in 0..100 {
            let record = &buffer.records()[emission * per_emission];
            let direction = Vec3::new(record.direction[0], record.direction[1], record.direction[2]);
            assert!(direction.angle_to(shooter.direction) <= bound);
            let ratio = direction.length() / shooter.direction.length();
            assert!((1.0 - 1e-4..=2.0 + 1e-4).contains(&ratio));
        }
    }

    #[test]
    fn speed_multiplier_scales_the_direction_length() {
        let shooter = shooter(0.0, 1.0);
        let mut buffer = ParticleBuffer::new(8).unwrap();
        // Constant rng: angles collapse to zero, speed becomes 1.5.
        let mut rng = || 0.5;
        shooter.add_particles(&mut buffer, 0.0, 1, &mut rng);

        let record = &buffer.records()[0];
        let direction = Vec3::new(record.direction[0], record.direction[1], record.direction[2]);
        assert!((direction.length() - 0.75).abs() < 1e-5);
    }

    #[test]
    fn trails_line_up_behind_the_lead_particle() {
        let shooter = shooter(25.0, 1.0);
        let mut buffer = ParticleBuffer::new(16).unwrap();
        let mut rng = lcg(3);
        shooter.add_particles(&mut buffer, 2.5, 1, &mut rng);

        let lead = buffer.records()[0];
        let direction = Vec3::new(lead.direction[0], lead.direction[1], lead.direction[2]);
        let backward = direction.normalize();
        for step in 1..=2usize {
            let trail = buffer.records()[step];
            let expected = shooter
                .position
                .stepped(backward, -(0.05 * step as f32));
            assert!((trail.position_and_birth[0] - expected.x).abs() < 1e-5);
            assert!((trail.position_and_birth[1] - expected.y).abs() < 1e-5);
            assert!((trail.position_and_birth[2] - expected.z).abs() < 1e-5);
            assert_eq!(trail.direction, lead.direction);
            assert_eq!(trail.color, lead.color);
            assert_eq!(trail.birth_time(), 2.5);
        }
    }

    #[test]
    fn each_emission_stamps_lead_plus_trailing() {
        let shooter = shooter(5.0, 1.0).with_trailing(3, 0.1);
        let mut buffer = ParticleBuffer::new(64).unwrap();
        let mut rng = lcg(11);
        shooter.add_particles(&mut buffer, 0.0, 4, &mut rng);

        let written = buffer
            .records()
            .iter()
            .filter(|r| **r != ParticleRecord::zeroed())
            .count();
        assert_eq!(written, 4 * 4);
    }
}
