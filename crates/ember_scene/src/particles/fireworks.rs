//! Spherical firework bursts.

use ember_core::{Color, Mat4, Point3, Vec3};

use crate::particles::buffer::ParticleBuffer;

/// One-shot burst emitter.
///
/// Every spark is a short comet: `steps_per_spark` records share one
/// position and direction but are born `step_delay` seconds apart with the
/// color dimmed at each step, so the shader strings them out along the
/// flight path with a fading tail.
#[derive(Clone, Copy, Debug)]
pub struct Fireworks {
    pub spark_count: u32,
    pub steps_per_spark: u32,
    /// Upward bias added to every spark direction.
    pub rise: f32,
    /// Per-step RGB multiplier for the tail.
    pub brightness_decay: f32,
    /// Birth-time stagger between tail records, in seconds.
    pub step_delay: f32,
}

impl Default for Fireworks {
    fn default() -> Self {
        Self {
            spark_count: 50,
            steps_per_spark: 10,
            rise: 0.5,
            brightness_decay: 0.9,
            step_delay: 0.025,
        }
    }
}

impl Fireworks {
    /// Stamps one burst at `position`. Sparks are thrown over the full
    /// sphere by rotating `+z` through three random full-turn angles, with
    /// magnitudes in `0.5..1.0` before the upward bias.
    pub fn burst(
        &self,
        buffer: &mut ParticleBuffer,
        position: Point3,
        color: Color,
        current_time: f32,
        rng: &mut impl FnMut() -> f32,
    ) {
        for _ in 0..self.spark_count {
            let rotation = Mat4::rotation_z((rng() * 360.0).to_radians())
                .mul(&Mat4::rotation_y((rng() * 360.0).to_radians()))
                .mul(&Mat4::rotation_x((rng() * 360.0).to_radians()));
            let magnitude = 0.5 + rng() / 2.0;
            let thrown = rotation
                .transform_vec3(Vec3::new(0.0, 0.0, 1.0))
                .scaled(magnitude);
            let direction = Vec3::new(thrown.x, thrown.y + self.rise, thrown.z);

            let mut spark_color = color;
            let mut birth = current_time;
            for _ in 0..self.steps_per_spark {
                buffer.add_particle(position, spark_color, direction, birth);
                spark_color = spark_color.dimmed(self.brightness_decay);
                birth += self.step_delay;
            }
        }
    }

    pub fn records_per_burst(&self) -> usize {
        (self.spark_count * self.steps_per_spark) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg(seed: u32) -> impl FnMut() -> f32 {
        let mut state = seed;
        move || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / 16_777_216.0
        }
    }

    #[test]
    fn burst_fills_sparks_times_steps_slots() {
        let fireworks = Fireworks::default();
        let mut buffer = ParticleBuffer::new(1024).unwrap();
        let mut rng = lcg(42);
        fireworks.burst(&mut buffer, Point3::ORIGIN, Color::WHITE, 1.0, &mut rng);

        assert_eq!(fireworks.records_per_burst(), 500);
        assert_eq!(buffer.next_slot(), 500);
    }

    #[test]
    fn tail_records_dim_and_stagger() {
        let fireworks = Fireworks::default();
        let mut buffer = ParticleBuffer::new(1024).unwrap();
        let mut rng = lcg(7);
        let base = Color::rgb(0.8, 0.6, 0.4);
        fireworks.burst(&mut buffer, Point3::new(0.0, 2.0, 0.0), base, 3.0, &mut rng);

        for spark in 0..fireworks.spark_count as usize {
            let records = &buffer.records()[spark * 10..spark * 10 + 10];
            for (step, record) in records.iter().enumerate() {
                // Same flight path for the whole tail.
                assert_eq!(record.direction, records[0].direction);
                assert_eq!(
                    record.position_and_birth[..3],
                    records[0].position_and_birth[..3]
                );
                let expected_birth = 3.0 + step as f32 * 0.025;
                assert!((record.birth_time() - expected_birth).abs() < 1e-5);
                if step > 0 {
                    let previous = &records[step - 1];
                    for channel in 0..3 {
                        let expected = previous.color[channel] * 0.9;
                        assert!((record.color[channel] - expected).abs() < 1e-5);
                    }
                    assert_eq!(record.color[3], previous.color[3]);
                }
            }
        }
    }

    #[test]
    fn sparks_lean_upward_on_average() {
        let fireworks = Fireworks::default();
        let mut buffer = ParticleBuffer::new(1024).unwrap();
        let mut rng = lcg(1234);
        fireworks.burst(&mut buffer, Point3::ORIGIN, Color::WHITE, 0.0, &mut rng);

        let mut sum_y = 0.0;
        for spark in 0..fireworks.spark_count as usize {
            let lead = &buffer.records()[spark * 10];
            sum_y += lead.direction[1];
            let speed = Vec3::new(lead.direction[0], lead.direction[1] - 0.5, lead.direction[2])
                .length();
            assert!((0.5 - 1e-4..=1.0 + 1e-4).contains(&speed));
        }
        assert!(sum_y / fireworks.spark_count as f32 > 0.2);
    }
}
