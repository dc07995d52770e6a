//! Demo scene assembly and synthetic frame producers.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ember_core::{Color, FrameClock, Mat4, Point3, Result, Vec3};
use ember_gpu::{
    BurstQueue, CameraLayer, FrameSlot, HeightmapLayer, MaskLayer, ParticleLayer, PixelFrame,
    SceneRenderer, SkyboxLayer,
};
use ember_scene::{
    create_mallet, create_puck, Cylinder, Fireworks, HeightField, HeightmapMesh, ParticleShooter,
    ViewRig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

const TERRAIN_FIELD_SIZE: usize = 128;
const PARTICLE_CAPACITY: usize = 10_000;
const SHOOTER_ANGLE_VARIANCE: f32 = 5.0;
const SHOOTER_SPEED_VARIANCE: f32 = 1.0;
const SHOOTER_EMISSION_RATE: u32 = 3;
const PARTICLE_POINT_SIZE: f32 = 0.06;
const BURST_SPARK_COUNT: u32 = 80;

const MASK_SIZE: u32 = 256;
const MASK_MAX_EXTENT: u32 = 512;
const CAMERA_WIDTH: u32 = 640;
const CAMERA_HEIGHT: u32 = 360;
const CAMERA_MAX_WIDTH: u32 = 1280;
const CAMERA_MAX_HEIGHT: u32 = 720;

/// Which demo stack to assemble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoScene {
    ParticleTerrain,
    CameraMask,
}

impl DemoScene {
    /// `EMBER_DEMO=camera` selects the streaming backdrop scene; anything
    /// else falls back to the particle terrain.
    pub fn from_env() -> Self {
        match std::env::var("EMBER_DEMO").as_deref() {
            Ok("camera") => Self::CameraMask,
            _ => Self::ParticleTerrain,
        }
    }
}

/// What the event loop keeps after the stack is assembled.
pub struct SceneHandles {
    pub bursts: Option<BurstQueue>,
}

/// Registers the scene's layers on the renderer, back to front.
pub fn build(kind: DemoScene, renderer: &mut SceneRenderer, rig: &ViewRig) -> Result<SceneHandles> {
    match kind {
        DemoScene::ParticleTerrain => build_particle_terrain(renderer),
        DemoScene::CameraMask => build_camera_mask(renderer, rig),
    }
}

fn build_particle_terrain(renderer: &mut SceneRenderer) -> Result<SceneHandles> {
    let context = renderer.context().clone();

    renderer.add_layer(Box::new(SkyboxLayer::new(context.clone())));

    let field = rolling_height_field(TERRAIN_FIELD_SIZE)?;
    let terrain = HeightmapLayer::new(
        context.clone(),
        HeightmapMesh::from_field(&field)?,
        Vec3::new(100.0, 10.0, 100.0),
        Vec3::new(0.0, -2.0, 0.0),
        Color::rgb(0.36, 0.44, 0.33),
        Vec3::new(0.35, 1.0, 0.2),
    )
    .with_prop(
        create_puck(Cylinder::new(Point3::ORIGIN, 0.3, 0.15), 32)?,
        Mat4::translation(1.1, -0.35, -2.2),
        Color::rgb(0.82, 0.2, 0.16),
    )
    .with_prop(
        create_mallet(Point3::ORIGIN, 0.22, 0.8, 32)?,
        Mat4::translation(-1.3, -0.1, -2.6),
        Color::rgb(0.2, 0.42, 0.85),
    );
    renderer.add_layer(Box::new(terrain));

    let mut rng = StdRng::from_os_rng();
    let mut particles =
        ParticleLayer::new(context, PARTICLE_CAPACITY, move || rng.random::<f32>())?
            .with_emission_rate(SHOOTER_EMISSION_RATE)
            .with_point_size(PARTICLE_POINT_SIZE)
            .with_fireworks(Fireworks {
                spark_count: BURST_SPARK_COUNT,
                ..Fireworks::default()
            });
    let shooters = [
        (Point3::new(-1.0, 0.0, 0.0), Color::rgb(1.0, 0.27, 0.18)),
        (Point3::new(0.0, 0.0, 0.0), Color::rgb(0.25, 0.95, 0.35)),
        (Point3::new(1.0, 0.0, 0.0), Color::rgb(0.2, 0.45, 1.0)),
    ];
    for (position, color) in shooters {
        particles = particles.with_shooter(ParticleShooter::new(
            position,
            Vec3::new(0.0, 0.5, 0.0),
            color,
            SHOOTER_ANGLE_VARIANCE,
            SHOOTER_SPEED_VARIANCE,
        ));
    }
    let bursts = particles.burst_queue();
    renderer.add_layer(Box::new(particles));

    Ok(SceneHandles {
        bursts: Some(bursts),
    })
}

fn build_camera_mask(renderer: &mut SceneRenderer, rig: &ViewRig) -> Result<SceneHandles> {
    let context = renderer.context().clone();

    let camera_slot = Arc::new(FrameSlot::new(4));
    spawn_camera_producer(camera_slot.clone());
    renderer.add_layer(Box::new(CameraLayer::new(
        context.clone(),
        camera_slot,
        CAMERA_MAX_WIDTH,
        CAMERA_MAX_HEIGHT,
    )));

    let mask_slot = Arc::new(FrameSlot::new(1));
    spawn_mask_producer(mask_slot.clone());
    renderer.add_layer(Box::new(MaskLayer::new(
        context,
        mask_slot,
        MASK_MAX_EXTENT,
        MASK_MAX_EXTENT,
        rig.overlay_flag(),
    )));

    Ok(SceneHandles { bursts: None })
}

/// Gentle sin/cos hills in `[0, 1]`, kept low so the default eye height
/// clears them.
fn rolling_height_field(size: usize) -> Result<HeightField> {
    let span = std::f32::consts::TAU;
    let mut samples = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let x = col as f32 / (size - 1) as f32 * span;
            let z = row as f32 / (size - 1) as f32 * span;
            let swell = (x.sin() * z.cos() + 1.0) * 0.5;
            let ripple = ((x * 3.0).cos() * (z * 3.0).sin() + 1.0) * 0.5;
            samples.push(0.08 + 0.22 * swell + 0.06 * ripple);
        }
    }
    HeightField::new(size, size, samples)
}

/// Publishes a pulsing filled circle of confidence values at ~15 Hz.
fn spawn_mask_producer(slot: Arc<FrameSlot>) {
    thread::Builder::new()
        .name("mask-producer".into())
        .spawn(move || {
            let clock = FrameClock::new();
            loop {
                let frame = circular_mask(MASK_SIZE, clock.elapsed_secs());
                if let Err(err) = slot.publish(frame) {
                    warn!("mask producer stopped: {err}");
                    return;
                }
                thread::sleep(Duration::from_millis(66));
            }
        })
        .expect("failed to spawn mask producer thread");
}

/// Publishes a drifting color-gradient "viewfinder" at ~30 Hz.
fn spawn_camera_producer(slot: Arc<FrameSlot>) {
    thread::Builder::new()
        .name("camera-producer".into())
        .spawn(move || {
            let clock = FrameClock::new();
            loop {
                let frame = viewfinder_frame(CAMERA_WIDTH, CAMERA_HEIGHT, clock.elapsed_secs());
                if let Err(err) = slot.publish(frame) {
                    warn!("camera producer stopped: {err}");
                    return;
                }
                thread::sleep(Duration::from_millis(33));
            }
        })
        .expect("failed to spawn camera producer thread");
}

fn circular_mask(size: u32, time: f32) -> PixelFrame {
    let center = size as f32 / 2.0;
    let radius = (0.22 + 0.08 * (time * 1.3).sin()) * size as f32;
    let feather = size as f32 * 0.06;
    let mut data = Vec::with_capacity((size * size) as usize);
    for row in 0..size {
        for col in 0..size {
            let dx = col as f32 + 0.5 - center;
            let dy = row as f32 + 0.5 - center;
            let distance = (dx * dx + dy * dy).sqrt();
            let confidence = ((radius - distance) / feather + 0.5).clamp(0.0, 1.0);
            data.push((confidence * 255.0) as u8);
        }
    }
    PixelFrame::new(size, size, data)
}

fn viewfinder_frame(width: u32, height: u32, time: f32) -> PixelFrame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for row in 0..height {
        for col in 0..width {
            let fx = col as f32 / width as f32;
            let fy = row as f32 / height as f32;
            let sweep = ((fx * 6.0 + time).sin() * 0.5 + 0.5) * 0.35;
            let r = (0.1 + 0.5 * fx + sweep).min(1.0);
            let g = 0.12 + 0.35 * fy;
            let b = 0.35 + 0.25 * (1.0 - fx);
            data.extend_from_slice(&[
                (r * 255.0) as u8,
                (g * 255.0) as u8,
                (b * 255.0) as u8,
                255,
            ]);
        }
    }
    PixelFrame::new(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_field_stays_in_unit_range() {
        let field = rolling_height_field(32).unwrap();
        assert_eq!(field.width(), 32);
        assert_eq!(field.height(), 32);
        for row in 0..32i32 {
            for col in 0..32i32 {
                let y = field.vertex_position(row, col).y;
                assert!((0.0..=1.0).contains(&y), "sample out of range: {y}");
            }
        }
    }

    #[test]
    fn mask_is_solid_at_center_and_empty_at_corners() {
        let frame = circular_mask(64, 0.0);
        assert_eq!(frame.data.len(), 64 * 64);

        let center = frame.data[32 * 64 + 32];
        assert_eq!(center, 255);

        assert_eq!(frame.data[0], 0);
        assert_eq!(frame.data[64 * 64 - 1], 0);
    }

    #[test]
    fn mask_radius_pulses_over_time() {
        // Count covered pixels at the small and large ends of the pulse.
        let coverage = |frame: &PixelFrame| frame.data.iter().filter(|b| **b > 128).count();

        let quarter_period = std::f32::consts::FRAC_PI_2 / 1.3;
        let small = circular_mask(64, -quarter_period);
        let large = circular_mask(64, quarter_period);
        assert!(coverage(&large) > coverage(&small));
    }

    #[test]
    fn viewfinder_frames_are_fully_opaque_rgba() {
        let frame = viewfinder_frame(16, 8, 1.5);
        assert_eq!(frame.data.len(), 16 * 8 * 4);
        for pixel in frame.data.chunks_exact(4) {
            assert_eq!(pixel[3], 255);
        }
    }
}
