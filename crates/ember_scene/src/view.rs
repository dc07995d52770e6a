//! Pointer-driven view state.
//!
//! A [`ViewRig`] folds drag, pinch, and tap input into orbit angles, a
//! dolly factor, and a shared overlay-visibility flag, then derives the
//! view and projection matrices the renderer consumes each frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ember_core::Mat4;

/// Degrees of rotation per pixel of drag.
const DRAG_RATE: f32 = 1.0 / 16.0;
/// Pitch stops straight up or straight down.
const PITCH_LIMIT: f32 = 90.0;
const ZOOM_MIN: f32 = 0.25;
const ZOOM_MAX: f32 = 4.0;
const FOV_Y_DEGREES: f32 = 45.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 150.0;
/// Camera pullback at zoom 1.0.
const BASE_DISTANCE: f32 = 5.0;
const EYE_HEIGHT: f32 = 1.5;

#[derive(Debug)]
pub struct ViewRig {
    x_rotation: f32,
    y_rotation: f32,
    zoom: f32,
    overlay_visible: Arc<AtomicBool>,
}

impl ViewRig {
    pub fn new() -> Self {
        Self {
            x_rotation: 0.0,
            y_rotation: 0.0,
            zoom: 1.0,
            overlay_visible: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Accumulates a drag delta in pixels. Horizontal motion spins the
    /// scene freely; vertical motion pitches it and clamps at the poles.
    pub fn on_drag(&mut self, dx: f32, dy: f32) {
        self.x_rotation += dx * DRAG_RATE;
        self.y_rotation = (self.y_rotation + dy * DRAG_RATE).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Applies a pinch scale factor to the dolly distance. Non-finite or
    /// non-positive factors are ignored.
    pub fn on_zoom(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.zoom = (self.zoom * scale).clamp(ZOOM_MIN, ZOOM_MAX);
        }
    }

    /// Flips the overlay flag and returns the new visibility.
    pub fn on_tap_toggle(&self) -> bool {
        !self.overlay_visible.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible.load(Ordering::Relaxed)
    }

    /// Shared handle to the overlay flag for layers that honor it.
    pub fn overlay_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.overlay_visible)
    }

    pub fn x_rotation(&self) -> f32 {
        self.x_rotation
    }

    pub fn y_rotation(&self) -> f32 {
        self.y_rotation
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// World-to-eye matrix: the scene is pushed down and back, then
    /// pitched and spun by the accumulated orbit angles.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::rotation_x((-self.y_rotation).to_radians())
            .mul(&Mat4::rotation_y((-self.x_rotation).to_radians()))
            .mul(&Mat4::translation(
                0.0,
                -EYE_HEIGHT,
                -BASE_DISTANCE * self.zoom,
            ))
    }

    /// Rotation-only view for the sky, which must not translate with the
    /// camera.
    pub fn skybox_view_matrix(&self) -> Mat4 {
        Mat4::rotation_x((-self.y_rotation).to_radians())
            .mul(&Mat4::rotation_y((-self.x_rotation).to_radians()))
    }

    /// Perspective projection for the given surface size. A zero-sized
    /// surface falls back to a square aspect instead of dividing by zero.
    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        Mat4::perspective(FOV_Y_DEGREES.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }
}

impl Default for ViewRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_converts_pixels_to_sixteenth_degrees() {
        let mut rig = ViewRig::new();
        rig.on_drag(16.0, 8.0);
        assert!((rig.x_rotation() - 1.0).abs() < 1e-6);
        assert!((rig.y_rotation() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn pitch_clamps_at_the_poles_and_spin_does_not() {
        let mut rig = ViewRig::new();
        rig.on_drag(100_000.0, 100_000.0);
        assert_eq!(rig.y_rotation(), 90.0);
        assert!(rig.x_rotation() > 360.0);
        rig.on_drag(0.0, -300_000.0);
        assert_eq!(rig.y_rotation(), -90.0);
    }

    #[test]
    fn zoom_is_multiplicative_and_clamped() {
        let mut rig = ViewRig::new();
        rig.on_zoom(0.5);
        rig.on_zoom(0.5);
        assert_eq!(rig.zoom(), 0.25);
        rig.on_zoom(100.0);
        assert_eq!(rig.zoom(), 4.0);
    }

    #[test]
    fn degenerate_zoom_factors_are_ignored() {
        let mut rig = ViewRig::new();
        rig.on_zoom(0.0);
        rig.on_zoom(-2.0);
        rig.on_zoom(f32::NAN);
        assert_eq!(rig.zoom(), 1.0);
    }

    #[test]
    fn tap_toggle_flips_the_shared_flag() {
        let rig = ViewRig::new();
        let flag = rig.overlay_flag();
        assert!(flag.load(Ordering::Relaxed));
        assert!(!rig.on_tap_toggle());
        assert!(!flag.load(Ordering::Relaxed));
        assert!(rig.on_tap_toggle());
        assert!(rig.overlay_visible());
    }

    #[test]
    fn view_translation_tracks_zoom() {
        let mut rig = ViewRig::new();
        let near = rig.view_matrix();
        assert_eq!(near.cols[3], [0.0, -1.5, -5.0, 1.0]);
        rig.on_zoom(2.0);
        let far = rig.view_matrix();
        assert_eq!(far.cols[3], [0.0, -1.5, -10.0, 1.0]);
    }

    #[test]
    fn skybox_view_never_translates() {
        let mut rig = ViewRig::new();
        rig.on_drag(123.0, -45.0);
        rig.on_zoom(2.0);
        let sky = rig.skybox_view_matrix();
        assert_eq!(sky.cols[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn zero_viewport_still_yields_a_finite_projection() {
        let rig = ViewRig::new();
        for (w, h) in [(0, 0), (0, 480), (640, 0)] {
            let projection = rig.projection_matrix(w, h);
            for col in projection.cols {
                assert!(col.iter().all(|v| v.is_finite()));
            }
        }
    }

    #[test]
    fn wider_surfaces_squeeze_the_horizontal_focal_length() {
        let rig = ViewRig::new();
        let wide = rig.projection_matrix(200, 100);
        assert!((wide.cols[0][0] - wide.cols[1][1] / 2.0).abs() < 1e-5);
    }
}
