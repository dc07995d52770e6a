//! RGBA color with HSV construction

/// RGBA color (linear space)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from hue (degrees), saturation and value, all alpha 1
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = value * saturation;
        let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = value - c;
        Self::rgb(r + m, g + m, b + m)
    }

    /// Scale brightness, leaving alpha untouched
    ///
    /// Scaling RGB uniformly is exactly an HSV value scale for a fixed
    /// hue/saturation, which is what trail decay needs.
    pub fn dimmed(&self, factor: f32) -> Self {
        Self::rgba(self.r * factor, self.g * factor, self.b * factor, self.a)
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn hsv_primaries() {
        let red = Color::from_hsv(0.0, 1.0, 1.0);
        assert!(close(red.r, 1.0) && close(red.g, 0.0) && close(red.b, 0.0));
        let green = Color::from_hsv(120.0, 1.0, 1.0);
        assert!(close(green.g, 1.0) && close(green.r, 0.0));
        let blue = Color::from_hsv(240.0, 1.0, 1.0);
        assert!(close(blue.b, 1.0) && close(blue.g, 0.0));
    }

    #[test]
    fn hsv_zero_saturation_is_gray() {
        let c = Color::from_hsv(200.0, 0.0, 0.5);
        assert!(close(c.r, 0.5) && close(c.g, 0.5) && close(c.b, 0.5));
    }

    #[test]
    fn hsv_hue_wraps() {
        let a = Color::from_hsv(370.0, 1.0, 1.0);
        let b = Color::from_hsv(10.0, 1.0, 1.0);
        assert!(close(a.r, b.r) && close(a.g, b.g) && close(a.b, b.b));
    }

    #[test]
    fn dimming_scales_rgb_only() {
        let c = Color::rgba(1.0, 0.5, 0.25, 0.8).dimmed(0.9);
        assert!(close(c.r, 0.9));
        assert!(close(c.g, 0.45));
        assert!(close(c.b, 0.225));
        assert!(close(c.a, 0.8));
    }

    #[test]
    fn lerp_endpoints() {
        let mid = Color::lerp(&Color::BLACK, &Color::WHITE, 0.5);
        assert!(close(mid.r, 0.5));
        assert_eq!(Color::lerp(&Color::RED, &Color::BLUE, 0.0), Color::RED);
    }
}
