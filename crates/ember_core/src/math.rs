//! Math types for scene and GPU work
//!
//! `Point3` is a position, `Vec3` a direction; keeping them distinct mirrors
//! how the particle pipeline treats them (positions are stepped, directions
//! are rotated and scaled). `Mat4` is column-major so `cols` can be uploaded
//! to WGSL `mat4x4<f32>` uniforms unchanged.

/// 3D position
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The same point shifted along Y
    pub fn translated_y(&self, distance: f32) -> Self {
        Self::new(self.x, self.y + distance, self.z)
    }

    /// The point reached by walking `distance` along `direction`
    pub fn stepped(&self, direction: Vec3, distance: f32) -> Self {
        Self::new(
            self.x + direction.x * distance,
            self.y + direction.y * distance,
            self.z + direction.z * distance,
        )
    }
}

/// 3D vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Vector pointing from `from` to `to`.
    pub fn between(from: Point3, to: Point3) -> Self {
        Self::new(to.x - from.x, to.y - from.y, to.z - from.z)
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len, self.z / len)
        } else {
            Self::ZERO
        }
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn dot(&self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Angle to another vector in radians
    pub fn angle_to(&self, other: Vec3) -> f32 {
        let denom = self.length() * other.length();
        if denom > 0.0 {
            (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        }
    }
}

/// 4x4 transformation matrix (column-major)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_x(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_y(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_z(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Perspective projection with clip-space depth in 0..1
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y * 0.5).tan();
        let nf = 1.0 / (near - far);
        Self {
            cols: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, far * nf, -1.0],
                [0.0, 0.0, near * far * nf, 0.0],
            ],
        }
    }

    /// Multiply two matrices
    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let mut result = [[0.0f32; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    result[i][j] += self.cols[k][j] * other.cols[i][k];
                }
            }
        }
        Mat4 { cols: result }
    }

    /// Rotate/scale a direction (w = 0, translation ignored)
    pub fn transform_vec3(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cols[0][0] * v.x + self.cols[1][0] * v.y + self.cols[2][0] * v.z,
            self.cols[0][1] * v.x + self.cols[1][1] * v.y + self.cols[2][1] * v.z,
            self.cols[0][2] * v.x + self.cols[1][2] * v.y + self.cols[2][2] * v.z,
        )
    }

    /// Transform a position (w = 1, translation applied)
    pub fn transform_point3(&self, p: Point3) -> Point3 {
        Point3::new(
            self.cols[0][0] * p.x + self.cols[1][0] * p.y + self.cols[2][0] * p.z + self.cols[3][0],
            self.cols[0][1] * p.x + self.cols[1][1] * p.y + self.cols[2][1] * p.z + self.cols[3][1],
            self.cols[0][2] * p.x + self.cols[1][2] * p.y + self.cols[2][2] * p.z + self.cols[3][2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn identity_leaves_vectors_unchanged() {
        let v = Vec3::new(1.0, -2.0, 3.0);
        let out = Mat4::IDENTITY.transform_vec3(v);
        assert!(approx(out.x, v.x) && approx(out.y, v.y) && approx(out.z, v.z));
    }

    #[test]
    fn rotation_y_quarter_turn() {
        let m = Mat4::rotation_y(std::f32::consts::FRAC_PI_2);
        let out = m.transform_vec3(Vec3::new(0.0, 0.0, -1.0));
        assert!(approx(out.x, -1.0));
        assert!(approx(out.y, 0.0));
        assert!(approx(out.z, 0.0));
    }

    #[test]
    fn rotation_x_quarter_turn() {
        let m = Mat4::rotation_x(std::f32::consts::FRAC_PI_2);
        let out = m.transform_vec3(Vec3::UP);
        assert!(approx(out.x, 0.0));
        assert!(approx(out.y, 0.0));
        assert!(approx(out.z, 1.0));
    }

    #[test]
    fn translation_moves_points_not_directions() {
        let m = Mat4::translation(1.0, 2.0, 3.0);
        let p = m.transform_point3(Point3::ORIGIN);
        assert!(approx(p.x, 1.0) && approx(p.y, 2.0) && approx(p.z, 3.0));
        let v = m.transform_vec3(Vec3::new(0.0, 0.0, 1.0));
        assert!(approx(v.x, 0.0) && approx(v.y, 0.0) && approx(v.z, 1.0));
    }

    #[test]
    fn mul_respects_application_order() {
        // translate then rotate: point ends up rotated with its offset
        let t = Mat4::translation(1.0, 0.0, 0.0);
        let r = Mat4::rotation_y(std::f32::consts::PI);
        let combined = r.mul(&t);
        let p = combined.transform_point3(Point3::ORIGIN);
        assert!(approx(p.x, -1.0));
        assert!(approx(p.z, 0.0));
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let m = Mat4::perspective(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, 0.1, 100.0);
        // project a point on the near plane: clip z should be 0 after divide
        let near = m.transform_point3(Point3::new(0.0, 0.0, -0.1));
        let w_near = -(-0.1);
        assert!(approx(near.z / w_near, 0.0));
        let far = m.transform_point3(Point3::new(0.0, 0.0, -100.0));
        assert!(approx(far.z / 100.0, 1.0));
    }

    #[test]
    fn normalize_handles_zero_vector() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
        let unit = Vec3::new(3.0, 0.0, 4.0).normalize();
        assert!(approx(unit.length(), 1.0));
    }

    #[test]
    fn angle_between_perpendicular_vectors() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::UP;
        assert!(approx(a.angle_to(b), std::f32::consts::FRAC_PI_2));
    }

    #[test]
    fn stepping_walks_along_direction() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let out = p.stepped(Vec3::new(0.0, 1.0, 0.0), -0.5);
        assert!(approx(out.y, 0.5));
        assert!(approx(out.x, 1.0));
    }
}
