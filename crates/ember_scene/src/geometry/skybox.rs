//! Unit cube for sky rendering.
//!
//! The cube is indexed with faces wound to be visible from the inside; the
//! sky shader turns each interpolated position into a view direction.

/// Skybox cube: eight corner positions and six inward-facing quads.
#[derive(Clone, Debug)]
pub struct SkyboxMesh {
    positions: [f32; 24],
    indices: [u16; 36],
}

pub const VERTEX_COUNT: usize = 8;
pub const INDEX_COUNT: usize = 36;

impl SkyboxMesh {
    pub fn new() -> Self {
        #[rustfmt::skip]
        let positions: [f32; 24] = [
            -1.0,  1.0,  1.0, // (0) top left near
             1.0,  1.0,  1.0, // (1) top right near
            -1.0, -1.0,  1.0, // (2) bottom left near
             1.0, -1.0,  1.0, // (3) bottom right near
            -1.0,  1.0, -1.0, // (4) top left far
             1.0,  1.0, -1.0, // (5) top right far
            -1.0, -1.0, -1.0, // (6) bottom left far
             1.0, -1.0, -1.0, // (7) bottom right far
        ];
        #[rustfmt::skip]
        let indices: [u16; 36] = [
            // Front
            1, 3, 0, 0, 3, 2,
            // Back
            4, 6, 5, 5, 6, 7,
            // Left
            0, 2, 4, 4, 2, 6,
            // Right
            5, 7, 1, 1, 7, 3,
            // Top
            5, 1, 4, 4, 1, 0,
            // Bottom
            6, 2, 7, 7, 2, 3,
        ];
        Self { positions, indices }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }
}

impl Default for SkyboxMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_eight_corners_and_six_quads() {
        let mesh = SkyboxMesh::new();
        assert_eq!(mesh.positions().len(), VERTEX_COUNT * 3);
        assert_eq!(mesh.indices().len(), INDEX_COUNT);
        assert!(mesh.indices().iter().all(|i| (*i as usize) < VERTEX_COUNT));
    }

    #[test]
    fn corners_sit_on_the_unit_cube() {
        let mesh = SkyboxMesh::new();
        for coord in mesh.positions() {
            assert!((coord.abs() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn each_face_is_planar() {
        let mesh = SkyboxMesh::new();
        // Face order: front +z, back -z, left -x, right +x, top +y, bottom -y.
        let planes: [(usize, f32); 6] =
            [(2, 1.0), (2, -1.0), (0, -1.0), (0, 1.0), (1, 1.0), (1, -1.0)];
        for (face, (axis, value)) in planes.into_iter().enumerate() {
            for index in &mesh.indices()[face * 6..face * 6 + 6] {
                let coord = mesh.positions()[*index as usize * 3 + axis];
                assert!((coord - value).abs() < 1e-6);
            }
        }
    }
}
