//! Heightmap terrain meshing.
//!
//! A [`HeightField`] holds normalized height samples in row-major order;
//! [`HeightmapMesh`] turns one into an indexed triangle mesh spanning the
//! unit square in X/Z with per-vertex lighting normals.

use ember_core::{EmberError, Point3, Result, Vec3};
use tracing::debug;

/// Hard cap on mesh vertices so every index fits in a `u16`.
pub const MAX_VERTICES: usize = 65536;

/// Floats per mesh vertex: position `xyz` then normal `xyz`.
pub const FLOATS_PER_VERTEX: usize = 6;

/// Row-major grid of height samples in `0.0..=1.0`.
#[derive(Clone, Debug)]
pub struct HeightField {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl HeightField {
    pub fn new(width: usize, height: usize, samples: Vec<f32>) -> Result<Self> {
        if width < 2 || height < 2 {
            return Err(EmberError::InvalidParameter {
                what: "heightmap needs at least 2x2 samples",
            });
        }
        if samples.len() != width * height {
            return Err(EmberError::InvalidParameter {
                what: "heightmap sample count does not match its dimensions",
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Builds a field from 8-bit luminance data, mapping `0..=255` to
    /// `0.0..=1.0`.
    pub fn from_luminance(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let samples = bytes.iter().map(|b| f32::from(*b) / 255.0).collect();
        Self::new(width, height, samples)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Mesh-space position of a grid cell. Columns map to `x` and rows to
    /// `z`, each spanning `-0.5..=0.5`; the sample value becomes `y`.
    ///
    /// Out-of-range indices keep their extrapolated `x`/`z` but reuse the
    /// nearest edge sample for `y`, which keeps edge normals meaningful.
    pub fn vertex_position(&self, row: i32, col: i32) -> Point3 {
        let x = col as f32 / (self.width - 1) as f32 - 0.5;
        let z = row as f32 / (self.height - 1) as f32 - 0.5;
        let r = row.clamp(0, self.height as i32 - 1) as usize;
        let c = col.clamp(0, self.width as i32 - 1) as usize;
        Point3::new(x, self.samples[r * self.width + c], z)
    }
}

/// Indexed terrain mesh with interleaved position and normal data.
#[derive(Clone, Debug)]
pub struct HeightmapMesh {
    vertex_data: Vec<f32>,
    indices: Vec<u16>,
}

impl HeightmapMesh {
    pub fn from_field(field: &HeightField) -> Result<Self> {
        let vertex_total = field.width() * field.height();
        if vertex_total > MAX_VERTICES {
            return Err(EmberError::SizeLimitExceeded {
                what: "heightmap vertices",
                limit: MAX_VERTICES,
                actual: vertex_total,
            });
        }

        let width = field.width();
        let height = field.height();

        let mut vertex_data = Vec::with_capacity(vertex_total * FLOATS_PER_VERTEX);
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let point = field.vertex_position(row, col);
                let left = field.vertex_position(row, col - 1);
                let right = field.vertex_position(row, col + 1);
                let top = field.vertex_position(row - 1, col);
                let bottom = field.vertex_position(row + 1, col);
                let normal = Vec3::between(left, right)
                    .cross(Vec3::between(bottom, top))
                    .normalize();
                vertex_data.extend_from_slice(&[
                    point.x, point.y, point.z, normal.x, normal.y, normal.z,
                ]);
            }
        }

        let quads = (width - 1) * (height - 1);
        let mut indices = Vec::with_capacity(quads * 6);
        for row in 0..height - 1 {
            for col in 0..width - 1 {
                let top_left = (row * width + col) as u16;
                let top_right = (row * width + col + 1) as u16;
                let bottom_left = ((row + 1) * width + col) as u16;
                let bottom_right = ((row + 1) * width + col + 1) as u16;
                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        debug!(
            width,
            height,
            triangles = indices.len() / 3,
            "built heightmap mesh"
        );
        Ok(Self {
            vertex_data,
            indices,
        })
    }

    pub fn vertex_data(&self) -> &[f32] {
        &self.vertex_data
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_data.len() / FLOATS_PER_VERTEX
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_field(width: usize, height: usize, level: f32) -> HeightField {
        HeightField::new(width, height, vec![level; width * height]).unwrap()
    }

    #[test]
    fn rejects_degenerate_grids() {
        assert!(HeightField::new(1, 4, vec![0.0; 4]).is_err());
        assert!(HeightField::new(4, 1, vec![0.0; 4]).is_err());
        assert!(HeightField::new(3, 3, vec![0.0; 8]).is_err());
    }

    #[test]
    fn rejects_grids_past_the_index_limit() {
        let field = flat_field(257, 256, 0.0);
        match HeightmapMesh::from_field(&field) {
            Err(EmberError::SizeLimitExceeded { actual, limit, .. }) => {
                assert_eq!(actual, 257 * 256);
                assert_eq!(limit, MAX_VERTICES);
            }
            other => panic!("expected size limit error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_the_largest_indexable_grid() {
        let field = flat_field(256, 256, 0.25);
        let mesh = HeightmapMesh::from_field(&field).unwrap();
        assert_eq!(mesh.vertex_count(), 65536);
        assert_eq!(mesh.index_count(), 255 * 255 * 6);
    }

    #[test]
    fn corners_span_the_unit_square() {
        let field = flat_field(4, 4, 0.5);
        let mesh = HeightmapMesh::from_field(&field).unwrap();
        let first = &mesh.vertex_data()[..3];
        assert!((first[0] + 0.5).abs() < 1e-6);
        assert!((first[1] - 0.5).abs() < 1e-6);
        assert!((first[2] + 0.5).abs() < 1e-6);
        let last_start = (mesh.vertex_count() - 1) * FLOATS_PER_VERTEX;
        let last = &mesh.vertex_data()[last_start..last_start + 3];
        assert!((last[0] - 0.5).abs() < 1e-6);
        assert!((last[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn flat_field_gets_unit_up_normals() {
        let field = flat_field(5, 5, 0.3);
        let mesh = HeightmapMesh::from_field(&field).unwrap();
        for vertex in mesh.vertex_data().chunks_exact(FLOATS_PER_VERTEX) {
            assert!((vertex[3]).abs() < 1e-6);
            assert!((vertex[4] - 1.0).abs() < 1e-6);
            assert!((vertex[5]).abs() < 1e-6);
        }
    }

    #[test]
    fn slope_tilts_normals_against_the_rise() {
        // Height climbs with x, so normals should lean toward -x.
        let mut samples = Vec::new();
        for _row in 0..4 {
            for col in 0..4 {
                samples.push(col as f32 / 3.0);
            }
        }
        let field = HeightField::new(4, 4, samples).unwrap();
        let mesh = HeightmapMesh::from_field(&field).unwrap();
        for vertex in mesh.vertex_data().chunks_exact(FLOATS_PER_VERTEX) {
            assert!(vertex[3] < 0.0);
            assert!(vertex[4] > 0.0);
            let len = (vertex[3].powi(2) + vertex[4].powi(2) + vertex[5].powi(2)).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn indices_stay_in_bounds_and_tile_every_quad() {
        let field = flat_field(7, 5, 0.0);
        let mesh = HeightmapMesh::from_field(&field).unwrap();
        assert_eq!(mesh.index_count(), 6 * 4 * 6);
        let limit = mesh.vertex_count() as u16;
        assert!(mesh.indices().iter().all(|i| *i < limit));
    }

    #[test]
    fn luminance_bytes_map_to_unit_heights() {
        let field = HeightField::from_luminance(2, 2, &[0, 127, 128, 255]).unwrap();
        let mesh = HeightmapMesh::from_field(&field).unwrap();
        let ys: Vec<f32> = mesh
            .vertex_data()
            .chunks_exact(FLOATS_PER_VERTEX)
            .map(|v| v[1])
            .collect();
        assert!((ys[0] - 0.0).abs() < 1e-6);
        assert!((ys[3] - 1.0).abs() < 1e-6);
        assert!(ys[1] > 0.0 && ys[1] < ys[2]);
    }
}
