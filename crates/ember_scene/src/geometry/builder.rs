//! Incremental builder for solids of revolution.
//!
//! Solids are assembled from two primitives: a triangle-fan disc and a
//! triangle-strip side wall. The builder records one [`DrawCommand`] per
//! primitive so composite solids replay as a short command list over a
//! single shared vertex buffer. Vertices are position-only (`x, y, z`);
//! fan and strip topologies are expanded to triangle lists at upload time.

use std::f32::consts::TAU;

use ember_core::{EmberError, Point3, Result};

use crate::geometry::solids::{Circle, Cylinder};

/// Floats written per vertex.
pub const FLOATS_PER_VERTEX: usize = 3;

/// Primitive topology of one [`DrawCommand`] span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolidTopology {
    TriangleFan,
    TriangleStrip,
}

/// One contiguous span of the vertex buffer drawn with a single topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCommand {
    pub topology: SolidTopology,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

/// Finished solid: packed vertex positions plus the commands that draw them.
#[derive(Clone, Debug)]
pub struct SolidMesh {
    vertex_data: Vec<f32>,
    commands: Vec<DrawCommand>,
}

impl SolidMesh {
    pub fn vertex_data(&self) -> &[f32] {
        &self.vertex_data
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn vertex_count(&self) -> u32 {
        (self.vertex_data.len() / FLOATS_PER_VERTEX) as u32
    }
}

/// Vertices taken by a fan disc: one center plus a closed rim loop.
pub fn circle_vertex_count(segments: u32) -> usize {
    1 + (segments as usize + 1)
}

/// Vertices taken by an open cylinder wall: a closed loop of rim pairs.
pub fn open_cylinder_vertex_count(segments: u32) -> usize {
    (segments as usize + 1) * 2
}

/// Vertices taken by [`create_puck`].
pub fn puck_vertex_count(segments: u32) -> usize {
    circle_vertex_count(segments) + open_cylinder_vertex_count(segments)
}

/// Vertices taken by [`create_mallet`].
pub fn mallet_vertex_count(segments: u32) -> usize {
    circle_vertex_count(segments) * 2 + open_cylinder_vertex_count(segments) * 2
}

/// Accumulates primitives into one vertex buffer and command list.
#[derive(Debug)]
pub struct SolidBuilder {
    vertex_data: Vec<f32>,
    commands: Vec<DrawCommand>,
}

impl SolidBuilder {
    /// Creates a builder with room reserved for `vertices` vertices.
    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            vertex_data: Vec::with_capacity(vertices * FLOATS_PER_VERTEX),
            commands: Vec::new(),
        }
    }

    fn vertex_count(&self) -> u32 {
        (self.vertex_data.len() / FLOATS_PER_VERTEX) as u32
    }

    fn push_vertex(&mut self, x: f32, y: f32, z: f32) {
        self.vertex_data.push(x);
        self.vertex_data.push(y);
        self.vertex_data.push(z);
    }

    /// Appends a fan disc: center vertex, then the rim walked from 0 to a
    /// full turn inclusive, so the first rim vertex repeats to close the fan.
    pub fn append_circle(&mut self, circle: Circle, segments: u32) -> Result<()> {
        if segments == 0 {
            return Err(EmberError::InvalidParameter {
                what: "circle needs at least one segment",
            });
        }
        let first_vertex = self.vertex_count();
        self.push_vertex(circle.center.x, circle.center.y, circle.center.z);
        for i in 0..=segments {
            let angle = i as f32 / segments as f32 * TAU;
            self.push_vertex(
                circle.center.x + circle.radius * angle.cos(),
                circle.center.y,
                circle.center.z + circle.radius * angle.sin(),
            );
        }
        self.commands.push(DrawCommand {
            topology: SolidTopology::TriangleFan,
            first_vertex,
            vertex_count: self.vertex_count() - first_vertex,
        });
        Ok(())
    }

    /// Appends an open cylinder wall as a strip of bottom/top rim pairs,
    /// again walking the rim a full turn inclusive to close the loop.
    pub fn append_open_cylinder(&mut self, cylinder: Cylinder, segments: u32) -> Result<()> {
        if segments == 0 {
            return Err(EmberError::InvalidParameter {
                what: "cylinder needs at least one segment",
            });
        }
        let first_vertex = self.vertex_count();
        let y_start = cylinder.center.y - cylinder.height / 2.0;
        let y_end = cylinder.center.y + cylinder.height / 2.0;
        for i in 0..=segments {
            let angle = i as f32 / segments as f32 * TAU;
            let x = cylinder.center.x + cylinder.radius * angle.cos();
            let z = cylinder.center.z + cylinder.radius * angle.sin();
            self.push_vertex(x, y_start, z);
            self.push_vertex(x, y_end, z);
        }
        self.commands.push(DrawCommand {
            topology: SolidTopology::TriangleStrip,
            first_vertex,
            vertex_count: self.vertex_count() - first_vertex,
        });
        Ok(())
    }

    pub fn build(self) -> SolidMesh {
        SolidMesh {
            vertex_data: self.vertex_data,
            commands: self.commands,
        }
    }
}

/// Builds a puck: a top cap disc over an open side wall.
pub fn create_puck(body: Cylinder, segments: u32) -> Result<SolidMesh> {
    let mut builder = SolidBuilder::with_capacity(puck_vertex_count(segments));
    let top = Circle::new(body.center.translated_y(body.height / 2.0), body.radius);
    builder.append_circle(top, segments)?;
    builder.append_open_cylinder(body, segments)?;
    Ok(builder.build())
}

/// Builds a mallet: a wide base (lower quarter of the height) under a
/// narrow handle (upper three quarters, a third of the radius). `center`
/// is the point where base and handle meet.
pub fn create_mallet(center: Point3, radius: f32, height: f32, segments: u32) -> Result<SolidMesh> {
    let mut builder = SolidBuilder::with_capacity(mallet_vertex_count(segments));

    let base_height = height * 0.25;
    let base_circle = Circle::new(center.translated_y(-base_height), radius);
    let base_cylinder = Cylinder::new(
        base_circle.center.translated_y(-base_height / 2.0),
        radius,
        base_height,
    );
    builder.append_circle(base_circle, segments)?;
    builder.append_open_cylinder(base_cylinder, segments)?;

    let handle_height = height * 0.75;
    let handle_radius = radius / 3.0;
    let handle_circle = Circle::new(center.translated_y(height * 0.5), handle_radius);
    let handle_cylinder = Cylinder::new(
        handle_circle.center.translated_y(-handle_height / 2.0),
        handle_radius,
        handle_height,
    );
    builder.append_circle(handle_circle, segments)?;
    builder.append_open_cylinder(handle_cylinder, segments)?;

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::Point3;

    fn assert_commands_tile(mesh: &SolidMesh) {
        let mut next = 0;
        for command in mesh.commands() {
            assert_eq!(command.first_vertex, next);
            next += command.vertex_count;
        }
        assert_eq!(next, mesh.vertex_count());
    }

    #[test]
    fn circle_matches_predicted_size() {
        let mut builder = SolidBuilder::with_capacity(circle_vertex_count(16));
        builder
            .append_circle(Circle::new(Point3::ORIGIN, 1.0), 16)
            .unwrap();
        let mesh = builder.build();
        assert_eq!(mesh.vertex_count() as usize, circle_vertex_count(16));
        assert_eq!(mesh.vertex_data().len(), circle_vertex_count(16) * FLOATS_PER_VERTEX);
        assert_eq!(mesh.commands().len(), 1);
        assert_eq!(mesh.commands()[0].topology, SolidTopology::TriangleFan);
    }

    #[test]
    fn circle_rim_closes_on_first_rim_vertex() {
        let mut builder = SolidBuilder::with_capacity(circle_vertex_count(12));
        builder
            .append_circle(Circle::new(Point3::new(0.5, 2.0, -0.5), 1.5), 12)
            .unwrap();
        let mesh = builder.build();
        let data = mesh.vertex_data();
        let first_rim = &data[FLOATS_PER_VERTEX..2 * FLOATS_PER_VERTEX];
        let last = &data[data.len() - FLOATS_PER_VERTEX..];
        for (a, b) in first_rim.iter().zip(last) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn cylinder_alternates_bottom_and_top_rims() {
        let cylinder = Cylinder::new(Point3::new(0.0, 1.0, 0.0), 2.0, 0.5);
        let mut builder = SolidBuilder::with_capacity(open_cylinder_vertex_count(8));
        builder.append_open_cylinder(cylinder, 8).unwrap();
        let mesh = builder.build();
        for (i, vertex) in mesh.vertex_data().chunks_exact(FLOATS_PER_VERTEX).enumerate() {
            let expected_y = if i % 2 == 0 { 0.75 } else { 1.25 };
            assert!((vertex[1] - expected_y).abs() < 1e-6);
            let radial = (vertex[0].powi(2) + vertex[2].powi(2)).sqrt();
            assert!((radial - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn puck_fills_exactly_the_predicted_vertices() {
        let mesh = create_puck(Cylinder::new(Point3::ORIGIN, 1.0, 0.4), 32).unwrap();
        assert_eq!(mesh.vertex_count() as usize, puck_vertex_count(32));
        assert_eq!(
            mesh.vertex_data().len(),
            puck_vertex_count(32) * FLOATS_PER_VERTEX
        );
        assert_commands_tile(&mesh);
        // Cap disc sits on top of the side wall.
        assert!((mesh.vertex_data()[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn mallet_is_two_discs_and_two_walls() {
        let mesh = create_mallet(Point3::new(0.0, 0.5, 0.0), 0.3, 0.6, 24).unwrap();
        assert_eq!(mesh.vertex_count() as usize, mallet_vertex_count(24));
        assert_eq!(mesh.commands().len(), 4);
        assert_eq!(mesh.commands()[0].topology, SolidTopology::TriangleFan);
        assert_eq!(mesh.commands()[1].topology, SolidTopology::TriangleStrip);
        assert_eq!(mesh.commands()[2].topology, SolidTopology::TriangleFan);
        assert_eq!(mesh.commands()[3].topology, SolidTopology::TriangleStrip);
        assert_commands_tile(&mesh);
    }

    #[test]
    fn zero_segments_is_rejected() {
        assert!(create_puck(Cylinder::new(Point3::ORIGIN, 1.0, 1.0), 0).is_err());
        assert!(create_mallet(Point3::ORIGIN, 1.0, 1.0, 0).is_err());
        let mut builder = SolidBuilder::with_capacity(0);
        assert!(builder.append_circle(Circle::new(Point3::ORIGIN, 1.0), 0).is_err());
    }
}
