//! GPU-side mesh wrappers.
//!
//! Scene meshes arrive as plain arrays; upload wraps them in vertex and
//! index buffers. Fan and strip command lists are expanded to indexed
//! triangle lists here, so a single pipeline draws every solid.

use wgpu::util::DeviceExt;

use ember_scene::geometry::builder::{DrawCommand, SolidMesh, SolidTopology};
use ember_scene::geometry::heightmap::HeightmapMesh;
use ember_scene::geometry::skybox::SkyboxMesh;

/// Expands fan/strip spans into one triangle-list index buffer.
///
/// Fans pivot on the first vertex of their span; strips alternate winding
/// so every triangle keeps the orientation of the first. Spans with fewer
/// than three vertices produce nothing.
pub fn expand_to_triangle_list(commands: &[DrawCommand]) -> Vec<u16> {
    let mut indices = Vec::new();
    for command in commands {
        let first = command.first_vertex as u16;
        match command.topology {
            SolidTopology::TriangleFan => {
                for i in 1..command.vertex_count.saturating_sub(1) as u16 {
                    indices.extend_from_slice(&[first, first + i, first + i + 1]);
                }
            }
            SolidTopology::TriangleStrip => {
                for i in 0..command.vertex_count.saturating_sub(2) as u16 {
                    if i % 2 == 0 {
                        indices.extend_from_slice(&[first + i, first + i + 1, first + i + 2]);
                    } else {
                        indices.extend_from_slice(&[first + i + 1, first + i, first + i + 2]);
                    }
                }
            }
        }
    }
    indices
}

fn vertex_buffer(device: &wgpu::Device, label: &str, data: &[f32]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

fn index_buffer(device: &wgpu::Device, label: &str, data: &[u16]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::INDEX,
    })
}

/// An uploaded solid, drawable with one indexed call.
pub struct SolidMeshGpu {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl SolidMeshGpu {
    pub fn new(device: &wgpu::Device, mesh: &SolidMesh) -> Self {
        let indices = expand_to_triangle_list(mesh.commands());
        Self {
            vertex_buffer: vertex_buffer(device, "Solid Vertex Buffer", mesh.vertex_data()),
            index_buffer: index_buffer(device, "Solid Index Buffer", &indices),
            index_count: indices.len() as u32,
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Uploaded heightmap terrain.
pub struct HeightmapMeshGpu {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl HeightmapMeshGpu {
    pub fn new(device: &wgpu::Device, mesh: &HeightmapMesh) -> Self {
        Self {
            vertex_buffer: vertex_buffer(device, "Heightmap Vertex Buffer", mesh.vertex_data()),
            index_buffer: index_buffer(device, "Heightmap Index Buffer", mesh.indices()),
            index_count: mesh.index_count() as u32,
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Uploaded sky cube.
pub struct SkyboxMeshGpu {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl SkyboxMeshGpu {
    pub fn new(device: &wgpu::Device, mesh: &SkyboxMesh) -> Self {
        Self {
            vertex_buffer: vertex_buffer(device, "Skybox Vertex Buffer", mesh.positions()),
            index_buffer: index_buffer(device, "Skybox Index Buffer", mesh.indices()),
            index_count: mesh.indices().len() as u32,
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::Point3;
    use ember_scene::geometry::builder::{create_puck, puck_vertex_count};
    use ember_scene::geometry::solids::Cylinder;

    fn fan(first_vertex: u32, vertex_count: u32) -> DrawCommand {
        DrawCommand {
            topology: SolidTopology::TriangleFan,
            first_vertex,
            vertex_count,
        }
    }

    fn strip(first_vertex: u32, vertex_count: u32) -> DrawCommand {
        DrawCommand {
            topology: SolidTopology::TriangleStrip,
            first_vertex,
            vertex_count,
        }
    }

    #[test]
    fn fan_pivots_on_its_first_vertex() {
        let indices = expand_to_triangle_list(&[fan(0, 5)]);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }

    #[test]
    fn strip_alternates_winding() {
        let indices = expand_to_triangle_list(&[strip(0, 6)]);
        assert_eq!(indices, vec![0, 1, 2, 2, 1, 3, 2, 3, 4, 4, 3, 5]);
    }

    #[test]
    fn spans_keep_their_vertex_offsets() {
        let indices = expand_to_triangle_list(&[fan(0, 4), strip(4, 4)]);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 6, 5, 7]);
    }

    #[test]
    fn degenerate_spans_produce_no_triangles() {
        assert!(expand_to_triangle_list(&[fan(0, 2)]).is_empty());
        assert!(expand_to_triangle_list(&[strip(0, 2)]).is_empty());
    }

    #[test]
    fn expanded_puck_has_the_expected_triangle_count() {
        let mesh = create_puck(Cylinder::new(Point3::ORIGIN, 1.0, 0.5), 32).unwrap();
        let indices = expand_to_triangle_list(mesh.commands());
        // Fan and strip each lose two vertices to triangle count.
        let expected_triangles = (puck_vertex_count(32) - 2 * mesh.commands().len()) as u32;
        assert_eq!(indices.len() as u32, expected_triangles * 3);
        let limit = mesh.vertex_count() as u16;
        assert!(indices.iter().all(|i| *i < limit));
    }
}
