//! Heightmap terrain layer.
//!
//! Uploads a triangulated height field once and redraws it every frame
//! with directional lighting. Solid props (pucks, mallets) ride along in
//! the same layer so the whole ground scene shares one depth story:
//! terrain and props both write depth, everything later in the stack
//! tests against them.

use bytemuck::{Pod, Zeroable};
use ember_core::{Color, Mat4, Vec3};
use ember_scene::{HeightmapMesh, SolidMesh};

use crate::compositor::RenderLayer;
use crate::context::GpuContext;
use crate::frame::FrameContext;
use crate::layers::{depth_state, primitive_state, uniform_bind_group_layout};
use crate::mesh::{HeightmapMeshGpu, SolidMeshGpu};
use crate::shaders::{HEIGHTMAP_SHADER, SOLID_SHADER};

const AMBIENT_STRENGTH: f32 = 0.3;
const DIFFUSE_STRENGTH: f32 = 0.7;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct TerrainUniforms {
    mvp: [[f32; 4]; 4],
    light_dir: [f32; 4],
    base_color: [f32; 4],
    lighting: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct SolidUniforms {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
}

/// A solid mesh placed somewhere on or above the terrain.
struct PropSpec {
    mesh: SolidMesh,
    transform: Mat4,
    color: Color,
}

struct PropGpu {
    mesh: SolidMeshGpu,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct HeightmapResources {
    terrain_pipeline: wgpu::RenderPipeline,
    terrain_mesh: HeightmapMeshGpu,
    terrain_uniform_buffer: wgpu::Buffer,
    terrain_bind_group: wgpu::BindGroup,
    solid_pipeline: Option<wgpu::RenderPipeline>,
    props: Vec<PropGpu>,
}

/// Lit terrain built from a [`HeightmapMesh`], plus optional solid props.
pub struct HeightmapLayer {
    context: GpuContext,
    mesh: HeightmapMesh,
    model: Mat4,
    light_model: Vec3,
    base_color: Color,
    props: Vec<PropSpec>,
    resources: Option<HeightmapResources>,
}

impl HeightmapLayer {
    /// Places the unit-square mesh in the world as `translation(offset) *
    /// scale(scale)` and lights it from `light_direction` (world space).
    ///
    /// Scale components must be nonzero.
    pub fn new(
        context: GpuContext,
        mesh: HeightmapMesh,
        scale: Vec3,
        offset: Vec3,
        base_color: Color,
        light_direction: Vec3,
    ) -> Self {
        let model = Mat4::translation(offset.x, offset.y, offset.z).mul(&Mat4::scale(
            scale.x,
            scale.y,
            scale.z,
        ));
        // Light folded into model space so the mesh normals stay untransformed.
        let light_model = Vec3::new(
            light_direction.x / scale.x,
            light_direction.y / scale.y,
            light_direction.z / scale.z,
        )
        .normalize();
        Self {
            context,
            mesh,
            model,
            light_model,
            base_color,
            props: Vec::new(),
            resources: None,
        }
    }

    /// Adds a solid prop with its own world transform and flat color.
    pub fn with_prop(mut self, mesh: SolidMesh, transform: Mat4, color: Color) -> Self {
        self.props.push(PropSpec {
            mesh,
            transform,
            color,
        });
        self
    }

    fn create_resources(&self) -> HeightmapResources {
        let device = self.context.device();

        let bind_group_layout = uniform_bind_group_layout(device, "Terrain Bind Group Layout");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Terrain Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let terrain_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(HEIGHTMAP_SHADER.into()),
        });

        let terrain_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: (6 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position: vec3<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                // normal: vec3<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
                    shader_location: 1,
                },
            ],
        };

        let terrain_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Terrain Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &terrain_shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[terrain_vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &terrain_shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.context.texture_format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(),
            depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let terrain_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Terrain Uniform Buffer"),
            size: std::mem::size_of::<TerrainUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let terrain_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Terrain Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: terrain_uniform_buffer.as_entire_binding(),
            }],
        });

        let terrain_mesh = HeightmapMeshGpu::new(device, &self.mesh);

        let solid_pipeline = (!self.props.is_empty()).then(|| {
            let solid_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Solid Shader"),
                source: wgpu::ShaderSource::Wgsl(SOLID_SHADER.into()),
            });

            let solid_vertex_layout = wgpu::VertexBufferLayout {
                array_stride: (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    // position: vec3<f32>
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    },
                ],
            };

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Solid Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &solid_shader,
                    entry_point: Some("vs_main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[solid_vertex_layout],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &solid_shader,
                    entry_point: Some("fs_main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.context.texture_format(),
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: primitive_state(),
                depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        });

        let props = self
            .props
            .iter()
            .map(|prop| {
                let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Solid Prop Uniform Buffer"),
                    size: std::mem::size_of::<SolidUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Solid Prop Bind Group"),
                    layout: &bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                });
                PropGpu {
                    mesh: SolidMeshGpu::new(device, &prop.mesh),
                    uniform_buffer,
                    bind_group,
                }
            })
            .collect();

        HeightmapResources {
            terrain_pipeline,
            terrain_mesh,
            terrain_uniform_buffer,
            terrain_bind_group,
            solid_pipeline,
            props,
        }
    }
}

impl RenderLayer<FrameContext> for HeightmapLayer {
    fn on_surface_created(&mut self) {
        self.resources = Some(self.create_resources());
    }

    fn on_surface_changed(&mut self, _width: u32, _height: u32) {}

    fn on_draw_frame(&mut self, frame: &mut FrameContext) {
        let Some(resources) = &self.resources else {
            return;
        };

        let params = *frame.params();
        let view_projection = params.projection.mul(&params.view);
        let queue = self.context.queue();

        let terrain_uniforms = TerrainUniforms {
            mvp: view_projection.mul(&self.model).cols,
            light_dir: [
                self.light_model.x,
                self.light_model.y,
                self.light_model.z,
                0.0,
            ],
            base_color: self.base_color.to_array(),
            lighting: [AMBIENT_STRENGTH, DIFFUSE_STRENGTH, 0.0, 0.0],
        };
        queue.write_buffer(
            &resources.terrain_uniform_buffer,
            0,
            bytemuck::bytes_of(&terrain_uniforms),
        );

        for (spec, gpu) in self.props.iter().zip(&resources.props) {
            let uniforms = SolidUniforms {
                mvp: view_projection.mul(&spec.transform).cols,
                color: spec.color.to_array(),
            };
            queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }

        let pass = frame.pass();
        pass.set_pipeline(&resources.terrain_pipeline);
        pass.set_bind_group(0, &resources.terrain_bind_group, &[]);
        resources.terrain_mesh.draw(pass);

        if let Some(solid_pipeline) = &resources.solid_pipeline {
            pass.set_pipeline(solid_pipeline);
            for gpu in &resources.props {
                pass.set_bind_group(0, &gpu.bind_group, &[]);
                gpu.mesh.draw(pass);
            }
        }
    }
}
