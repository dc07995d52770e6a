//! Skybox layer.
//!
//! Draws a unit cube around the viewer with a procedural dusk gradient.
//! The vertex shader pins the cube to the far plane, so the layer can be
//! registered anywhere in the stack and still lose every depth test
//! against real geometry.

use bytemuck::{Pod, Zeroable};
use ember_scene::SkyboxMesh;

use crate::compositor::RenderLayer;
use crate::context::GpuContext;
use crate::frame::FrameContext;
use crate::layers::{depth_state, primitive_state, uniform_bind_group_layout};
use crate::mesh::SkyboxMeshGpu;
use crate::shaders::SKYBOX_SHADER;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct SkyboxUniforms {
    view_projection: [[f32; 4]; 4],
}

struct SkyboxResources {
    pipeline: wgpu::RenderPipeline,
    mesh: SkyboxMeshGpu,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Far-plane cube rendered with the rotation-only view matrix.
pub struct SkyboxLayer {
    context: GpuContext,
    resources: Option<SkyboxResources>,
}

impl SkyboxLayer {
    pub fn new(context: GpuContext) -> Self {
        Self {
            context,
            resources: None,
        }
    }

    fn create_resources(&self) -> SkyboxResources {
        let device = self.context.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(SKYBOX_SHADER.into()),
        });

        let bind_group_layout = uniform_bind_group_layout(device, "Skybox Bind Group Layout");

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Skybox Uniform Buffer"),
            size: std::mem::size_of::<SkyboxUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Skybox Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
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

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Skybox Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.context.texture_format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(),
            // Pinned to clip w, so it only passes where nothing else drew.
            depth_stencil: Some(depth_state(false, wgpu::CompareFunction::LessEqual)),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let mesh = SkyboxMeshGpu::new(device, &SkyboxMesh::new());

        SkyboxResources {
            pipeline,
            mesh,
            uniform_buffer,
            bind_group,
        }
    }
}

impl RenderLayer<FrameContext> for SkyboxLayer {
    fn on_surface_created(&mut self) {
        self.resources = Some(self.create_resources());
    }

    fn on_surface_changed(&mut self, _width: u32, _height: u32) {}

    fn on_draw_frame(&mut self, frame: &mut FrameContext) {
        let Some(resources) = &self.resources else {
            return;
        };

        let params = *frame.params();
        let uniforms = SkyboxUniforms {
            view_projection: params.projection.mul(&params.skybox_view).cols,
        };
        self.context.queue().write_buffer(
            &resources.uniform_buffer,
            0,
            bytemuck::bytes_of(&uniforms),
        );

        let pass = frame.pass();
        pass.set_pipeline(&resources.pipeline);
        pass.set_bind_group(0, &resources.bind_group, &[]);
        resources.mesh.draw(pass);
    }
}
