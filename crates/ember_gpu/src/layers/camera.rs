//! Camera backdrop layer.
//!
//! Consumes RGBA frames from a [`FrameSlot`] fed by an external producer
//! and stretches the newest one across the viewport. The texture is
//! allocated once at the configured maximum extent; frames of any
//! smaller size land in its top-left corner and the UV scale crops the
//! unused margin away.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use tracing::warn;

use crate::compositor::RenderLayer;
use crate::context::GpuContext;
use crate::frame::FrameContext;
use crate::layers::{depth_state, primitive_state, sampled_texture_bind_group_layout};
use crate::shaders::IMAGE_SHADER;
use crate::slot::FrameSlot;
use crate::texture::PixelTexture;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BackdropUniforms {
    // xy = content extent over texture extent
    uv_scale: [f32; 4],
}

struct CameraResources {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
}

/// Full-viewport backdrop streaming from a shared frame slot.
pub struct CameraLayer {
    context: GpuContext,
    slot: Arc<FrameSlot>,
    max_width: u32,
    max_height: u32,
    texture: Option<PixelTexture>,
    content: Option<(u32, u32)>,
    resources: Option<CameraResources>,
}

impl CameraLayer {
    /// `max_width` and `max_height` bound the frames the layer accepts.
    pub fn new(context: GpuContext, slot: Arc<FrameSlot>, max_width: u32, max_height: u32) -> Self {
        Self {
            context,
            slot,
            max_width,
            max_height,
            texture: None,
            content: None,
            resources: None,
        }
    }

    fn create_resources(&self) -> CameraResources {
        let device = self.context.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Backdrop Shader"),
            source: wgpu::ShaderSource::Wgsl(IMAGE_SHADER.into()),
        });

        let bind_group_layout =
            sampled_texture_bind_group_layout(device, "Camera Bind Group Layout");

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniform Buffer"),
            size: std::mem::size_of::<BackdropUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Camera Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Camera Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
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
            // Backdrop draws first and must never clip later geometry.
            depth_stencil: Some(depth_state(false, wgpu::CompareFunction::Always)),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        CameraResources {
            pipeline,
            uniform_buffer,
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Pulls the newest published frame into the texture, if any.
    fn consume_pending_frame(&mut self) {
        let Some(frame) = self.slot.take() else {
            return;
        };
        if frame.width > self.max_width || frame.height > self.max_height {
            warn!(
                width = frame.width,
                height = frame.height,
                max_width = self.max_width,
                max_height = self.max_height,
                "dropping camera frame larger than the configured extent"
            );
            return;
        }

        let device = self.context.device();
        let mut allocated = false;
        let texture = self.texture.get_or_insert_with(|| {
            allocated = true;
            PixelTexture::new(
                device,
                "Camera Texture",
                wgpu::TextureFormat::Rgba8UnormSrgb,
                self.max_width,
                self.max_height,
                4,
            )
        });
        texture.write(self.context.queue(), &frame);
        self.content = Some((frame.width, frame.height));

        if allocated {
            if let Some(resources) = &mut self.resources {
                resources.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Camera Bind Group"),
                    layout: &resources.bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: resources.uniform_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(texture.view()),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(texture.sampler()),
                        },
                    ],
                }));
            }
        }
    }
}

impl RenderLayer<FrameContext> for CameraLayer {
    fn on_surface_created(&mut self) {
        self.resources = Some(self.create_resources());
        // A recreated surface starts from a fresh device, so any texture
        // uploaded earlier belongs to the old one.
        self.texture = None;
        self.content = None;
    }

    fn on_surface_changed(&mut self, _width: u32, _height: u32) {}

    fn on_draw_frame(&mut self, frame: &mut FrameContext) {
        self.consume_pending_frame();

        let Some(resources) = &self.resources else {
            return;
        };
        let (Some(texture), Some((content_width, content_height)), Some(bind_group)) =
            (&self.texture, self.content, &resources.bind_group)
        else {
            return;
        };

        let [u, v] = texture.uv_scale(content_width, content_height);
        let uniforms = BackdropUniforms {
            uv_scale: [u, v, 0.0, 0.0],
        };
        self.context
            .queue()
            .write_buffer(&resources.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let pass = frame.pass();
        pass.set_pipeline(&resources.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}
