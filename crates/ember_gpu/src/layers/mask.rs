//! Segmentation mask overlay layer.
//!
//! Draws the streamed confidence mask over the whole scene as a magenta
//! tint. Visibility follows a shared flag toggled from input handling;
//! while hidden the layer keeps consuming published masks so the newest
//! one shows the moment the overlay comes back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::compositor::RenderLayer;
use crate::context::GpuContext;
use crate::frame::FrameContext;
use crate::layers::{depth_state, primitive_state, sampled_texture_bind_group_layout};
use crate::mask::MaskUploader;
use crate::shaders::MASK_SHADER;
use crate::slot::FrameSlot;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct MaskUniforms {
    uv_scale: [f32; 4],
}

struct MaskResources {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
}

/// Alpha-blended overlay visualizing a streamed confidence mask.
pub struct MaskLayer {
    context: GpuContext,
    uploader: MaskUploader,
    overlay_enabled: Arc<AtomicBool>,
    resources: Option<MaskResources>,
}

impl MaskLayer {
    /// `overlay_enabled` usually comes from `ViewRig::overlay_flag`, so a
    /// tap on the view toggles this layer.
    pub fn new(
        context: GpuContext,
        slot: Arc<FrameSlot>,
        max_width: u32,
        max_height: u32,
        overlay_enabled: Arc<AtomicBool>,
    ) -> Self {
        let uploader = MaskUploader::new(
            slot,
            wgpu::TextureFormat::R8Unorm,
            max_width,
            max_height,
        );
        Self {
            context,
            uploader,
            overlay_enabled,
            resources: None,
        }
    }

    fn create_resources(&self) -> MaskResources {
        let device = self.context.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mask Shader"),
            source: wgpu::ShaderSource::Wgsl(MASK_SHADER.into()),
        });

        let bind_group_layout = sampled_texture_bind_group_layout(device, "Mask Bind Group Layout");

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mask Uniform Buffer"),
            size: std::mem::size_of::<MaskUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mask Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mask Pipeline"),
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
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(),
            // Overlays everything regardless of scene depth.
            depth_stencil: Some(depth_state(false, wgpu::CompareFunction::Always)),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        MaskResources {
            pipeline,
            uniform_buffer,
            bind_group_layout,
            bind_group: None,
        }
    }
}

impl RenderLayer<FrameContext> for MaskLayer {
    fn on_surface_created(&mut self) {
        self.resources = Some(self.create_resources());
        // Any previously uploaded mask lived on the old device.
        self.uploader.reset();
    }

    fn on_surface_changed(&mut self, _width: u32, _height: u32) {}

    fn on_draw_frame(&mut self, frame: &mut FrameContext) {
        let Some(resources) = &mut self.resources else {
            return;
        };

        let device = self.context.device();
        let allocated = self
            .uploader
            .consume_and_upload(device, self.context.queue());
        if allocated {
            if let Some(texture) = self.uploader.texture() {
                resources.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Mask Bind Group"),
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

        if !self.overlay_enabled.load(Ordering::Relaxed) {
            return;
        }
        let (Some(bind_group), Some([u, v])) = (&resources.bind_group, self.uploader.uv_scale())
        else {
            return;
        };

        let uniforms = MaskUniforms {
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
