//! Static image backdrop layer.
//!
//! One RGBA image, uploaded when the surface comes up and stretched
//! across the viewport every frame. The pixels stay on the CPU side so a
//! recreated surface can upload them again.

use bytemuck::{Pod, Zeroable};
use ember_core::{EmberError, Result};

use crate::compositor::RenderLayer;
use crate::context::GpuContext;
use crate::frame::FrameContext;
use crate::layers::{depth_state, primitive_state, sampled_texture_bind_group_layout};
use crate::shaders::IMAGE_SHADER;
use crate::slot::PixelFrame;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BackdropUniforms {
    uv_scale: [f32; 4],
}

struct ImageResources {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

fn validate_backdrop(frame: &PixelFrame) -> Result<()> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.width == 0 || frame.height == 0 || frame.data.len() != expected {
        return Err(EmberError::InvalidDimensions {
            width: frame.width,
            height: frame.height,
        });
    }
    Ok(())
}

/// Full-viewport backdrop from a fixed RGBA image.
pub struct ImageLayer {
    context: GpuContext,
    frame: PixelFrame,
    resources: Option<ImageResources>,
}

impl ImageLayer {
    /// Fails if the frame is empty or its byte length does not match its
    /// dimensions at four bytes per pixel.
    pub fn new(context: GpuContext, frame: PixelFrame) -> Result<Self> {
        validate_backdrop(&frame)?;
        Ok(Self {
            context,
            frame,
            resources: None,
        })
    }

    fn create_resources(&self) -> ImageResources {
        let device = self.context.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Backdrop Shader"),
            source: wgpu::ShaderSource::Wgsl(IMAGE_SHADER.into()),
        });

        let bind_group_layout = sampled_texture_bind_group_layout(device, "Image Bind Group Layout");

        let texture = crate::texture::PixelTexture::new(
            device,
            "Image Texture",
            wgpu::TextureFormat::Rgba8UnormSrgb,
            self.frame.width,
            self.frame.height,
            4,
        );
        texture.write(self.context.queue(), &self.frame);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Image Uniform Buffer"),
            size: std::mem::size_of::<BackdropUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniforms = BackdropUniforms {
            uv_scale: [1.0, 1.0, 0.0, 0.0],
        };
        self.context
            .queue()
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Image Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
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
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Image Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Image Pipeline"),
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
            depth_stencil: Some(depth_state(false, wgpu::CompareFunction::Always)),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        ImageResources {
            pipeline,
            bind_group,
        }
    }
}

impl RenderLayer<FrameContext> for ImageLayer {
    fn on_surface_created(&mut self) {
        self.resources = Some(self.create_resources());
    }

    fn on_surface_changed(&mut self, _width: u32, _height: u32) {}

    fn on_draw_frame(&mut self, frame: &mut FrameContext) {
        let Some(resources) = &self.resources else {
            return;
        };
        let pass = frame.pass();
        pass.set_pipeline(&resources.pipeline);
        pass.set_bind_group(0, &resources.bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}
