//! Frame orchestration.
//!
//! [`SceneRenderer`] owns the compositor, the shared depth buffer, and
//! the frame clock. Each drawn frame opens one render pass over the
//! caller's surface texture, hands it to every layer through a
//! [`FrameContext`], and submits the encoded commands.

use ember_core::FrameClock;
use ember_scene::ViewRig;

use crate::compositor::{FrameCompositor, RenderLayer, SurfacePhase};
use crate::context::GpuContext;
use crate::frame::{FrameContext, FrameParams};

/// Depth format shared by the renderer's depth buffer and every layer
/// pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Draws the layer stack into caller-provided surface textures.
pub struct SceneRenderer {
    context: GpuContext,
    compositor: FrameCompositor<FrameContext>,
    depth: Option<DepthTarget>,
    clock: FrameClock,
}

impl SceneRenderer {
    pub fn new(context: GpuContext) -> Self {
        Self {
            context,
            compositor: FrameCompositor::new(),
            depth: None,
            clock: FrameClock::new(),
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// Registers a layer behind all existing ones. Layers added after the
    /// surface came up are brought up to date immediately.
    pub fn add_layer(&mut self, layer: Box<dyn RenderLayer<FrameContext>>) {
        self.compositor.add_layer(layer);
    }

    /// Reports a created (or recreated) surface to every layer.
    pub fn surface_created(&mut self) {
        self.compositor.surface_created();
    }

    /// Reports the surface size and rebuilds the depth buffer to match.
    pub fn surface_changed(&mut self, width: u32, height: u32) {
        self.depth = (width > 0 && height > 0).then(|| self.create_depth_target(width, height));
        self.compositor.surface_changed(width, height);
    }

    fn create_depth_target(&self, width: u32, height: u32) -> DepthTarget {
        let texture = self
            .context
            .device()
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        DepthTarget {
            _texture: texture,
            view,
        }
    }

    /// Renders one frame into `target` using the rig's current pose.
    ///
    /// Does nothing until the surface has been created and sized.
    pub fn draw_frame(&mut self, target: &wgpu::TextureView, rig: &ViewRig) {
        let SurfacePhase::Sized { width, height } = self.compositor.phase() else {
            return;
        };
        let Some(depth) = &self.depth else {
            return;
        };

        let params = FrameParams {
            time: self.clock.elapsed_secs(),
            view: rig.view_matrix(),
            projection: rig.projection_matrix(width, height),
            skybox_view: rig.skybox_view_matrix(),
            viewport: (width, height),
        };

        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });
        let pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime();

        let mut frame = FrameContext::new(pass, params);
        self.compositor.draw_frame(&mut frame);
        drop(frame);

        self.context
            .queue()
            .submit(std::iter::once(encoder.finish()));
    }
}
