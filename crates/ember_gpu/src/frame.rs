//! Per-frame draw context.

use ember_core::Mat4;

/// Values shared by every layer for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameParams {
    /// Seconds since the renderer started.
    pub time: f32,
    pub view: Mat4,
    pub projection: Mat4,
    /// Rotation-only view for sky rendering.
    pub skybox_view: Mat4,
    pub viewport: (u32, u32),
}

/// One frame's render pass plus the shared parameters.
///
/// The pass is detached from the encoder's lifetime so the context can own
/// it; dropping the context ends the pass, after which the renderer
/// finishes and submits the encoder.
pub struct FrameContext {
    pass: wgpu::RenderPass<'static>,
    params: FrameParams,
}

impl FrameContext {
    pub fn new(pass: wgpu::RenderPass<'static>, params: FrameParams) -> Self {
        Self { pass, params }
    }

    pub fn pass(&mut self) -> &mut wgpu::RenderPass<'static> {
        &mut self.pass
    }

    pub fn params(&self) -> &FrameParams {
        &self.params
    }
}
