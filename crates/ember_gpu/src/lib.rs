//! Ember GPU Renderer
//!
//! Layered scene composition on wgpu.
//!
//! # Features
//!
//! - **Compositor**: broadcasts surface lifecycle and per-frame draws to an
//!   ordered stack of render layers
//! - **Layers**: skybox, heightmap terrain, instanced particle billboards,
//!   camera/image backdrops, and a segmentation mask overlay
//! - **Streaming**: single-slot frame handoff from producer threads with
//!   lazy texture upload on the render thread
//! - **Meshes**: fan/strip solids expanded to indexed triangle lists at
//!   upload time

pub mod compositor;
pub mod context;
pub mod frame;
pub mod layers;
pub mod mask;
pub mod mesh;
pub mod renderer;
pub mod shaders;
pub mod slot;
pub mod texture;

pub use compositor::{FrameCompositor, RenderLayer, SurfacePhase};
pub use context::{GpuContext, GpuContextConfig, RendererError};
pub use frame::{FrameContext, FrameParams};
pub use layers::particles::BurstQueue;
pub use layers::{
    CameraLayer, HeightmapLayer, ImageLayer, MaskLayer, ParticleLayer, SkyboxLayer,
};
pub use mask::{MaskPhase, MaskUploader};
pub use renderer::{SceneRenderer, DEPTH_FORMAT};
pub use slot::{FrameSlot, PixelFrame};
pub use texture::PixelTexture;
