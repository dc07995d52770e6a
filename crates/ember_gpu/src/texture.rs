//! Persistent textures for streamed pixel frames.

use crate::slot::PixelFrame;

/// A texture allocated once and refreshed with whole frames.
///
/// The allocation can be larger than any one frame; uploads always land at
/// the origin and cover exactly the frame's own extent, so the upload
/// region and the row stride come from the same frame and can never
/// disagree.
pub struct PixelTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
}

impl PixelTexture {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        bytes_per_pixel: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
            bytes_per_pixel,
        }
    }

    /// Uploads `frame` into the top-left corner of the allocation. The
    /// frame must not exceed the allocated extent.
    pub fn write(&self, queue: &wgpu::Queue, frame: &PixelFrame) {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &frame.data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(frame.width * self.bytes_per_pixel),
                rows_per_image: Some(frame.height),
            },
            wgpu::Extent3d {
                width: frame.width,
                height: frame.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Texture-space scale of a content region, for shaders that must not
    /// sample the unwritten remainder of the allocation.
    pub fn uv_scale(&self, content_width: u32, content_height: u32) -> [f32; 2] {
        [
            content_width as f32 / self.width as f32,
            content_height as f32 / self.height as f32,
        ]
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
