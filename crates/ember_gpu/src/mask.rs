//! Segmentation mask ingestion.
//!
//! Producer threads publish confidence frames into a [`FrameSlot`]; the
//! render thread drains the slot once per frame and refreshes a persistent
//! single-channel texture. The overlay shader reads confidence straight
//! from the texture, so a frame that is published but not yet consumed
//! simply tints one frame late.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::slot::{FrameSlot, PixelFrame};
use crate::texture::PixelTexture;

/// Where the mask stream is, as seen from the render thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskPhase {
    /// Nothing published and nothing uploaded; the overlay draws nothing.
    NoMask,
    /// A frame is waiting in the slot for the next consume.
    PendingUpload,
    /// The texture holds the most recently consumed frame.
    Uploaded,
}

/// Drains a [`FrameSlot`] into a lazily allocated texture.
///
/// The texture is allocated once at the configured maximum extent; frames
/// land in its top-left corner and the shader is told the content scale.
/// Frames larger than the allocation are dropped with a warning rather
/// than reallocating mid-stream.
pub struct MaskUploader {
    slot: Arc<FrameSlot>,
    texture: Option<PixelTexture>,
    content: Option<(u32, u32)>,
    format: wgpu::TextureFormat,
    max_width: u32,
    max_height: u32,
}

impl MaskUploader {
    pub fn new(
        slot: Arc<FrameSlot>,
        format: wgpu::TextureFormat,
        max_width: u32,
        max_height: u32,
    ) -> Self {
        Self {
            slot,
            texture: None,
            content: None,
            format,
            max_width,
            max_height,
        }
    }

    pub fn phase(&self) -> MaskPhase {
        if self.slot.has_frame() {
            MaskPhase::PendingUpload
        } else if self.content.is_some() {
            MaskPhase::Uploaded
        } else {
            MaskPhase::NoMask
        }
    }

    /// Whether a frame fits the (eventual) allocation.
    pub fn accepts(&self, frame: &PixelFrame) -> bool {
        frame.width <= self.max_width && frame.height <= self.max_height
    }

    /// Takes the pending frame, if any, and uploads it.
    ///
    /// Returns `true` when the texture allocation was just created, which
    /// invalidates any bind group referencing the previous view.
    pub fn consume_and_upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let Some(frame) = self.slot.take() else {
            return false;
        };
        if !self.accepts(&frame) {
            warn!(
                width = frame.width,
                height = frame.height,
                max_width = self.max_width,
                max_height = self.max_height,
                "dropping oversized mask frame"
            );
            return false;
        }

        let mut allocated = false;
        let texture = self.texture.get_or_insert_with(|| {
            allocated = true;
            debug!(
                width = self.max_width,
                height = self.max_height,
                "allocating mask texture"
            );
            PixelTexture::new(
                device,
                "Mask Texture",
                self.format,
                self.max_width,
                self.max_height,
                self.slot.bytes_per_pixel(),
            )
        });
        texture.write(queue, &frame);
        self.content = Some((frame.width, frame.height));
        allocated
    }

    /// Texture-space extent of the uploaded content.
    pub fn uv_scale(&self) -> Option<[f32; 2]> {
        let (width, height) = self.content?;
        Some(self.texture.as_ref()?.uv_scale(width, height))
    }

    pub fn texture(&self) -> Option<&PixelTexture> {
        self.texture.as_ref()
    }

    /// Drops the allocation so the next consume rebuilds it. Used when the
    /// surface and its resources are recreated.
    pub fn reset(&mut self) {
        self.texture = None;
        self.content = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_no_mask_and_tracks_pending() {
        let slot = Arc::new(FrameSlot::new(1));
        let uploader = MaskUploader::new(Arc::clone(&slot), wgpu::TextureFormat::R8Unorm, 64, 64);
        assert_eq!(uploader.phase(), MaskPhase::NoMask);

        slot.publish(PixelFrame::new(8, 8, vec![0; 64])).unwrap();
        assert_eq!(uploader.phase(), MaskPhase::PendingUpload);
    }

    #[test]
    fn oversized_frames_are_refused() {
        let slot = Arc::new(FrameSlot::new(1));
        let uploader = MaskUploader::new(slot, wgpu::TextureFormat::R8Unorm, 16, 16);
        assert!(uploader.accepts(&PixelFrame::new(16, 16, vec![0; 256])));
        assert!(!uploader.accepts(&PixelFrame::new(17, 4, vec![0; 68])));
        assert!(!uploader.accepts(&PixelFrame::new(4, 17, vec![0; 68])));
    }
}
