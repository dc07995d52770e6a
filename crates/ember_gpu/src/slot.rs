//! Single-slot frame handoff between threads.

use std::sync::Mutex;

use ember_core::{EmberError, Result};

/// One frame of pixel data, tightly packed rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }
}

/// Mutex-guarded slot holding at most the latest published frame.
///
/// Producers publish whole frames at their own rate; the render thread
/// takes the slot each frame. Publishing over an unconsumed frame replaces
/// it, so a slow consumer sees only the newest frame and a torn read is
/// impossible.
#[derive(Debug)]
pub struct FrameSlot {
    frame: Mutex<Option<PixelFrame>>,
    bytes_per_pixel: u32,
}

impl FrameSlot {
    pub fn new(bytes_per_pixel: u32) -> Self {
        Self {
            frame: Mutex::new(None),
            bytes_per_pixel,
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        self.bytes_per_pixel
    }

    /// Publishes a frame, replacing any unconsumed one. Rejects frames
    /// with a zero dimension or a payload that does not match
    /// `width * height * bytes_per_pixel`.
    pub fn publish(&self, frame: PixelFrame) -> Result<()> {
        if frame.width == 0 || frame.height == 0 {
            return Err(EmberError::InvalidDimensions {
                width: frame.width,
                height: frame.height,
            });
        }
        let expected = frame.width as usize * frame.height as usize * self.bytes_per_pixel as usize;
        if frame.data.len() != expected {
            return Err(EmberError::InvalidDimensions {
                width: frame.width,
                height: frame.height,
            });
        }
        let mut slot = self.frame.lock().expect("frame slot poisoned");
        *slot = Some(frame);
        Ok(())
    }

    /// Takes the pending frame, leaving the slot empty.
    pub fn take(&self) -> Option<PixelFrame> {
        self.frame.lock().expect("frame slot poisoned").take()
    }

    pub fn has_frame(&self) -> bool {
        self.frame.lock().expect("frame slot poisoned").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn rejects_zero_dimensions_and_short_payloads() {
        let slot = FrameSlot::new(4);
        assert!(slot.publish(PixelFrame::new(0, 4, vec![])).is_err());
        assert!(slot.publish(PixelFrame::new(4, 0, vec![])).is_err());
        assert!(slot.publish(PixelFrame::new(2, 2, vec![0; 15])).is_err());
        assert!(!slot.has_frame());
        assert!(slot.publish(PixelFrame::new(2, 2, vec![0; 16])).is_ok());
        assert!(slot.has_frame());
    }

    #[test]
    fn later_frames_replace_earlier_ones() {
        let slot = FrameSlot::new(1);
        slot.publish(PixelFrame::new(1, 1, vec![1])).unwrap();
        slot.publish(PixelFrame::new(1, 1, vec![2])).unwrap();
        let frame = slot.take().unwrap();
        assert_eq!(frame.data, vec![2]);
        assert!(slot.take().is_none());
    }

    #[test]
    fn frames_cross_threads_whole() {
        let slot = Arc::new(FrameSlot::new(1));
        let producer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                for value in 0..50u8 {
                    // Alternating sizes, so a stale width paired with a new
                    // payload would surface as a length mismatch below.
                    let width = if value % 2 == 0 { 4 } else { 8 };
                    let frame = PixelFrame::new(width, 4, vec![value; width as usize * 4]);
                    slot.publish(frame).unwrap();
                }
            })
        };

        let mut polls = 0;
        while polls < 200 {
            if let Some(frame) = slot.take() {
                assert_eq!(frame.data.len(), (frame.width * frame.height) as usize);
                // Every byte of a taken frame must come from one publish.
                assert!(frame.data.iter().all(|b| *b == frame.data[0]));
            }
            polls += 1;
        }
        producer.join().unwrap();
        // Whatever the producer left last is still intact.
        if let Some(frame) = slot.take() {
            assert_eq!(frame.data.len(), (frame.width * frame.height) as usize);
            assert!(frame.data.iter().all(|b| *b == frame.data[0]));
        }
    }
}
