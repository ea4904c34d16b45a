//! Owned copies of failing frames.

use crate::capture::{FrameBuffer, PixelColor, PixelFormat};

/// A decoded, owned copy of a failing frame, kept for diagnosis.
///
/// The copy is tightly packed RGBA with stride padding stripped and channel
/// order normalized, so it never aliases the transient frame buffer it was
/// taken from and stays valid after the frame is released.
#[derive(Clone)]
pub struct FailureSnapshot {
    sequence: u64,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FailureSnapshot {
    /// Deep-copies the frame's pixels.
    pub fn from_buffer(buffer: &FrameBuffer<'_>, sequence: u64) -> Self {
        let width = buffer.width();
        let height = buffer.height();
        let mut pixels =
            Vec::with_capacity(width as usize * height as usize * PixelFormat::bytes_per_pixel());
        for y in 0..height {
            for x in 0..width {
                let color = buffer.pixel_at(x, y);
                pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
            }
        }
        Self {
            sequence,
            width,
            height,
            pixels,
        }
    }

    /// Sequence number of the failing frame.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tightly packed RGBA pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Reads one pixel of the snapshot.
    pub fn pixel_at(&self, x: u32, y: u32) -> PixelColor {
        let off = (y as usize * self.width as usize + x as usize) * PixelFormat::bytes_per_pixel();
        PixelColor::new(
            self.pixels[off],
            self.pixels[off + 1],
            self.pixels[off + 2],
            self.pixels[off + 3],
        )
    }
}

impl std::fmt::Debug for FailureSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureSnapshot")
            .field("sequence", &self.sequence)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}
