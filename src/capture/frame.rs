//! Frame handle and pixel buffer view.
//!
//! A `Frame` carries custody of one capture buffer from the producer to the
//! validation worker; the `FrameBuffer` view borrows from it, so pixel access
//! cannot outlive the hand-back to the capture source.

use super::format::{PixelColor, PixelFormat};
use thiserror::Error;

/// Errors raised when a frame's pixel layout cannot be decoded.
#[derive(Debug, Clone, Error)]
pub enum FrameError {
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(PixelFormat),
    #[error("row stride {stride} smaller than row width {min} bytes")]
    StrideTooSmall { stride: usize, min: usize },
    #[error("backing buffer holds {actual} bytes, layout requires {needed}")]
    BufferTooSmall { needed: usize, actual: usize },
}

/// One captured frame, identified by a monotonic sequence number.
///
/// The capture source owns the underlying buffer pool; a `Frame` holds one
/// buffer on loan and must be returned via
/// [`CaptureSource::release_frame`](super::CaptureSource::release_frame)
/// exactly once after validation.
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    row_stride: usize,
    format: PixelFormat,
    sequence: u64,
}

impl Frame {
    /// Creates a frame over the given buffer.
    ///
    /// `row_stride` is in bytes and may exceed `width * 4` due to hardware
    /// alignment; the layout is only checked when a [`FrameBuffer`] view is
    /// constructed.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        row_stride: usize,
        format: PixelFormat,
        sequence: u64,
    ) -> Self {
        Self {
            data,
            width,
            height,
            row_stride,
            format,
            sequence,
        }
    }

    /// Returns the frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the row stride in bytes.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Returns the pixel layout.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the monotonic sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Consumes the frame, yielding the backing buffer for pool reuse.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("sequence", &self.sequence)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("row_stride", &self.row_stride)
            .field("format", &self.format)
            .finish()
    }
}

/// Read-only pixel view over a [`Frame`].
///
/// Construction validates the layout: the format must be a supported
/// 4-byte-per-pixel one and the backing buffer must cover
/// `row_stride * height` bytes. The borrow ties the view's lifetime to the
/// frame, so it cannot be retained past release.
pub struct FrameBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    row_stride: usize,
    format: PixelFormat,
}

impl<'a> FrameBuffer<'a> {
    /// Builds a view over the frame, rejecting layouts the validator
    /// cannot decode.
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        if !frame.format().is_supported() {
            return Err(FrameError::UnsupportedFormat(frame.format()));
        }
        let min_stride = frame.width() as usize * PixelFormat::bytes_per_pixel();
        if frame.row_stride() < min_stride {
            return Err(FrameError::StrideTooSmall {
                stride: frame.row_stride(),
                min: min_stride,
            });
        }
        let needed = frame.row_stride() * frame.height() as usize;
        if frame.data().len() < needed {
            return Err(FrameError::BufferTooSmall {
                needed,
                actual: frame.data().len(),
            });
        }
        Ok(Self {
            data: frame.data(),
            width: frame.width(),
            height: frame.height(),
            row_stride: frame.row_stride(),
            format: frame.format(),
        })
    }

    /// Returns the frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reads the pixel at `(x, y)`, accounting for row stride and channel
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the frame. Callers iterate regions
    /// that were clamped to frame bounds at pipeline construction.
    #[inline]
    pub fn pixel_at(&self, x: u32, y: u32) -> PixelColor {
        debug_assert!(x < self.width && y < self.height);
        let offset = y as usize * self.row_stride + x as usize * PixelFormat::bytes_per_pixel();
        let px = &self.data[offset..offset + PixelFormat::bytes_per_pixel()];
        match self.format {
            PixelFormat::Rgba8888 => PixelColor::new(px[0], px[1], px[2], px[3]),
            PixelFormat::Bgra8888 => PixelColor::new(px[2], px[1], px[0], px[3]),
            // Rejected at construction.
            PixelFormat::Unrecognized(_) => unreachable!("unsupported format passed validation"),
        }
    }
}
