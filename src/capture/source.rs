//! Capture source abstraction.
//!
//! This module provides a trait-based abstraction over whatever produces
//! frames (a virtual display, a compositor readback, a mock), allowing the
//! pipeline to hand buffers back without knowing the producer's internals.

use super::format::{PixelColor, PixelFormat};
use super::frame::Frame;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Static description of a capture source's output.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel layout of delivered frames.
    pub format: PixelFormat,
}

/// Trait for frame producers.
///
/// Implementations are shared between the producer context and the
/// pipeline's worker, which returns buffers after validation.
pub trait CaptureSource: Send + Sync {
    /// Describes the frames this source delivers.
    fn info(&self) -> SourceInfo;

    /// Returns a delivered frame's buffer to the source.
    ///
    /// Called exactly once per delivered frame, from the validation worker.
    fn release_frame(&self, frame: Frame);
}

/// Mock capture source that renders solid-color frames from a buffer pool.
///
/// Used by tests and the demo binary in place of a real display pipeline.
/// Tracks outstanding (delivered but unreleased) frames so tests can assert
/// the exactly-once release contract.
pub struct MockCaptureSource {
    width: u32,
    height: u32,
    row_stride: usize,
    pool: Mutex<Vec<Vec<u8>>>,
    next_sequence: AtomicU64,
    outstanding: AtomicUsize,
    released: AtomicU64,
}

impl MockCaptureSource {
    /// Creates a source producing tightly packed RGBA frames.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_stride(width, height, width as usize * PixelFormat::bytes_per_pixel())
    }

    /// Creates a source with explicit row stride, to exercise padded layouts.
    pub fn with_stride(width: u32, height: u32, row_stride: usize) -> Self {
        Self {
            width,
            height,
            row_stride,
            pool: Mutex::new(Vec::new()),
            next_sequence: AtomicU64::new(0),
            outstanding: AtomicUsize::new(0),
            released: AtomicU64::new(0),
        }
    }

    /// Renders the next frame filled with a single color.
    pub fn next_frame(&self, color: PixelColor) -> Frame {
        self.render(color, PixelFormat::Rgba8888)
    }

    /// Renders the next frame tagged with an arbitrary format.
    ///
    /// Lets tests deliver frames the validator must reject.
    pub fn next_frame_with_format(&self, color: PixelColor, format: PixelFormat) -> Frame {
        self.render(color, format)
    }

    fn render(&self, color: PixelColor, format: PixelFormat) -> Frame {
        let len = self.row_stride * self.height as usize;
        let mut data = self
            .pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();
        data.resize(len, 0);

        for y in 0..self.height as usize {
            for x in 0..self.width as usize {
                let off = y * self.row_stride + x * PixelFormat::bytes_per_pixel();
                data[off..off + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
            }
        }

        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        Frame::new(data, self.width, self.height, self.row_stride, format, sequence)
    }

    /// Number of frames delivered but not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }

    /// Total frames released back to the pool.
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }
}

impl CaptureSource for MockCaptureSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgba8888,
        }
    }

    fn release_frame(&self, frame: Frame) {
        self.outstanding.fetch_sub(1, Ordering::Relaxed);
        self.released.fetch_add(1, Ordering::Relaxed);
        self.pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame.into_data());
        tracing::trace!("Frame buffer returned to pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::FrameBuffer;

    #[test]
    fn test_sequences_start_at_zero_and_increase() {
        let source = MockCaptureSource::new(4, 4);
        assert_eq!(source.next_frame(PixelColor::RED).sequence(), 0);
        assert_eq!(source.next_frame(PixelColor::RED).sequence(), 1);
        assert_eq!(source.next_frame(PixelColor::RED).sequence(), 2);
    }

    #[test]
    fn test_release_recycles_buffer() {
        let source = MockCaptureSource::new(4, 4);
        let frame = source.next_frame(PixelColor::BLUE);
        assert_eq!(source.outstanding(), 1);

        source.release_frame(frame);
        assert_eq!(source.outstanding(), 0);
        assert_eq!(source.released(), 1);

        // Recycled buffer must be fully repainted
        let frame = source.next_frame(PixelColor::GREEN);
        let buffer = FrameBuffer::from_frame(&frame).unwrap();
        assert_eq!(buffer.pixel_at(3, 3), PixelColor::GREEN);
    }

    #[test]
    fn test_padded_stride_frames_decode() {
        let source = MockCaptureSource::with_stride(3, 2, 3 * 4 + 8);
        let frame = source.next_frame(PixelColor::YELLOW);
        let buffer = FrameBuffer::from_frame(&frame).unwrap();
        assert_eq!(buffer.pixel_at(2, 1), PixelColor::YELLOW);
    }
}
