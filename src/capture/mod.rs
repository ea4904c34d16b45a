//! Frame acquisition and pixel buffer handling.
//!
//! This module defines how captured frames enter the validation pipeline:
//! the pixel layouts the validator understands, the frame handle whose
//! buffer is on loan from the capture source, and the source abstraction
//! through which buffers are handed back.

mod format;
mod frame;
mod source;

pub use format::{PixelColor, PixelFormat};
pub use frame::{Frame, FrameBuffer, FrameError};
pub use source::{CaptureSource, MockCaptureSource, SourceInfo};
