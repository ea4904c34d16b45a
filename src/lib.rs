//! Surface Validator Library
//!
//! A frame-validation pipeline for certifying that on-screen rendering
//! matches an expected pixel pattern over many captured frames.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! capture source → on_frame_ready → worker queue → validate → report
//!                                        ↓
//!                              release frame to source
//! ```
//!
//! # Design Principles
//!
//! - **Single worker**: all validation, aggregation, and counter mutation
//!   happen on one dedicated thread, so no locks guard the counters
//! - **Non-blocking intake**: the producer's frame-ready callback only
//!   enqueues; it never validates inline
//! - **Bounded evidence**: only the first few failing frames are copied;
//!   later failures are counted but not materialized
//! - **Format errors are not failures**: undecodable frames are dropped and
//!   counted separately, never folded into the fail ratio
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use surface_validator::{
//!     CapturePipeline, MockCaptureSource, PipelineConfig, PixelColor, PixelPredicate, Region,
//! };
//!
//! let source = Arc::new(MockCaptureSource::new(64, 64));
//! let pipeline = CapturePipeline::new(
//!     Arc::clone(&source),
//!     Region::new(0, 0, 64, 64),
//!     PixelPredicate::expecting(PixelColor::RED),
//!     PipelineConfig::with_target(3),
//! )
//! .unwrap();
//!
//! // The capture source's callback delivers frames from any thread
//! for _ in 0..3 {
//!     pipeline
//!         .on_frame_ready(source.next_frame(PixelColor::RED))
//!         .unwrap();
//! }
//!
//! assert!(pipeline.wait_until_target(Duration::from_secs(5)));
//! let report = pipeline.finish().unwrap();
//! assert_eq!(report.pass_frames, 3);
//! assert_eq!(report.fail_frames, 0);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod pipeline;
pub mod report;
pub mod validate;

// Re-export commonly used types at crate root
pub use capture::{CaptureSource, Frame, FrameBuffer, FrameError, MockCaptureSource, PixelColor,
    PixelFormat, SourceInfo};
pub use pipeline::{CapturePipeline, CaptureSettings, ConfigError, FileConfig, PipelineConfig,
    PipelineError};
pub use report::{FailureSnapshot, Report, ResultAggregator};
pub use validate::{FrameRule, FrameValidator, PixelPredicate, Region, RegionError, Verdict};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
