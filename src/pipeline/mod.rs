//! Capture pipeline: producer intake, worker scheduling, and shutdown.
//!
//! One producer context (the capture source's callback, on an arbitrary
//! thread) delivers frames; exactly one dedicated worker thread validates
//! them and mutates the aggregator. The pipeline moves through
//! `Running -> Draining -> Finished`: `finish()` closes intake, posts a
//! flush task on the same worker queue so in-flight frames complete first,
//! and joins the worker.

mod config;
mod signal;
mod worker;

pub use config::{CaptureSettings, ConfigError, FileConfig, PipelineConfig};

use crate::capture::{CaptureSource, Frame};
use crate::report::{Report, ResultAggregator};
use crate::validate::{FrameValidator, PixelPredicate, Region, RegionError};
use crossbeam_channel::{Sender, TrySendError};
use signal::TargetSignal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use worker::{WorkerContext, WorkerMsg};

/// Errors surfaced by the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid region of interest: {0}")]
    InvalidRegion(#[from] RegionError),
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("failed to start validation worker: {0}")]
    WorkerStartFailed(String),
    #[error("pipeline already finished")]
    PipelineClosed,
    #[error("worker queue full")]
    QueueFull,
    #[error("validation worker did not flush in time")]
    FlushTimeout,
}

/// Receives frames from a capture source and validates them on a single
/// dedicated worker thread.
///
/// Construction clamps the region of interest to the source's frame bounds
/// and spawns the worker; failure to start the worker is fatal rather than
/// degrading to synchronous processing, which would stall frame delivery
/// inside the producer's callback.
pub struct CapturePipeline {
    source: Arc<dyn CaptureSource>,
    sender: Mutex<Option<Sender<WorkerMsg>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    signal: Arc<TargetSignal>,
    processed: Arc<AtomicU64>,
    flush_timeout: Duration,
}

impl CapturePipeline {
    /// Builds the pipeline and starts its worker.
    pub fn new<S>(
        source: Arc<S>,
        region: Region,
        predicate: PixelPredicate,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError>
    where
        S: CaptureSource + 'static,
    {
        config.validate()?;
        let source: Arc<dyn CaptureSource> = source;
        let info = source.info();
        let region = region.clamped_to(info.width, info.height)?;

        let (tx, rx) = match config.channel_capacity {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };
        let signal = Arc::new(TargetSignal::new());
        let processed = Arc::new(AtomicU64::new(0));

        let ctx = WorkerContext {
            source: Arc::clone(&source),
            region,
            predicate,
            validator: FrameValidator::new(),
            aggregator: ResultAggregator::new(config.snapshot_cap),
            target_frames: config.target_frames,
            processed: Arc::clone(&processed),
            signal: Arc::clone(&signal),
        };

        let handle = std::thread::Builder::new()
            .name("pixel-validator".into())
            .spawn(move || worker::run(ctx, rx))
            .map_err(|e| PipelineError::WorkerStartFailed(e.to_string()))?;

        tracing::info!(
            width = info.width,
            height = info.height,
            region = ?region,
            target_frames = config.target_frames,
            "Capture pipeline running"
        );

        Ok(Self {
            source,
            sender: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(handle)),
            signal,
            processed,
            flush_timeout: config.flush_timeout(),
        })
    }

    /// Accepts a frame from the capture source.
    ///
    /// Producer-facing and non-blocking: the frame is queued for the worker
    /// and the call returns immediately. A refused frame is released back to
    /// the source before the error is returned, so the exactly-once release
    /// contract holds regardless of the outcome: a full bounded queue
    /// reports [`PipelineError::QueueFull`], and delivery after
    /// [`finish`](Self::finish) reports [`PipelineError::PipelineClosed`].
    pub fn on_frame_ready(&self, frame: Frame) -> Result<(), PipelineError> {
        let guard = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = guard.as_ref() else {
            drop(guard);
            return Err(self.refuse(frame, PipelineError::PipelineClosed));
        };
        match tx.try_send(WorkerMsg::Frame(frame)) {
            Ok(()) => Ok(()),
            Err(err) => {
                let reason = match &err {
                    TrySendError::Full(_) => PipelineError::QueueFull,
                    TrySendError::Disconnected(_) => PipelineError::PipelineClosed,
                };
                drop(guard);
                if let WorkerMsg::Frame(frame) = err.into_inner() {
                    return Err(self.refuse(frame, reason));
                }
                Err(reason)
            }
        }
    }

    /// Hands a refused frame straight back to the source.
    fn refuse(&self, frame: Frame, reason: PipelineError) -> PipelineError {
        tracing::warn!(seq = frame.sequence(), error = %reason, "Refusing frame");
        self.source.release_frame(frame);
        reason
    }

    /// Blocks the calling thread until the configured frame target has been
    /// processed or `timeout` elapses.
    ///
    /// Returns false on timeout, which is an expected outcome of a slow or
    /// stalled capture, not an error. Never blocks the worker or the
    /// producer.
    pub fn wait_until_target(&self, timeout: Duration) -> bool {
        self.signal.wait(timeout)
    }

    /// Returns true once the frame target has been reached.
    pub fn target_reached(&self) -> bool {
        self.signal.is_set()
    }

    /// Frames handled by the worker so far, dropped frames included.
    pub fn frames_processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Stops intake, drains in-flight frames, and returns the final report.
    ///
    /// The flush task runs on the same worker that processes frames, so any
    /// frame notification already queued completes before the aggregator is
    /// finalized. Blocks up to the configured flush timeout; exceeding it is
    /// a fatal [`PipelineError::FlushTimeout`]. A second call reports
    /// [`PipelineError::PipelineClosed`].
    pub fn finish(&self) -> Result<Report, PipelineError> {
        let tx = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(PipelineError::PipelineClosed)?;

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        tx.send(WorkerMsg::Flush(reply_tx))
            .map_err(|_| PipelineError::FlushTimeout)?;
        drop(tx);

        let report = reply_rx
            .recv_timeout(self.flush_timeout)
            .map_err(|_| PipelineError::FlushTimeout)?;

        if let Some(handle) = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = handle.join();
        }

        tracing::info!(
            pass = report.pass_frames,
            fail = report.fail_frames,
            dropped = report.dropped_frames,
            snapshots = report.snapshots.len(),
            "Capture pipeline finished"
        );
        Ok(report)
    }
}

impl Drop for CapturePipeline {
    fn drop(&mut self) {
        // Closing the channel lets an unflushed worker drain and exit;
        // its evidence is discarded since no report was requested.
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = handle.join();
        }
    }
}
