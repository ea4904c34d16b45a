//! Validation worker loop.
//!
//! One dedicated thread performs all validation, aggregation, and counter
//! mutation. Frames and the final flush travel over the same channel, so a
//! flush enqueued behind in-flight frames drains them before the aggregator
//! is finalized.

use super::signal::TargetSignal;
use crate::capture::{CaptureSource, Frame, FrameBuffer};
use crate::report::{Report, ResultAggregator};
use crate::validate::{FrameValidator, PixelPredicate, Region};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Messages handled by the worker, in delivery order.
pub(crate) enum WorkerMsg {
    /// A frame ready for validation.
    Frame(Frame),
    /// Finalize the aggregator and reply with the report.
    Flush(Sender<Report>),
}

/// Everything the worker thread owns for one validation run.
pub(crate) struct WorkerContext {
    pub source: Arc<dyn CaptureSource>,
    pub region: Region,
    pub predicate: PixelPredicate,
    pub validator: FrameValidator,
    pub aggregator: ResultAggregator,
    pub target_frames: u64,
    pub processed: Arc<AtomicU64>,
    pub signal: Arc<TargetSignal>,
}

/// Runs the worker loop until a flush message or channel disconnect.
pub(crate) fn run(mut ctx: WorkerContext, rx: Receiver<WorkerMsg>) {
    tracing::debug!(
        target_frames = ctx.target_frames,
        region = ?ctx.region,
        "Validation worker started"
    );

    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMsg::Frame(frame) => handle_frame(&mut ctx, frame),
            WorkerMsg::Flush(reply) => {
                let report = ctx.aggregator.finalize();
                tracing::info!(
                    pass = report.pass_frames,
                    fail = report.fail_frames,
                    dropped = report.dropped_frames,
                    "Validation worker flushed"
                );
                // The finisher may have timed out and gone away; nothing
                // left to do with the report in that case.
                let _ = reply.send(report);
                return;
            }
        }
    }

    // Channel disconnected without a flush: the pipeline was dropped
    // without a report being requested. Evidence is discarded.
    tracing::debug!("Validation worker exiting without flush");
}

fn handle_frame(ctx: &mut WorkerContext, frame: Frame) {
    let sequence = frame.sequence();

    match FrameBuffer::from_frame(&frame) {
        Ok(buffer) => {
            let verdict = ctx
                .validator
                .validate(&buffer, &ctx.region, &ctx.predicate, sequence);
            ctx.aggregator.record(&verdict, &buffer);
        }
        Err(err) => {
            // Neither pass nor fail: a systemic format error must not be
            // counted as a color defect.
            tracing::warn!(seq = sequence, error = %err, "Dropping undecodable frame");
            ctx.aggregator.record_dropped(sequence);
        }
    }

    // Buffer view is gone; hand the frame back before touching the signal.
    ctx.source.release_frame(frame);

    let processed = ctx.processed.fetch_add(1, Ordering::Relaxed) + 1;
    if processed >= ctx.target_frames {
        ctx.signal.notify();
    }
}
