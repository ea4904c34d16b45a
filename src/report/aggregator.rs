//! Verdict aggregation and the final report.
//!
//! The aggregator is thread-confined: it lives inside the pipeline's single
//! validation worker, which serializes all counter mutation and snapshot
//! capture without locks.

use super::snapshot::FailureSnapshot;
use crate::capture::FrameBuffer;
use crate::validate::Verdict;

/// Default number of failing frames retained as snapshots.
pub const DEFAULT_SNAPSHOT_CAP: usize = 5;

/// Accumulates verdicts and retains bounded failure evidence.
///
/// Only the first `snapshot_cap` failing frames are materialized; later
/// failures are counted but not copied. Early failures are the most valuable
/// for diagnosis, so stored snapshots are never evicted.
pub struct ResultAggregator {
    pass_frames: u64,
    fail_frames: u64,
    dropped_frames: u64,
    snapshot_cap: usize,
    snapshots: Vec<FailureSnapshot>,
}

impl ResultAggregator {
    /// Creates an aggregator retaining at most `snapshot_cap` failing frames.
    pub fn new(snapshot_cap: usize) -> Self {
        Self {
            pass_frames: 0,
            fail_frames: 0,
            dropped_frames: 0,
            snapshot_cap,
            snapshots: Vec::with_capacity(snapshot_cap),
        }
    }

    /// Records one verdict, copying the frame if it failed and a snapshot
    /// slot remains.
    pub fn record(&mut self, verdict: &Verdict, buffer: &FrameBuffer<'_>) {
        if verdict.pass {
            self.pass_frames += 1;
            return;
        }

        self.fail_frames += 1;
        if self.snapshots.len() < self.snapshot_cap {
            self.snapshots
                .push(FailureSnapshot::from_buffer(buffer, verdict.sequence));
            tracing::debug!(
                seq = verdict.sequence,
                captured = self.snapshots.len(),
                cap = self.snapshot_cap,
                "Captured failure snapshot"
            );
        }
    }

    /// Records a frame dropped for an unsupported layout.
    ///
    /// Dropped frames are counted as neither pass nor fail; a systemic
    /// format error must not masquerade as a color defect.
    pub fn record_dropped(&mut self, sequence: u64) {
        self.dropped_frames += 1;
        tracing::warn!(seq = sequence, "Frame excluded from validation counters");
    }

    /// Frames recorded so far, pass and fail combined.
    pub fn judged_frames(&self) -> u64 {
        self.pass_frames + self.fail_frames
    }

    /// Terminal read; consumes the aggregator so it cannot be reused.
    pub fn finalize(self) -> Report {
        Report {
            pass_frames: self.pass_frames,
            fail_frames: self.fail_frames,
            dropped_frames: self.dropped_frames,
            snapshots: self.snapshots,
        }
    }
}

/// Final outcome of a validation run, handed to the orchestrator.
#[derive(Debug)]
pub struct Report {
    /// Frames that passed the predicate's frame rule.
    pub pass_frames: u64,
    /// Frames that failed it.
    pub fail_frames: u64,
    /// Frames dropped for unsupported pixel layouts, excluded from the
    /// pass/fail counters.
    pub dropped_frames: u64,
    /// Deep copies of the first failing frames, insertion-ordered.
    pub snapshots: Vec<FailureSnapshot>,
}

impl Report {
    /// Frames that received a pass/fail verdict.
    pub fn total_judged(&self) -> u64 {
        self.pass_frames + self.fail_frames
    }

    /// Fraction of judged frames that failed, or 0.0 if none were judged.
    pub fn fail_ratio(&self) -> f64 {
        let total = self.total_judged();
        if total == 0 {
            0.0
        } else {
            self.fail_frames as f64 / total as f64
        }
    }

    /// Returns true if the fail ratio is at or above `threshold`.
    ///
    /// A near-total failure usually means the content was never rendered or
    /// captured at all (an obstruction), not a precise color defect, and
    /// deserves distinct reporting.
    pub fn is_obstructed(&self, threshold: f64) -> bool {
        self.total_judged() > 0 && self.fail_ratio() >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Frame, FrameBuffer, PixelFormat};
    use crate::validate::Verdict;

    fn red_frame(sequence: u64) -> Frame {
        let data = [255u8, 0, 0, 255].repeat(4);
        Frame::new(data, 2, 2, 8, PixelFormat::Rgba8888, sequence)
    }

    fn verdict(sequence: u64, pass: bool) -> Verdict {
        Verdict {
            sequence,
            matched_pixels: if pass { 4 } else { 0 },
            total_pixels: 4,
            pass,
        }
    }

    #[test]
    fn test_pass_frames_not_snapshotted() {
        let mut aggregator = ResultAggregator::new(5);
        let frame = red_frame(0);
        let buffer = FrameBuffer::from_frame(&frame).unwrap();

        aggregator.record(&verdict(0, true), &buffer);
        let report = aggregator.finalize();
        assert_eq!(report.pass_frames, 1);
        assert_eq!(report.fail_frames, 0);
        assert!(report.snapshots.is_empty());
    }

    #[test]
    fn test_snapshot_cap_bounds_memory() {
        let mut aggregator = ResultAggregator::new(2);
        for seq in 0..6 {
            let frame = red_frame(seq);
            let buffer = FrameBuffer::from_frame(&frame).unwrap();
            aggregator.record(&verdict(seq, false), &buffer);
        }
        assert_eq!(aggregator.judged_frames(), 6);

        let report = aggregator.finalize();
        assert_eq!(report.fail_frames, 6);
        assert_eq!(report.snapshots.len(), 2);
        // First failures are kept, never evicted
        assert_eq!(report.snapshots[0].sequence(), 0);
        assert_eq!(report.snapshots[1].sequence(), 1);
    }

    #[test]
    fn test_dropped_frames_not_judged() {
        let mut aggregator = ResultAggregator::new(5);
        aggregator.record_dropped(0);
        aggregator.record_dropped(1);
        assert_eq!(aggregator.judged_frames(), 0);

        let report = aggregator.finalize();
        assert_eq!(report.dropped_frames, 2);
        assert_eq!(report.total_judged(), 0);
        assert_eq!(report.fail_ratio(), 0.0);
        assert!(!report.is_obstructed(0.95));
    }

    #[test]
    fn test_fail_ratio_and_obstruction() {
        let mut aggregator = ResultAggregator::new(0);
        let frame = red_frame(0);
        let buffer = FrameBuffer::from_frame(&frame).unwrap();
        for seq in 0..20 {
            aggregator.record(&verdict(seq, seq == 0), &buffer);
        }

        let report = aggregator.finalize();
        assert_eq!(report.fail_ratio(), 0.95);
        assert!(report.is_obstructed(0.95));
        assert!(!report.is_obstructed(0.99));
        assert!(report.snapshots.is_empty());
    }
}
