//! Per-frame pixel validation.
//!
//! This module scans a region of a captured frame against a pixel predicate
//! and produces a verdict: the aggregate match count plus the frame-level
//! pass/fail decision. Diagnostic logging of offending pixels is capped so
//! a systemic failure cannot flood the log.

mod predicate;
mod region;

pub use predicate::{FrameRule, PixelPredicate, DEFAULT_TOLERANCE};
pub use region::{Region, RegionError};

use crate::capture::FrameBuffer;

/// Maximum offending-pixel coordinates logged per failing frame.
pub const MISMATCH_LOG_CAP: usize = 100;

/// Outcome of validating one frame.
///
/// Created once per frame and consumed by the result aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Sequence number of the validated frame.
    pub sequence: u64,
    /// Pixels in the region that matched the predicate's target color.
    pub matched_pixels: u64,
    /// Pixels examined (the region's area).
    pub total_pixels: u64,
    /// Frame-level decision under the predicate's rule.
    pub pass: bool,
}

/// Scans frame regions against a pixel predicate.
///
/// Pure over its inputs aside from diagnostic logging; never mutates or
/// retains the frame buffer.
#[derive(Debug, Clone)]
pub struct FrameValidator {
    mismatch_log_cap: usize,
}

impl FrameValidator {
    /// Creates a validator with the default diagnostic log cap.
    pub fn new() -> Self {
        Self {
            mismatch_log_cap: MISMATCH_LOG_CAP,
        }
    }

    /// Creates a validator with a custom diagnostic log cap.
    pub fn with_log_cap(mismatch_log_cap: usize) -> Self {
        Self { mismatch_log_cap }
    }

    /// Validates one frame region, row-major, counting predicate matches.
    ///
    /// The region must already be clamped to the buffer's bounds. On a
    /// failing frame, the coordinates of the first offending pixels are
    /// logged at debug level, capped at the configured limit.
    pub fn validate(
        &self,
        buffer: &FrameBuffer<'_>,
        region: &Region,
        predicate: &PixelPredicate,
        sequence: u64,
    ) -> Verdict {
        // Under MatchNone the offenders are the pixels that DO hit the
        // forbidden color; under the other rules, the ones that miss.
        let offender_is_match = matches!(predicate.rule(), FrameRule::MatchNone);

        let mut matched = 0u64;
        let mut offenders: Vec<(u32, u32)> = Vec::new();

        for y in region.top()..region.bottom() {
            for x in region.left()..region.right() {
                let is_match = predicate.matches_pixel(buffer.pixel_at(x, y));
                if is_match {
                    matched += 1;
                }
                if is_match == offender_is_match && offenders.len() < self.mismatch_log_cap {
                    offenders.push((x, y));
                }
            }
        }

        let total = region.area();
        let pass = predicate.is_frame_acceptable(matched, total);

        if !pass {
            for &(x, y) in &offenders {
                tracing::debug!(seq = sequence, x, y, "Offending pixel");
            }
            tracing::debug!(
                seq = sequence,
                matched,
                total,
                logged = offenders.len(),
                "Frame failed validation"
            );
        }

        Verdict {
            sequence,
            matched_pixels: matched,
            total_pixels: total,
            pass,
        }
    }
}

impl Default for FrameValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Frame, FrameBuffer, PixelColor, PixelFormat};
    use proptest::prelude::*;

    fn rgba_frame(pixels: &[PixelColor], width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity(pixels.len() * 4);
        for color in pixels {
            data.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        Frame::new(data, width, height, width as usize * 4, PixelFormat::Rgba8888, 0)
    }

    fn solid_frame(color: PixelColor, width: u32, height: u32) -> Frame {
        rgba_frame(&vec![color; (width * height) as usize], width, height)
    }

    #[test]
    fn test_uniform_frame_full_match() {
        let frame = solid_frame(PixelColor::RED, 10, 10);
        let buffer = FrameBuffer::from_frame(&frame).unwrap();
        let region = Region::new(0, 0, 10, 10);
        let predicate = PixelPredicate::expecting(PixelColor::RED);

        let verdict = FrameValidator::new().validate(&buffer, &region, &predicate, 3);
        assert_eq!(verdict.sequence, 3);
        assert_eq!(verdict.matched_pixels, 100);
        assert_eq!(verdict.total_pixels, 100);
        assert!(verdict.pass);
    }

    #[test]
    fn test_wrong_color_zero_matches() {
        let frame = solid_frame(PixelColor::BLUE, 10, 10);
        let buffer = FrameBuffer::from_frame(&frame).unwrap();
        let region = Region::new(0, 0, 10, 10);

        let expecting = PixelPredicate::expecting(PixelColor::RED);
        let verdict = FrameValidator::new().validate(&buffer, &region, &expecting, 0);
        assert_eq!(verdict.matched_pixels, 0);
        assert!(!verdict.pass);

        let forbidding = PixelPredicate::forbidding(PixelColor::RED);
        let verdict = FrameValidator::new().validate(&buffer, &region, &forbidding, 0);
        assert_eq!(verdict.matched_pixels, 0);
        assert!(verdict.pass);
    }

    #[test]
    fn test_single_stray_pixel_fails_match_all() {
        let mut pixels = vec![PixelColor::RED; 16];
        pixels[5] = PixelColor::BLUE;
        let frame = rgba_frame(&pixels, 4, 4);
        let buffer = FrameBuffer::from_frame(&frame).unwrap();
        let region = Region::new(0, 0, 4, 4);
        let predicate = PixelPredicate::expecting(PixelColor::RED);

        let verdict = FrameValidator::new().validate(&buffer, &region, &predicate, 0);
        assert_eq!(verdict.matched_pixels, 15);
        assert!(!verdict.pass);
    }

    #[test]
    fn test_sub_region_only_examined() {
        // Red core, blue border; validate only the core
        let mut pixels = vec![PixelColor::BLUE; 16];
        for y in 1..3u32 {
            for x in 1..3u32 {
                pixels[(y * 4 + x) as usize] = PixelColor::RED;
            }
        }
        let frame = rgba_frame(&pixels, 4, 4);
        let buffer = FrameBuffer::from_frame(&frame).unwrap();
        let region = Region::new(1, 1, 2, 2);
        let predicate = PixelPredicate::expecting(PixelColor::RED);

        let verdict = FrameValidator::new().validate(&buffer, &region, &predicate, 0);
        assert_eq!(verdict.total_pixels, 4);
        assert_eq!(verdict.matched_pixels, 4);
        assert!(verdict.pass);
    }

    #[test]
    fn test_threshold_rule_tolerates_minority() {
        let mut pixels = vec![PixelColor::RED; 100];
        for px in pixels.iter_mut().take(5) {
            *px = PixelColor::BLUE;
        }
        let frame = rgba_frame(&pixels, 10, 10);
        let buffer = FrameBuffer::from_frame(&frame).unwrap();
        let region = Region::new(0, 0, 10, 10);
        let predicate =
            PixelPredicate::new(PixelColor::RED, DEFAULT_TOLERANCE, FrameRule::MatchThreshold(0.9));

        let verdict = FrameValidator::new().validate(&buffer, &region, &predicate, 0);
        assert_eq!(verdict.matched_pixels, 95);
        assert!(verdict.pass);
    }

    proptest! {
        #[test]
        fn prop_matched_never_exceeds_area(
            width in 1u32..16,
            height in 1u32..16,
            seed in any::<u64>(),
        ) {
            let pixels: Vec<PixelColor> = (0..width * height)
                .map(|i| {
                    let v = seed.wrapping_mul(6364136223846793005).wrapping_add(i as u64);
                    PixelColor::new(v as u8, (v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8)
                })
                .collect();
            let frame = rgba_frame(&pixels, width, height);
            let buffer = FrameBuffer::from_frame(&frame).unwrap();
            let region = Region::new(0, 0, width, height);
            let predicate = PixelPredicate::expecting(PixelColor::RED);

            let verdict = FrameValidator::new().validate(&buffer, &region, &predicate, 0);
            prop_assert_eq!(verdict.total_pixels, region.area());
            prop_assert!(verdict.matched_pixels <= verdict.total_pixels);
        }
    }
}
