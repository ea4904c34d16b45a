//! Per-pixel and per-frame acceptance rules.
//!
//! A predicate pairs a target color and tolerance with a frame-level rule.
//! Different test scenarios assert either "region must be uniformly one
//! color" or "region must contain none of a forbidden color", so the frame
//! rule is a tagged variant rather than a trait hierarchy.

use crate::capture::PixelColor;
use serde::{Deserialize, Serialize};

/// Default per-channel color tolerance.
pub const DEFAULT_TOLERANCE: u8 = 4;

/// Frame-level acceptance rule over the aggregate match count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FrameRule {
    /// Every sampled pixel in the region must match.
    MatchAll,
    /// No sampled pixel may match (negative assertion against a forbidden
    /// color).
    MatchNone,
    /// At least this fraction of sampled pixels must match, in `0.0..=1.0`.
    MatchThreshold(f64),
}

impl FrameRule {
    /// Decides frame acceptance from the aggregate counts.
    pub fn accepts(&self, matched: u64, total: u64) -> bool {
        match self {
            FrameRule::MatchAll => matched == total,
            FrameRule::MatchNone => matched == 0,
            FrameRule::MatchThreshold(fraction) => {
                matched as f64 >= fraction.clamp(0.0, 1.0) * total as f64
            }
        }
    }
}

/// Pixel predicate: target color, tolerance, and frame rule.
///
/// Pure; the pipeline applies it only from its validation worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPredicate {
    target: PixelColor,
    tolerance: u8,
    rule: FrameRule,
}

impl PixelPredicate {
    /// Creates a predicate with explicit tolerance and rule.
    pub fn new(target: PixelColor, tolerance: u8, rule: FrameRule) -> Self {
        Self {
            target,
            tolerance,
            rule,
        }
    }

    /// "Region must be uniformly this color" with the default tolerance.
    pub fn expecting(target: PixelColor) -> Self {
        Self::new(target, DEFAULT_TOLERANCE, FrameRule::MatchAll)
    }

    /// "Region must contain none of this color" with the default tolerance.
    pub fn forbidding(target: PixelColor) -> Self {
        Self::new(target, DEFAULT_TOLERANCE, FrameRule::MatchNone)
    }

    /// Returns the target color.
    pub fn target(&self) -> PixelColor {
        self.target
    }

    /// Returns the per-channel tolerance.
    pub fn tolerance(&self) -> u8 {
        self.tolerance
    }

    /// Returns the frame-level rule.
    pub fn rule(&self) -> FrameRule {
        self.rule
    }

    /// Tests one pixel against the target color.
    #[inline]
    pub fn matches_pixel(&self, pixel: PixelColor) -> bool {
        pixel.matches(&self.target, self.tolerance)
    }

    /// Frame-level decision over the aggregate match count.
    pub fn is_frame_acceptable(&self, matched: u64, total: u64) -> bool {
        self.rule.accepts(matched, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_match_all_requires_every_pixel() {
        assert!(FrameRule::MatchAll.accepts(100, 100));
        assert!(!FrameRule::MatchAll.accepts(99, 100));
    }

    #[test]
    fn test_match_none_requires_zero() {
        assert!(FrameRule::MatchNone.accepts(0, 100));
        assert!(!FrameRule::MatchNone.accepts(1, 100));
    }

    #[test]
    fn test_threshold_fraction() {
        let rule = FrameRule::MatchThreshold(0.9);
        assert!(rule.accepts(90, 100));
        assert!(rule.accepts(95, 100));
        assert!(!rule.accepts(89, 100));
    }

    #[test]
    fn test_threshold_clamped_to_unit_range() {
        assert!(FrameRule::MatchThreshold(-1.0).accepts(0, 100));
        assert!(FrameRule::MatchThreshold(2.0).accepts(100, 100));
        assert!(!FrameRule::MatchThreshold(2.0).accepts(99, 100));
    }

    #[test]
    fn test_expecting_uses_default_tolerance() {
        let predicate = PixelPredicate::expecting(PixelColor::RED);
        assert!(predicate.matches_pixel(PixelColor::opaque(251, 4, 4)));
        assert!(!predicate.matches_pixel(PixelColor::opaque(250, 0, 0)));
    }

    #[test]
    fn test_forbidding_accepts_zero_matches() {
        let predicate = PixelPredicate::forbidding(PixelColor::RED);
        assert!(predicate.is_frame_acceptable(0, 100));
        assert!(!predicate.is_frame_acceptable(1, 100));
    }

    proptest! {
        #[test]
        fn prop_color_match_is_symmetric(
            r1: u8, g1: u8, b1: u8, a1: u8,
            r2: u8, g2: u8, b2: u8, a2: u8,
            tolerance: u8,
        ) {
            let a = PixelColor::new(r1, g1, b1, a1);
            let b = PixelColor::new(r2, g2, b2, a2);
            prop_assert_eq!(a.matches(&b, tolerance), b.matches(&a, tolerance));
        }

        #[test]
        fn prop_color_matches_itself(r: u8, g: u8, b: u8, a: u8, tolerance: u8) {
            let color = PixelColor::new(r, g, b, a);
            prop_assert!(color.matches(&color, tolerance));
        }
    }
}
