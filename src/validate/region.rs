//! Region of interest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a region cannot be fitted to a frame.
#[derive(Debug, Clone, Error)]
pub enum RegionError {
    #[error("region has zero width or height")]
    Empty,
    #[error("region at ({left}, {top}) lies entirely outside a {frame_width}x{frame_height} frame")]
    OutsideFrame {
        left: u32,
        top: u32,
        frame_width: u32,
        frame_height: u32,
    },
}

/// A rectangle in frame coordinates.
///
/// Regions handed to the pipeline are clamped against the source's frame
/// bounds once, at construction; the worker then iterates them without
/// further bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

impl Region {
    /// Creates a region from its top-left corner and size.
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Left edge, inclusive.
    #[inline]
    pub fn left(&self) -> u32 {
        self.left
    }

    /// Top edge, inclusive.
    #[inline]
    pub fn top(&self) -> u32 {
        self.top
    }

    /// Right edge, exclusive. Saturates rather than overflowing on
    /// degenerate inputs; clamping rejects those before validation.
    #[inline]
    pub fn right(&self) -> u32 {
        self.left.saturating_add(self.width)
    }

    /// Bottom edge, exclusive.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }

    /// Region width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Region height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels covered.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns true if `(x, y)` falls inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    /// Clamps the region to the given frame bounds.
    ///
    /// Fails if the region is empty or does not intersect the frame at all.
    pub fn clamped_to(&self, frame_width: u32, frame_height: u32) -> Result<Region, RegionError> {
        if self.width == 0 || self.height == 0 {
            return Err(RegionError::Empty);
        }
        let right = self.right().min(frame_width);
        let bottom = self.bottom().min(frame_height);
        if self.left >= right || self.top >= bottom {
            return Err(RegionError::OutsideFrame {
                left: self.left,
                top: self.top,
                frame_width,
                frame_height,
            });
        }
        Ok(Region::new(
            self.left,
            self.top,
            right - self.left,
            bottom - self.top,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contained_region_unchanged() {
        let region = Region::new(2, 2, 4, 4);
        assert_eq!(region.clamped_to(10, 10).unwrap(), region);
    }

    #[test]
    fn test_overhanging_region_clamped() {
        let region = Region::new(6, 6, 10, 10);
        let clamped = region.clamped_to(8, 8).unwrap();
        assert_eq!(clamped, Region::new(6, 6, 2, 2));
        assert_eq!(clamped.area(), 4);
    }

    #[test]
    fn test_empty_region_rejected() {
        assert!(matches!(
            Region::new(0, 0, 0, 5).clamped_to(10, 10),
            Err(RegionError::Empty)
        ));
    }

    #[test]
    fn test_fully_outside_region_rejected() {
        assert!(matches!(
            Region::new(20, 20, 4, 4).clamped_to(10, 10),
            Err(RegionError::OutsideFrame { .. })
        ));
    }

    #[test]
    fn test_contains_edges() {
        let region = Region::new(1, 1, 2, 2);
        assert!(region.contains(1, 1));
        assert!(region.contains(2, 2));
        assert!(!region.contains(3, 3));
        assert!(!region.contains(0, 1));
    }
}
