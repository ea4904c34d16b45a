//! Pixel layouts and colors.
//!
//! The validator only understands fixed 4-byte-per-pixel layouts; anything
//! else a capture source might emit is carried as an opaque tag so the
//! pipeline can reject it up front instead of misreading memory.

use serde::{Deserialize, Serialize};

/// Pixel memory layout of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 4 bytes per pixel, channel order R, G, B, A.
    Rgba8888,
    /// 4 bytes per pixel, channel order B, G, R, A.
    Bgra8888,
    /// A layout the validator does not understand, carrying the source's
    /// raw format tag for diagnostics.
    Unrecognized(u32),
}

impl PixelFormat {
    /// Returns true if the validator can decode this layout.
    pub fn is_supported(&self) -> bool {
        matches!(self, PixelFormat::Rgba8888 | PixelFormat::Bgra8888)
    }

    /// Bytes occupied by one pixel in the supported layouts.
    pub const fn bytes_per_pixel() -> usize {
        4
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::Rgba8888 => write!(f, "RGBA_8888"),
            PixelFormat::Bgra8888 => write!(f, "BGRA_8888"),
            PixelFormat::Unrecognized(tag) => write!(f, "unrecognized(0x{tag:08x})"),
        }
    }
}

/// One decoded pixel, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl PixelColor {
    /// Opaque red.
    pub const RED: PixelColor = PixelColor::opaque(255, 0, 0);
    /// Opaque green.
    pub const GREEN: PixelColor = PixelColor::opaque(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: PixelColor = PixelColor::opaque(0, 0, 255);
    /// Opaque yellow.
    pub const YELLOW: PixelColor = PixelColor::opaque(255, 255, 0);
    /// Opaque black.
    pub const BLACK: PixelColor = PixelColor::opaque(0, 0, 0);
    /// Opaque white.
    pub const WHITE: PixelColor = PixelColor::opaque(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: PixelColor = PixelColor::new(0, 0, 0, 0);

    /// Creates a color from explicit channel values.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Compares against another color, each channel independently within
    /// the given tolerance.
    pub fn matches(&self, other: &PixelColor, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
            && self.a.abs_diff(other.a) <= tolerance
    }
}
