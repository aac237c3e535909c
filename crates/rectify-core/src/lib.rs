//! rectify-core - Basic data structures for image rectification
//!
//! This crate provides the fundamental data structures shared by the
//! rectification crates:
//!
//! - [`Raster`] / [`RasterMut`] - Packed-RGB image container (immutable / mutable)
//! - [`Point`] - Planar coordinate in source or destination pixel space
//! - [`Quad`] - Ordered quadrilateral, the image of the unit square corners
//! - [`ImageFormat`] - File formats understood by `rectify-io`

pub mod error;
pub mod quad;
pub mod raster;

pub use error::{Error, Result};
pub use quad::{Point, Quad};
pub use raster::{ImageFormat, Raster, RasterMut};

/// Channel helpers for packed 32-bit RGB pixels.
///
/// # Pixel format
///
/// Pixels are stored as `0x00RRGGBB`: blue in the low byte, the top byte is
/// unused and always written as zero. The value `0` is opaque black, which
/// is also the color returned for samples outside a raster.
pub mod color {
    /// Shift amounts for extracting color channels
    pub const RED_SHIFT: u32 = 16;
    pub const GREEN_SHIFT: u32 = 8;
    pub const BLUE_SHIFT: u32 = 0;

    /// Opaque black.
    pub const BLACK: u32 = 0x000000;

    /// Opaque white.
    pub const WHITE: u32 = 0xffffff;

    /// Extract red component from a packed pixel.
    #[inline]
    pub fn red(pixel: u32) -> u8 {
        ((pixel >> RED_SHIFT) & 0xff) as u8
    }

    /// Extract green component from a packed pixel.
    #[inline]
    pub fn green(pixel: u32) -> u8 {
        ((pixel >> GREEN_SHIFT) & 0xff) as u8
    }

    /// Extract blue component from a packed pixel.
    #[inline]
    pub fn blue(pixel: u32) -> u8 {
        ((pixel >> BLUE_SHIFT) & 0xff) as u8
    }

    /// Compose a packed RGB pixel.
    #[inline]
    pub fn compose_rgb(r: u8, g: u8, b: u8) -> u32 {
        ((r as u32) << RED_SHIFT) | ((g as u32) << GREEN_SHIFT) | ((b as u32) << BLUE_SHIFT)
    }

    /// Extract RGB values from a packed pixel.
    #[inline]
    pub fn extract_rgb(pixel: u32) -> (u8, u8, u8) {
        (red(pixel), green(pixel), blue(pixel))
    }

    /// Extract RGB values as an array, red first.
    #[inline]
    pub fn channels(pixel: u32) -> [u8; 3] {
        [red(pixel), green(pixel), blue(pixel)]
    }

}
