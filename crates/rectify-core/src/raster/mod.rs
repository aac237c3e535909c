//! Raster - The packed-RGB image container
//!
//! The `Raster` structure is the image type consumed and produced by the
//! rectification filters. Every pixel is one packed `u32` (`0x00RRGGBB`,
//! see [`crate::color`]), stored row-major without padding.
//!
//! # Ownership model
//!
//! `Raster` uses `Arc` for efficient cloning (shared ownership).
//! To modify pixel data, convert to `RasterMut` via [`Raster::try_into_mut`]
//! or [`Raster::to_mut`], then convert back with `Into<Raster>`.

mod access;

use crate::error::{Error, Result};
use std::sync::Arc;

/// Image file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Unknown format
    #[default]
    Unknown,
    /// PNG format
    Png,
    /// Binary PPM (P6)
    Pnm,
}

impl ImageFormat {
    /// Get the file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Unknown => "dat",
            Self::Png => "png",
            Self::Pnm => "ppm",
        }
    }
}

/// Internal raster data
#[derive(Debug, PartialEq, Eq)]
struct RasterData {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Packed RGB pixels, `width * height` values
    data: Vec<u32>,
}

/// Raster - Main image container
///
/// `Raster` uses reference counting via `Arc` for efficient cloning.
///
/// # Examples
///
/// ```
/// use rectify_core::Raster;
///
/// let raster = Raster::new(640, 480).unwrap();
/// assert_eq!(raster.width(), 640);
/// assert_eq!(raster.height(), 480);
/// assert_eq!(raster.get_pixel(0, 0), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    inner: Arc<RasterData>,
}

impl Raster {
    /// Create a new black raster with the specified dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let data = vec![0u32; Self::pixel_count(width, height)];
        Ok(Raster {
            inner: Arc::new(RasterData {
                width,
                height,
                data,
            }),
        })
    }

    /// Wrap an existing packed-RGB buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0, and
    /// [`Error::BufferSizeMismatch`] if `data.len() != width * height`.
    pub fn from_data(width: u32, height: u32, data: Vec<u32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let expected = Self::pixel_count(width, height);
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Raster {
            inner: Arc::new(RasterData {
                width,
                height,
                data,
            }),
        })
    }

    #[inline]
    fn pixel_count(width: u32, height: u32) -> usize {
        width as usize * height as usize
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.inner.width, self.inner.height)
    }

    /// Half the length of the image diagonal, in pixels.
    ///
    /// Radial distances are normalized by this value.
    pub fn half_diagonal(&self) -> f64 {
        let w = self.inner.width as f64;
        let h = self.inner.height as f64;
        (w * w + h * h).sqrt() / 2.0
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get the number of strong references to this raster.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Get the pixels of a specific row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        let start = y as usize * self.inner.width as usize;
        let end = start + self.inner.width as usize;
        &self.inner.data[start..end]
    }

    /// Create a new black raster with the same dimensions.
    pub fn create_template(&self) -> Self {
        Raster {
            inner: Arc::new(RasterData {
                width: self.inner.width,
                height: self.inner.height,
                data: vec![0u32; self.inner.data.len()],
            }),
        }
    }

    /// Check if two rasters have the same width and height.
    pub fn sizes_equal(&self, other: &Raster) -> bool {
        self.inner.width == other.inner.width && self.inner.height == other.inner.height
    }

    /// Create a deep copy of this raster.
    ///
    /// Unlike `clone()` which shares data via Arc, this creates
    /// a completely independent copy.
    pub fn deep_clone(&self) -> Self {
        Raster {
            inner: Arc::new(RasterData {
                width: self.inner.width,
                height: self.inner.height,
                data: self.inner.data.clone(),
            }),
        }
    }

    /// Try to get mutable access to the image data.
    ///
    /// Succeeds only if there is exactly one reference to the data.
    /// If successful, returns a [`RasterMut`] that allows modification.
    pub fn try_into_mut(self) -> std::result::Result<RasterMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(RasterMut { inner: data }),
            Err(arc) => Err(Raster { inner: arc }),
        }
    }

    /// Create a mutable copy of this raster.
    ///
    /// Always creates a new copy that can be modified.
    pub fn to_mut(&self) -> RasterMut {
        RasterMut {
            inner: RasterData {
                width: self.inner.width,
                height: self.inner.height,
                data: self.inner.data.clone(),
            },
        }
    }
}

/// Mutable raster
///
/// Allows modification of image data. Convert back to an immutable
/// [`Raster`] using `Into<Raster>`.
#[derive(Debug)]
pub struct RasterMut {
    inner: RasterData,
}

impl RasterMut {
    /// Create a new black mutable raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(RasterMut {
            inner: RasterData {
                width,
                height,
                data: vec![0u32; Raster::pixel_count(width, height)],
            },
        })
    }

    /// Get the image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get mutable raw access to the image data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.inner.data
    }

    /// Get the pixels of a specific row for writing.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data_mut(&mut self, y: u32) -> &mut [u32] {
        let start = y as usize * self.inner.width as usize;
        let end = start + self.inner.width as usize;
        &mut self.inner.data[start..end]
    }

    /// Set every pixel to `value`.
    pub fn fill(&mut self, value: u32) {
        self.inner.data.fill(value);
    }
}

impl From<RasterMut> for Raster {
    fn from(raster: RasterMut) -> Self {
        Raster {
            inner: Arc::new(raster.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let raster = Raster::new(100, 200).unwrap();
        assert_eq!(raster.width(), 100);
        assert_eq!(raster.height(), 200);
        assert_eq!(raster.data().len(), 20_000);
        assert!(raster.data().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(Raster::new(0, 100).is_err());
        assert!(Raster::new(100, 0).is_err());
        assert!(RasterMut::new(0, 0).is_err());
    }

    #[test]
    fn test_from_data_size_mismatch() {
        let err = Raster::from_data(3, 2, vec![0; 5]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferSizeMismatch {
                expected: 6,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_clone_shares_data() {
        let raster1 = Raster::new(10, 10).unwrap();
        let raster2 = raster1.clone();
        assert_eq!(raster1.ref_count(), 2);
        assert_eq!(raster2.ref_count(), 2);
    }

    #[test]
    fn test_deep_clone() {
        let raster1 = Raster::new(10, 10).unwrap();
        let raster2 = raster1.deep_clone();
        assert_eq!(raster1.ref_count(), 1);
        assert_eq!(raster2.ref_count(), 1);
        assert_eq!(raster1, raster2);
    }

    #[test]
    fn test_try_into_mut_shared_fails() {
        let raster = Raster::new(4, 4).unwrap();
        let shared = raster.clone();
        let back = raster.try_into_mut().unwrap_err();
        assert_eq!(back.ref_count(), 2);
        drop(shared);
        assert!(back.try_into_mut().is_ok());
    }

    #[test]
    fn test_half_diagonal() {
        let raster = Raster::new(300, 400).unwrap();
        assert!((raster.half_diagonal() - 250.0).abs() < 1e-12);
    }

    #[test]
    fn test_row_data() {
        let data: Vec<u32> = (0..12).collect();
        let raster = Raster::from_data(4, 3, data).unwrap();
        assert_eq!(raster.row_data(1), &[4, 5, 6, 7]);
    }
}
