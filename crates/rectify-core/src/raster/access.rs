//! Pixel access functions
//!
//! Low-level functions for getting and setting individual pixels.

use super::{Raster, RasterMut};
use crate::color;
use crate::error::{Error, Result};

impl Raster {
    /// Get a pixel value at (x, y).
    ///
    /// Returns `None` if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if the computed index is outside the buffer.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        self.data()[y as usize * self.width() as usize + x as usize]
    }

    /// Get RGB values at (x, y).
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        self.get_pixel(x, y).map(color::extract_rgb)
    }
}

impl RasterMut {
    /// Get a pixel value at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        self.data()[y as usize * self.width() as usize + x as usize]
    }

    /// Set a pixel value at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: u32) -> Result<()> {
        if x >= self.width() {
            return Err(Error::IndexOutOfBounds {
                index: x as usize,
                len: self.width() as usize,
            });
        }
        if y >= self.height() {
            return Err(Error::IndexOutOfBounds {
                index: y as usize,
                len: self.height() as usize,
            });
        }
        self.set_pixel_unchecked(x, y, val);
        Ok(())
    }

    /// Set a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if the computed index is outside the buffer.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, val: u32) {
        let w = self.width() as usize;
        self.data_mut()[y as usize * w + x as usize] = val;
    }

    /// Set an RGB pixel at (x, y).
    pub fn set_rgb(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) -> Result<()> {
        self.set_pixel(x, y, color::compose_rgb(r, g, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_pixel() {
        let mut raster = RasterMut::new(5, 4).unwrap();
        raster.set_pixel(4, 3, 0xabcdef).unwrap();
        assert_eq!(raster.get_pixel(4, 3), Some(0xabcdef));
        assert_eq!(raster.data()[19], 0xabcdef);

        let raster: Raster = raster.into();
        assert_eq!(raster.get_pixel(4, 3), Some(0xabcdef));
        assert_eq!(raster.get_pixel(5, 3), None);
        assert_eq!(raster.get_pixel(4, 4), None);
    }

    #[test]
    fn test_set_pixel_out_of_bounds() {
        let mut raster = RasterMut::new(5, 4).unwrap();
        assert!(raster.set_pixel(5, 0, 1).is_err());
        assert!(raster.set_pixel(0, 4, 1).is_err());
    }

    #[test]
    fn test_rgb_access() {
        let mut raster = RasterMut::new(2, 2).unwrap();
        raster.set_rgb(1, 0, 10, 20, 30).unwrap();
        let raster: Raster = raster.into();
        assert_eq!(raster.get_rgb(1, 0), Some((10, 20, 30)));
        assert_eq!(raster.get_rgb(0, 0), Some((0, 0, 0)));
    }
}
