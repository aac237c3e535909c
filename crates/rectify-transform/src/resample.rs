//! Sub-pixel resampling of packed-RGB rasters
//!
//! Both rectification filters compute a fractional source coordinate for
//! every destination pixel and read the color there through this module.
//!
//! Boundary rules:
//!
//! - A coordinate outside `[0, width) x [0, height)` (or non-finite) reads
//!   as black.
//! - On the last column or row there is no right/bottom neighbour, so the
//!   base pixel is returned without interpolation.
//!
//! Bilinear interpolation works on each channel separately; interpolating
//! the packed integer would carry between channels.

use crate::{TransformError, TransformResult};
use rectify_core::{Raster, RasterMut, color};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Interpolation quality used when sampling between pixel centers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum Interpolation {
    /// Pick the neighbour each axis rounds toward
    Nearest,
    /// Per-channel bilinear blend of the four neighbours
    #[default]
    Bilinear,
}

/// Sample `raster` at the fractional position `(x, y)`.
///
/// # Examples
///
/// ```
/// use rectify_core::Raster;
/// use rectify_transform::{Interpolation, sample};
///
/// let raster = Raster::from_data(2, 2, vec![0x000000, 0x0000c8, 0x000000, 0x0000c8]).unwrap();
/// assert_eq!(sample(&raster, 0.5, 0.0, Interpolation::Bilinear), 0x000064);
/// assert_eq!(sample(&raster, -0.5, 0.0, Interpolation::Bilinear), 0);
/// ```
#[inline]
pub fn sample(raster: &Raster, x: f64, y: f64, interpolation: Interpolation) -> u32 {
    sample_pixels(x, y, raster.width(), raster.height(), raster.data(), interpolation)
}

/// Sample a bare row-major packed-RGB buffer at `(x, y)`.
///
/// Pixels missing from a short buffer read as black.
pub fn sample_pixels(
    x: f64,
    y: f64,
    width: u32,
    height: u32,
    pixels: &[u32],
    interpolation: Interpolation,
) -> u32 {
    // NaN compares false and lands here too
    if !(x >= 0.0 && x < width as f64 && y >= 0.0 && y < height as f64) {
        return color::BLACK;
    }

    let col = x.floor() as u32;
    let row = y.floor() as u32;
    let w = width as usize;
    let idx = row as usize * w + col as usize;
    let fetch = |i: usize| pixels.get(i).copied().unwrap_or(color::BLACK);

    if col + 1 >= width || row + 1 >= height {
        return fetch(idx);
    }

    let u = x - col as f64;
    let v = y - row as f64;
    let p00 = fetch(idx);
    let p10 = fetch(idx + 1);
    let p01 = fetch(idx + w);
    let p11 = fetch(idx + w + 1);

    match interpolation {
        Interpolation::Nearest => match (u < 0.5, v < 0.5) {
            (true, true) => p00,
            (true, false) => p01,
            (false, true) => p10,
            (false, false) => p11,
        },
        Interpolation::Bilinear => {
            let c00 = color::channels(p00);
            let c10 = color::channels(p10);
            let c01 = color::channels(p01);
            let c11 = color::channels(p11);
            let mut out = [0u8; 3];
            for (i, channel) in out.iter_mut().enumerate() {
                let top = (1.0 - u) * c00[i] as f64 + u * c10[i] as f64;
                let bottom = (1.0 - u) * c01[i] as f64 + u * c11[i] as f64;
                let value = (1.0 - v) * top + v * bottom;
                // truncated, not rounded
                *channel = value.clamp(0.0, 255.0) as u8;
            }
            color::compose_rgb(out[0], out[1], out[2])
        }
    }
}

/// Build a raster of `width x height` where destination pixel `(i, j)` is
/// read from `source` at `(xs[k], ys[k])`, `k = j * width + i`.
///
/// # Errors
///
/// Returns [`TransformError::InvalidParameters`] if the coordinate slices
/// do not hold exactly `width * height` entries, and a core error for zero
/// dimensions.
pub fn remap(
    source: &Raster,
    width: u32,
    height: u32,
    xs: &[f64],
    ys: &[f64],
    interpolation: Interpolation,
) -> TransformResult<Raster> {
    let count = width as usize * height as usize;
    if xs.len() != count || ys.len() != count {
        return Err(TransformError::InvalidParameters(format!(
            "remap needs {} coordinates, got {} x and {} y",
            count,
            xs.len(),
            ys.len()
        )));
    }

    let mut out = RasterMut::new(width, height)?;
    for ((pixel, &x), &y) in out.data_mut().iter_mut().zip(xs).zip(ys) {
        *pixel = sample(source, x, y, interpolation);
    }
    Ok(out.into())
}
