//! rectify-test - Regression test framework for rectify
//!
//! This crate provides a small regression harness: every check increments
//! an index, failures are collected and reported together by
//! [`RegParams::cleanup`].
//!
//! Two modes are supported:
//!
//! - **Compare** (default): run the checks only
//! - **Display**: additionally write rasters passed to
//!   [`RegParams::write_raster`] to `tests/regout` for visual inspection
//!
//! # Usage
//!
//! ```ignore
//! use rectify_test::RegParams;
//!
//! let mut rp = RegParams::new("homography");
//! rp.compare_values(1.0, value, 1e-9);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use rectify_core::{Raster, RasterMut, color};

/// Initialize `env_logger` for a test binary.
///
/// Safe to call from every test; only the first call installs the logger.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // rectify-test is at crates/rectify-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

/// Build a raster whose pixels are `f(x, y)`.
pub fn make_raster(width: u32, height: u32, f: impl Fn(u32, u32) -> u32) -> TestResult<Raster> {
    let mut raster = RasterMut::new(width, height)?;
    for y in 0..height {
        let row = raster.row_data_mut(y);
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = f(x as u32, y);
        }
    }
    Ok(raster.into())
}

/// Distinct color for every pixel of images up to 256x256: red follows x,
/// green follows y, blue mixes both.
pub fn make_gradient(width: u32, height: u32) -> TestResult<Raster> {
    make_raster(width, height, |x, y| {
        color::compose_rgb((x % 256) as u8, (y % 256) as u8, ((x * 7 + y * 13) % 256) as u8)
    })
}

/// Horizontal ramp: red = `step * x`, green = `255 - step * x`, blue = 0.
///
/// Bilinear sampling of this image along x is exactly linear as long as
/// `step * (width - 1) <= 255`.
pub fn make_ramp(width: u32, height: u32, step: u32) -> TestResult<Raster> {
    make_raster(width, height, |x, _| {
        let v = (step * x).min(255) as u8;
        color::compose_rgb(v, 255 - v, 0)
    })
}

/// Black and white checkerboard with square cells of `cell` pixels.
pub fn make_checkerboard(width: u32, height: u32, cell: u32) -> TestResult<Raster> {
    let cell = cell.max(1);
    make_raster(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            color::WHITE
        } else {
            color::BLACK
        }
    })
}
