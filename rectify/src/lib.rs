//! rectify - Image rectification for Rust
//!
//! Straightens images taken at an angle or through a wide-angle lens.
//!
//! # Overview
//!
//! - Raster I/O (PNG, binary PPM)
//! - Projective matrices between quadrilaterals and sub-pixel resampling
//! - Keyframed four-corner perspective (keystone) correction
//! - Re-projection between rectilinear and fisheye lens models
//! - JSON persistence of filter parameters
//!
//! # Example
//!
//! ```
//! use rectify::filter::{CornerKeyframes, rectify_perspective};
//! use rectify::{Quad, Raster, RasterMut};
//!
//! let mut raster = RasterMut::new(200, 100).unwrap();
//! raster.fill(0x336699);
//! let source: Raster = raster.into();
//!
//! // Stretch the middle of the frame onto the whole frame
//! let input = CornerKeyframes::with_fixed_quad(Quad::centered_for_size(200, 100));
//! let output = CornerKeyframes::with_fixed_quad(Quad::rectangle(0.0, 0.0, 199.0, 99.0));
//! let out = rectify_perspective(&source, 0, &input, &output).unwrap();
//! assert_eq!(out.get_pixel(0, 0), Some(0x336699));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use rectify_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use rectify_filter as filter;
pub use rectify_io as io;
pub use rectify_transform as transform;
