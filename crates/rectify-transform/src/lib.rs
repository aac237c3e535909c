//! rectify-transform - Geometric building blocks for rectify
//!
//! This crate provides the numeric core shared by the rectification
//! filters:
//!
//! - Sub-pixel resampling (nearest, per-channel bilinear)
//! - Projective matrices between the unit square and quadrilaterals
//! - Lens projection models (rectilinear and four fisheye families)

mod error;
pub mod homography;
pub mod projection;
pub mod resample;

pub use error::{TransformError, TransformResult};
pub use homography::Matrix3;
pub use projection::ProjectionType;
pub use resample::{Interpolation, remap, sample, sample_pixels};
