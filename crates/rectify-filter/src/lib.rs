//! rectify-filter - Perspective and radial rectification filters
//!
//! This crate provides the two user-facing filters and their state:
//!
//! - [`PerspectiveRectifier`]: keyframed four-corner (keystone) correction
//! - [`RadialDistortionCorrector`]: re-projection between lens models
//! - [`CornerKeyframes`]: frame-indexed corner storage with a fixed mode
//! - [`ChangeListeners`]: parameter change notification
//! - [`PerspectiveState`] / [`RadialState`]: JSON persistence
//!
//! For one-shot use without keeping a filter around, see
//! [`rectify_perspective`] and [`correct_radial_distortion`].

mod error;
pub mod keyframe;
pub mod listener;
pub mod perspective;
pub mod radial;
pub mod serial;

pub use error::{FilterError, FilterResult};
pub use keyframe::{CornerKeyframes, SparseCorners};
pub use listener::{ChangeListeners, FilterEvent, ListenerId};
pub use perspective::{CornerShape, PerspectiveRectifier, QuadSide};
pub use radial::{RadialDistortionCorrector, RadialParams, find_radius_limit};
pub use serial::{PerspectiveState, RadialState};

use rectify_core::Raster;

/// Rectify one frame with the given corner stores.
///
/// # Arguments
///
/// * `source` - Frame to rectify
/// * `frame` - Frame number used to resolve both stores
/// * `in_keys` - Corners outlining the region in the source
/// * `out_keys` - Where that region lands in the output
///
/// Empty stores are seeded with the default centered quad for the
/// source size, so two empty stores give an identity mapping.
///
/// # Errors
///
/// Returns an error only if the output raster cannot be built.
pub fn rectify_perspective(
    source: &Raster,
    frame: u32,
    in_keys: &CornerKeyframes,
    out_keys: &CornerKeyframes,
) -> FilterResult<Raster> {
    let mut rectifier = PerspectiveRectifier::with_keyframes(in_keys.clone(), out_keys.clone());
    rectifier.rectify(source, frame)
}

/// Re-project `source` from one lens model into another.
///
/// `params` pass through the same clamping as the corrector's setters, and
/// a fixed radius below the feasibility floor is raised to it.
///
/// # Errors
///
/// Returns an error only if the output raster cannot be built.
pub fn correct_radial_distortion(source: &Raster, params: &RadialParams) -> FilterResult<Raster> {
    let mut corrector = RadialDistortionCorrector::with_params(params);
    corrector.correct(source)
}
