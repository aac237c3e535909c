//! Lens projection models
//!
//! Each model relates a normalized image radius `r` (fraction of the
//! half-diagonal, `0..=1`) to the half-angle `θ` off the optical axis, for
//! a lens whose diagonal field of view is `F`:
//!
//! | type | θ(r, F) | dθ/dr |
//! |---|---|---|
//! | Rectilinear | `atan(r·tan(F/2))` | `tan(F/2) / (1 + r²tan²(F/2))` |
//! | Equidistant | `r·F/2` | `F/2` |
//! | Equisolid | `2·asin(r·sin(F/4))` | `2sin(F/4) / √(1 − r²sin²(F/4))` |
//! | Stereographic | `2·atan(r·tan(F/4))` | `2tan(F/4) / (1 + r²tan²(F/4))` |
//! | Orthographic | `asin(r·sin(F/2))` | `sin(F/2) / √(1 − r²sin²(F/2))` |
//!
//! All functions are total: arguments outside a model's domain yield NaN
//! rather than an error, and callers decide what NaN means.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Lens projection family
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum ProjectionType {
    /// Pinhole: `r ∝ tan θ`
    #[default]
    Rectilinear,
    /// `r ∝ θ`
    Equidistant,
    /// Equal-area fisheye: `r ∝ 2 sin(θ/2)`
    Equisolid,
    /// Conformal fisheye: `r ∝ 2 tan(θ/2)`
    Stereographic,
    /// `r ∝ sin θ`
    Orthographic,
}

impl ProjectionType {
    /// Half-angle `θ` at normalized radius `r` for diagonal FOV `fov`.
    pub fn angle_at_radius(self, r: f64, fov: f64) -> f64 {
        match self {
            Self::Rectilinear => (r * (fov / 2.0).tan()).atan(),
            Self::Equidistant => r * fov / 2.0,
            Self::Equisolid => 2.0 * (r * (fov / 4.0).sin()).asin(),
            Self::Stereographic => 2.0 * (r * (fov / 4.0).tan()).atan(),
            Self::Orthographic => (r * (fov / 2.0).sin()).asin(),
        }
    }

    /// `dθ/dr` of [`ProjectionType::angle_at_radius`].
    pub fn derivative_at_radius(self, r: f64, fov: f64) -> f64 {
        match self {
            Self::Rectilinear => {
                let t = (fov / 2.0).tan();
                t / (1.0 + r * r * t * t)
            }
            Self::Equidistant => fov / 2.0,
            Self::Equisolid => {
                let s = (fov / 4.0).sin();
                2.0 * s / (1.0 - r * r * s * s).sqrt()
            }
            Self::Stereographic => {
                let t = (fov / 4.0).tan();
                2.0 * t / (1.0 + r * r * t * t)
            }
            Self::Orthographic => {
                let s = (fov / 2.0).sin();
                s / (1.0 - r * r * s * s).sqrt()
            }
        }
    }

    /// Normalized radius at which half-angle `theta` lands for diagonal FOV
    /// `fov`; the inverse of [`ProjectionType::angle_at_radius`].
    pub fn radius_at_angle(self, theta: f64, fov: f64) -> f64 {
        match self {
            Self::Rectilinear => theta.tan() / (fov / 2.0).tan(),
            Self::Equidistant => 2.0 * theta / fov,
            Self::Equisolid => (theta / 2.0).sin() / (fov / 4.0).sin(),
            Self::Stereographic => (theta / 2.0).tan() / (fov / 4.0).tan(),
            Self::Orthographic => theta.sin() / (fov / 2.0).sin(),
        }
    }

    /// Diagonal FOV that places half-angle `theta` at normalized radius
    /// `r`.
    ///
    /// NaN when no such FOV exists (for example an orthographic lens asked
    /// to put more than its asymptotic angle inside the frame).
    pub fn fov_at_angle(self, theta: f64, r: f64) -> f64 {
        match self {
            Self::Rectilinear => 2.0 * (theta.tan() / r).atan(),
            Self::Equidistant => 2.0 * theta / r,
            Self::Equisolid => 4.0 * ((theta / 2.0).sin() / r).asin(),
            Self::Stereographic => 4.0 * ((theta / 2.0).tan() / r).atan(),
            Self::Orthographic => 2.0 * (theta.sin() / r).asin(),
        }
    }
}
