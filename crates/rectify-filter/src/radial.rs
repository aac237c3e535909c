//! Radial lens-distortion correction
//!
//! The corrector re-projects an image taken through one lens model
//! (`source_projection` with diagonal field of view `source_fov`) as if it
//! had been taken through another (`output_projection`). The two images
//! agree at the anchor radius `fixed_radius`; the output field of view
//! follows from that constraint.
//!
//! Some projection pairs would need an output field of view past 180° for
//! small anchor radii. [`find_radius_limit`] finds the smallest anchor
//! radius that avoids this, and the corrector raises `fixed_radius` to it
//! when needed.
//!
//! Derived state (output FOV, radius floor and the per-pixel source
//! coordinates) is cached and rebuilt lazily after any parameter or image
//! size change.

use crate::FilterResult;
use crate::listener::{ChangeListeners, FilterEvent, ListenerId};
use log::{debug, warn};
use rectify_core::Raster;
use rectify_transform::{Interpolation, ProjectionType, remap};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::str::FromStr;

/// Smallest allowed anchor radius (fraction of the half-diagonal)
pub const MIN_RADIUS: f64 = 0.20;
/// Largest allowed anchor radius
pub const MAX_RADIUS: f64 = 1.0;
/// Default anchor radius
pub const DEFAULT_RADIUS: f64 = 0.75;
/// Smallest allowed diagonal field of view (10°)
pub const MIN_FOV: f64 = PI / 18.0;
/// Largest output field of view
pub const MAX_FOV: f64 = PI - 0.001;
/// Largest accepted source field of view
pub const MAX_SOURCE_FOV: f64 = PI - 0.0005;
/// Default source field of view (90°)
pub const DEFAULT_FOV: f64 = FRAC_PI_2;

const NEWTON_GUESS: f64 = 0.8;
const NEWTON_TOLERANCE: f64 = 1e-6;
const NEWTON_MAX_ITERATIONS: usize = 10;
const MAX_STEP_HALVINGS: usize = 32;
const GRID_STEPS: u32 = 100;
const BISECTION_ITERATIONS: usize = 50;

/// A Newton root outside this open range is discarded
const LIMIT_RANGE: (f64, f64) = (0.005, 1.01);

/// Keeps the image center off a cell boundary
const CENTER_BIAS: f64 = 1e-4;

/// Parameters of a radial correction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialParams {
    /// Radius, as a fraction of the half-diagonal, where source and output
    /// agree
    pub fixed_radius: f64,
    /// Diagonal field of view of the source lens, radians
    pub source_fov: f64,
    /// Lens model of the source image
    pub source_projection: ProjectionType,
    /// Lens model to re-project into
    pub output_projection: ProjectionType,
}

impl Default for RadialParams {
    fn default() -> Self {
        Self {
            fixed_radius: DEFAULT_RADIUS,
            source_fov: DEFAULT_FOV,
            source_projection: ProjectionType::Rectilinear,
            output_projection: ProjectionType::Rectilinear,
        }
    }
}

/// Find the smallest anchor radius that keeps the output field of view
/// within 180°.
///
/// Solves `θ_src(r, source_fov) = θ_out(r, π)` with Newton's method from
/// `r = 0.8`. Steps that would leave `(0, 1]` are halved until they stay
/// inside. When Newton does not converge within 10 iterations, or lands on
/// a root outside `(0.005, 1.01)`, the crossing is bracketed on a grid of
/// hundredths and bisected instead. Returns `None` when the pair never
/// needs a floor. A found root is rounded up to the next hundredth and
/// clamped to `[MIN_RADIUS, MAX_RADIUS]`.
pub fn find_radius_limit(
    source: ProjectionType,
    source_fov: f64,
    output: ProjectionType,
) -> Option<f64> {
    // Only pairs whose output model compresses angles more than the source
    // can run out of field of view.
    if output.angle_at_radius(0.5, FRAC_PI_2) >= source.angle_at_radius(0.5, FRAC_PI_2) {
        return None;
    }

    let f = |r: f64| source.angle_at_radius(r, source_fov) - output.angle_at_radius(r, PI);
    let dfdr =
        |r: f64| source.derivative_at_radius(r, source_fov) - output.derivative_at_radius(r, PI);

    let root = newton_root(&f, &dfdr).or_else(|| {
        debug!(
            "radius limit search for {} -> {} at fov {:.4} fell back to bisection",
            source, output, source_fov
        );
        bisect_root(&f)
    })?;
    Some(((root * 100.0).ceil() / 100.0).clamp(MIN_RADIUS, MAX_RADIUS))
}

/// Damped Newton iteration from `NEWTON_GUESS`; `None` unless it converges
/// inside `LIMIT_RANGE`.
fn newton_root(f: impl Fn(f64) -> f64, dfdr: impl Fn(f64) -> f64) -> Option<f64> {
    let mut r = NEWTON_GUESS;
    let mut value = f(r);
    let mut iterations = 0;
    while value.is_nan() || value.abs() > NEWTON_TOLERANCE {
        if iterations == NEWTON_MAX_ITERATIONS || !value.is_finite() {
            debug!("newton did not converge (r = {}, f = {})", r, value);
            return None;
        }
        let mut step = value / dfdr(r);
        if !step.is_finite() {
            return None;
        }
        for _ in 0..MAX_STEP_HALVINGS {
            let next = r - step;
            if next > 0.0 && next <= 1.0 {
                break;
            }
            step /= 2.0;
        }
        r -= step;
        value = f(r);
        iterations += 1;
    }

    if r > LIMIT_RANGE.0 && r < LIMIT_RANGE.1 {
        Some(r)
    } else {
        debug!("newton root {} out of range, ignored", r);
        None
    }
}

/// Outermost sign change of `f` from positive to non-positive on `(0, 1]`.
///
/// Scans hundredths downward from 1 and bisects the first cell whose lower
/// end is positive. Returns the non-positive end of the final bracket, or
/// `None` if `f` is non-positive on every grid point or positive at 1.
fn bisect_root(f: impl Fn(f64) -> f64) -> Option<f64> {
    let at_edge = f(1.0);
    if at_edge.is_nan() || at_edge > 0.0 {
        debug!("no anchor radius up to 1 keeps the output field of view within 180°");
        return None;
    }
    let lower = (1..GRID_STEPS)
        .rev()
        .map(|k| k as f64 / GRID_STEPS as f64)
        .find(|&r| f(r) > 0.0)?;

    let mut lo = lower;
    let mut hi = lower + 1.0 / GRID_STEPS as f64;
    for _ in 0..BISECTION_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        if f(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(hi)
}

/// Coordinates for every destination pixel of one image size
#[derive(Debug)]
struct StretchField {
    width: u32,
    height: u32,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

/// Lens re-projection filter
#[derive(Debug)]
pub struct RadialDistortionCorrector {
    params: RadialParams,
    interpolation: Interpolation,
    output_fov: f64,
    lower_radius_limit: Option<f64>,
    scale_valid: bool,
    image_size: Option<(u32, u32)>,
    half_diagonal: f64,
    field: Option<StretchField>,
    generation: u64,
    listeners: ChangeListeners<FilterEvent>,
}

impl Default for RadialDistortionCorrector {
    fn default() -> Self {
        Self::new()
    }
}

impl RadialDistortionCorrector {
    /// Create a corrector with default parameters
    pub fn new() -> Self {
        Self {
            params: RadialParams::default(),
            interpolation: Interpolation::default(),
            output_fov: DEFAULT_FOV,
            lower_radius_limit: None,
            scale_valid: false,
            image_size: None,
            half_diagonal: 0.0,
            field: None,
            generation: 0,
            listeners: ChangeListeners::new(),
        }
    }

    /// Create a corrector and apply `params` through the setters
    pub fn with_params(params: &RadialParams) -> Self {
        let mut corrector = Self::new();
        corrector.set_params(params);
        corrector
    }

    /// Current parameters
    pub fn params(&self) -> &RadialParams {
        &self.params
    }

    fn invalidate(&mut self) {
        self.scale_valid = false;
        self.field = None;
    }

    fn params_changed(&mut self) {
        self.invalidate();
        self.listeners.notify(&FilterEvent::RadialParamsChanged);
    }

    /// Apply every field of `params` through its setter
    pub fn set_params(&mut self, params: &RadialParams) {
        self.set_source_fov(params.source_fov);
        self.set_source_projection(params.source_projection);
        self.set_output_projection(params.output_projection);
        self.set_fixed_radius(params.fixed_radius);
    }

    /// Set the anchor radius. Takes `|radius|` clamped to
    /// `[MIN_RADIUS, MAX_RADIUS]`; NaN is ignored.
    pub fn set_fixed_radius(&mut self, radius: f64) {
        if radius.is_nan() {
            warn!("ignoring NaN fixed radius");
            return;
        }
        let radius = radius.abs().clamp(MIN_RADIUS, MAX_RADIUS);
        if radius != self.params.fixed_radius {
            self.params.fixed_radius = radius;
            self.params_changed();
        }
    }

    /// Set the source field of view in radians. Takes `|fov|` clamped to
    /// `[MIN_FOV, MAX_SOURCE_FOV]`; NaN is ignored.
    pub fn set_source_fov(&mut self, fov: f64) {
        if fov.is_nan() {
            warn!("ignoring NaN source field of view");
            return;
        }
        let fov = fov.abs().clamp(MIN_FOV, MAX_SOURCE_FOV);
        if fov != self.params.source_fov {
            self.params.source_fov = fov;
            self.params_changed();
        }
    }

    /// Set the source lens model
    pub fn set_source_projection(&mut self, projection: ProjectionType) {
        if projection != self.params.source_projection {
            self.params.source_projection = projection;
            self.params_changed();
        }
    }

    /// Set the output lens model
    pub fn set_output_projection(&mut self, projection: ProjectionType) {
        if projection != self.params.output_projection {
            self.params.output_projection = projection;
            self.params_changed();
        }
    }

    /// Set the source lens model by name. Unknown names are ignored;
    /// returns `false` for them.
    pub fn set_source_projection_name(&mut self, name: &str) -> bool {
        match ProjectionType::from_str(name) {
            Ok(projection) => {
                self.set_source_projection(projection);
                true
            }
            Err(_) => {
                warn!("ignoring unknown source projection '{}'", name);
                false
            }
        }
    }

    /// Set the output lens model by name. Unknown names are ignored;
    /// returns `false` for them.
    pub fn set_output_projection_name(&mut self, name: &str) -> bool {
        match ProjectionType::from_str(name) {
            Ok(projection) => {
                self.set_output_projection(projection);
                true
            }
            Err(_) => {
                warn!("ignoring unknown output projection '{}'", name);
                false
            }
        }
    }

    /// Interpolation used when sampling the source
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Set the interpolation used when sampling the source
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Record the source image size; a change invalidates cached state.
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        if self.image_size == Some((width, height)) {
            return;
        }
        self.image_size = Some((width, height));
        let (w, h) = (width as f64, height as f64);
        self.half_diagonal = (w * w + h * h).sqrt() / 2.0;
        self.invalidate();
        self.listeners
            .notify(&FilterEvent::ImageSizeChanged { width, height });
    }

    /// Half the image diagonal in pixels, 0 before any size is known
    pub fn half_diagonal(&self) -> f64 {
        self.half_diagonal
    }

    /// Output field of view, recomputed if stale
    pub fn output_fov(&mut self) -> f64 {
        self.refresh_scale();
        self.output_fov
    }

    /// Smallest anchor radius for the current lens pair, recomputed if
    /// stale
    pub fn lower_radius_limit(&mut self) -> Option<f64> {
        self.refresh_scale();
        self.lower_radius_limit
    }

    /// Returns `true` while both the scale and the per-pixel field are
    /// current
    pub fn is_transform_valid(&self) -> bool {
        self.scale_valid && self.field.is_some()
    }

    /// Number of times the per-pixel field has been rebuilt
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Register a change callback
    pub fn subscribe(&mut self, listener: impl FnMut(&FilterEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    /// Remove a change callback
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Recompute the radius floor and output field of view if any
    /// parameter changed since the last call.
    ///
    /// A fixed radius below the floor is raised to it.
    pub fn refresh_scale(&mut self) {
        if self.scale_valid {
            return;
        }
        let RadialParams {
            source_fov,
            source_projection,
            output_projection,
            ..
        } = self.params;

        let limit = find_radius_limit(source_projection, source_fov, output_projection);
        if let Some(limit) = limit
            && self.params.fixed_radius < limit
        {
            let from = self.params.fixed_radius;
            debug!("raising fixed radius {} to floor {}", from, limit);
            self.params.fixed_radius = limit;
            self.field = None;
            self.listeners
                .notify(&FilterEvent::FixedRadiusRaised { from, to: limit });
        }

        let fixed = self.params.fixed_radius;
        let theta = source_projection.angle_at_radius(fixed, source_fov);
        let mut fov = output_projection.fov_at_angle(theta, fixed);
        if fov.is_nan() {
            fov = MAX_FOV;
        }
        self.output_fov = fov.min(MAX_FOV);
        self.lower_radius_limit = limit;
        self.scale_valid = true;
        debug!(
            "radial scale: {} -> {}, fixed radius {}, output fov {:.4}",
            source_projection, output_projection, fixed, self.output_fov
        );
    }

    /// Ratio of source radius to output radius for an output pixel
    /// `r_out` pixels from the center. Exactly 1 at the center.
    pub fn stretch_factor(&mut self, r_out: f64) -> f64 {
        self.refresh_scale();
        self.stretch_at(r_out)
    }

    fn stretch_at(&self, r_out: f64) -> f64 {
        if r_out == 0.0 || self.half_diagonal == 0.0 {
            return 1.0;
        }
        let theta = self
            .params
            .output_projection
            .angle_at_radius(r_out / self.half_diagonal, self.output_fov);
        let r_source = self.half_diagonal
            * self
                .params
                .source_projection
                .radius_at_angle(theta, self.params.source_fov);
        r_source / r_out
    }

    fn refresh_field(&mut self, width: u32, height: u32) {
        self.refresh_scale();
        if let Some(field) = &self.field
            && field.width == width
            && field.height == height
        {
            return;
        }

        let center_x = width as f64 / 2.0;
        let center_y = height as f64 / 2.0;
        let count = width as usize * height as usize;
        let mut xs = Vec::with_capacity(count);
        let mut ys = Vec::with_capacity(count);
        for j in 0..height {
            let dy = j as f64 - center_y;
            for i in 0..width {
                let dx = i as f64 - center_x;
                let stretch = self.stretch_at(dx.hypot(dy));
                xs.push(center_x + stretch * dx + CENTER_BIAS);
                ys.push(center_y + stretch * dy + CENTER_BIAS);
            }
        }

        self.generation += 1;
        debug!(
            "radial field rebuilt for {}x{}, generation {}",
            width, height, self.generation
        );
        self.field = Some(StretchField {
            width,
            height,
            xs,
            ys,
        });
    }

    /// Re-project `source` into the output lens model.
    ///
    /// The output has the source's dimensions; pixels that map outside
    /// the source are black.
    pub fn correct(&mut self, source: &Raster) -> FilterResult<Raster> {
        let (width, height) = source.dimensions();
        self.set_image_size(width, height);
        self.refresh_field(width, height);

        match &self.field {
            Some(field) => Ok(remap(
                source,
                width,
                height,
                &field.xs,
                &field.ys,
                self.interpolation,
            )?),
            None => Ok(source.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Setter boundary
    // ------------------------------------------------------------------------

    #[test]
    fn test_defaults() {
        let mut c = RadialDistortionCorrector::new();
        assert_eq!(*c.params(), RadialParams::default());
        assert!((c.output_fov() - DEFAULT_FOV).abs() < 1e-12);
        assert_eq!(c.lower_radius_limit(), None);
    }

    #[test]
    fn test_fixed_radius_clamped() {
        let mut c = RadialDistortionCorrector::new();
        c.set_fixed_radius(-0.5);
        assert_eq!(c.params().fixed_radius, 0.5);
        c.set_fixed_radius(0.01);
        assert_eq!(c.params().fixed_radius, MIN_RADIUS);
        c.set_fixed_radius(7.0);
        assert_eq!(c.params().fixed_radius, MAX_RADIUS);
        c.set_fixed_radius(f64::NAN);
        assert_eq!(c.params().fixed_radius, MAX_RADIUS);
    }

    #[test]
    fn test_source_fov_clamped() {
        let mut c = RadialDistortionCorrector::new();
        c.set_source_fov(0.01);
        assert_eq!(c.params().source_fov, MIN_FOV);
        c.set_source_fov(-4.0);
        assert_eq!(c.params().source_fov, MAX_SOURCE_FOV);
        c.set_source_fov(f64::NAN);
        assert_eq!(c.params().source_fov, MAX_SOURCE_FOV);
    }

    #[test]
    fn test_projection_names() {
        let mut c = RadialDistortionCorrector::new();
        assert!(c.set_source_projection_name("Equisolid"));
        assert!(!c.set_output_projection_name("Panini"));
        assert_eq!(c.params().source_projection, ProjectionType::Equisolid);
        assert_eq!(c.params().output_projection, ProjectionType::Rectilinear);
    }

    // ------------------------------------------------------------------------
    // Scale and stretch
    // ------------------------------------------------------------------------

    #[test]
    fn test_stretch_at_center_is_one() {
        let mut c = RadialDistortionCorrector::new();
        c.set_image_size(64, 48);
        c.set_source_projection(ProjectionType::Stereographic);
        c.set_output_projection(ProjectionType::Rectilinear);
        assert_eq!(c.stretch_factor(0.0), 1.0);
    }

    #[test]
    fn test_same_projection_is_identity() {
        let mut c = RadialDistortionCorrector::new();
        c.set_image_size(64, 48);
        c.set_source_projection(ProjectionType::Equisolid);
        c.set_output_projection(ProjectionType::Equisolid);
        c.set_source_fov(2.5);
        c.set_fixed_radius(0.4);
        assert!((c.output_fov() - 2.5).abs() < 1e-9);
        assert_eq!(c.lower_radius_limit(), None);
        for r in [1.0, 10.0, 39.9] {
            assert!((c.stretch_factor(r) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_equidistant_floor() {
        // 150° rectilinear into equidistant needs an anchor of at least 0.80
        let mut c = RadialDistortionCorrector::new();
        c.set_source_fov(150f64.to_radians());
        c.set_output_projection(ProjectionType::Equidistant);
        assert_eq!(c.lower_radius_limit(), Some(0.8));
        assert_eq!(c.params().fixed_radius, 0.8);
        assert!(c.output_fov() <= PI);
    }

    #[test]
    fn test_floor_found_when_newton_stalls() {
        // Orthographic output has an unbounded slope at the frame edge;
        // Newton crawls toward the root near 0.9996 and runs out of steps
        let f = |r: f64| {
            ProjectionType::Equisolid.angle_at_radius(r, 177f64.to_radians())
                - ProjectionType::Orthographic.angle_at_radius(r, PI)
        };
        assert!(f(0.75) > 0.0);
        let limit = find_radius_limit(
            ProjectionType::Equisolid,
            177f64.to_radians(),
            ProjectionType::Orthographic,
        );
        assert_eq!(limit, Some(1.0));

        let mut c = RadialDistortionCorrector::new();
        c.set_source_projection(ProjectionType::Equisolid);
        c.set_output_projection(ProjectionType::Orthographic);
        c.set_source_fov(177f64.to_radians());
        c.refresh_scale();
        assert_eq!(c.params().fixed_radius, 1.0);
    }

    #[test]
    fn test_invalidation() {
        let mut c = RadialDistortionCorrector::new();
        let source = Raster::new(16, 12).unwrap();
        c.correct(&source).unwrap();
        assert!(c.is_transform_valid());

        c.set_source_fov(1.0);
        assert!(!c.is_transform_valid());
        c.correct(&source).unwrap();
        assert!(c.is_transform_valid());

        c.set_image_size(20, 12);
        assert!(!c.is_transform_valid());
    }
}
