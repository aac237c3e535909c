//! Perspective (keystone) rectification
//!
//! The rectifier keeps two keyframed quads. For each destination pixel it
//! maps the point through the output quad onto the unit square and from
//! there onto the input quad, then samples the source at the result. A
//! rectangle output quad over a slanted input quad therefore straightens
//! whatever the input quad outlines.
//!
//! The mapped coordinates for the whole frame are cached and reused until
//! either resolved quad or the image size changes.

use crate::FilterResult;
use crate::keyframe::CornerKeyframes;
use crate::listener::{ChangeListeners, FilterEvent, ListenerId};
use log::debug;
use rectify_core::{Point, Quad, Raster};
use rectify_transform::{Interpolation, Matrix3, remap};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Which of the two corner stores an operation addresses
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum QuadSide {
    /// Corners outlining the region of the source image
    Input,
    /// Corners where that region should land in the output
    Output,
}

/// Editing constraint for output corners
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum CornerShape {
    /// Corners move independently
    Any,
    /// Moving a corner drags its neighbours so the quad stays an
    /// axis-aligned rectangle
    #[default]
    Rectangle,
}

#[derive(Debug)]
struct CoordCache {
    in_quad: Quad,
    out_quad: Quad,
    width: u32,
    height: u32,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl CoordCache {
    fn matches(&self, in_quad: &Quad, out_quad: &Quad, width: u32, height: u32) -> bool {
        self.width == width
            && self.height == height
            && self.in_quad == *in_quad
            && self.out_quad == *out_quad
    }
}

/// Keyframed four-corner perspective correction
#[derive(Debug)]
pub struct PerspectiveRectifier {
    input: CornerKeyframes,
    output: CornerKeyframes,
    corner_shape: CornerShape,
    interpolation: Interpolation,
    image_size: Option<(u32, u32)>,
    cache: Option<CoordCache>,
    generation: u64,
    listeners: ChangeListeners<FilterEvent>,
}

impl Default for PerspectiveRectifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PerspectiveRectifier {
    /// Create a rectifier with a per-frame input store and a fixed
    /// output store, both empty until the first image size is known.
    pub fn new() -> Self {
        Self::with_keyframes(CornerKeyframes::new(), CornerKeyframes::new_fixed())
    }

    /// Create a rectifier over existing corner stores.
    ///
    /// Output corners start in [`CornerShape::Rectangle`] mode.
    pub fn with_keyframes(input: CornerKeyframes, output: CornerKeyframes) -> Self {
        Self {
            input,
            output,
            corner_shape: CornerShape::default(),
            interpolation: Interpolation::default(),
            image_size: None,
            cache: None,
            generation: 0,
            listeners: ChangeListeners::new(),
        }
    }

    /// The corner store for `side`
    pub fn keyframes(&self, side: QuadSide) -> &CornerKeyframes {
        match side {
            QuadSide::Input => &self.input,
            QuadSide::Output => &self.output,
        }
    }

    fn keyframes_mut(&mut self, side: QuadSide) -> &mut CornerKeyframes {
        match side {
            QuadSide::Input => &mut self.input,
            QuadSide::Output => &mut self.output,
        }
    }

    /// Replace both corner stores
    pub fn set_keyframes(&mut self, input: CornerKeyframes, output: CornerKeyframes) {
        self.input = input;
        self.output = output;
        self.listeners.notify(&FilterEvent::CornersLoaded);
    }

    /// The last image size seen, if any
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    /// Interpolation used when sampling the source
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Set the interpolation used when sampling the source
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Editing constraint for output corners
    pub fn corner_shape(&self) -> CornerShape {
        self.corner_shape
    }

    /// Set the editing constraint for output corners.
    ///
    /// Switching to [`CornerShape::Rectangle`] squares up the output quad
    /// in effect at `frame`, one corner at a time.
    pub fn set_corner_shape(&mut self, shape: CornerShape, frame: u32) {
        if shape == self.corner_shape {
            return;
        }
        self.corner_shape = shape;
        if shape == CornerShape::Rectangle
            && let Some(mut quad) = self.output.resolve(frame)
        {
            for i in 0..4 {
                quad.set_rectangle_corner(i, quad[i]);
            }
            self.output.set(frame, quad);
        }
        self.listeners.notify(&FilterEvent::CornerShapeChanged(shape));
    }

    /// Record the source image size.
    ///
    /// The first time a size is seen, every empty corner store is seeded
    /// with [`Quad::centered_for_size`].
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        if self.image_size == Some((width, height)) {
            return;
        }
        self.image_size = Some((width, height));
        let default = Quad::centered_for_size(width, height);
        for store in [&mut self.input, &mut self.output] {
            if store.is_empty() {
                store.set(0, default);
            }
        }
        self.listeners
            .notify(&FilterEvent::ImageSizeChanged { width, height });
    }

    /// The quad on `side` in effect at `frame`
    pub fn quad(&self, side: QuadSide, frame: u32) -> Option<Quad> {
        self.keyframes(side).resolve(frame)
    }

    /// Store a whole quad on `side` at `frame`
    pub fn set_quad(&mut self, side: QuadSide, frame: u32, quad: Quad) {
        self.keyframes_mut(side).set(frame, quad);
        self.listeners.notify(&FilterEvent::CornerMoved {
            side,
            frame,
            index: None,
        });
    }

    /// Move corner `index` (0..4) of the quad on `side` in effect at
    /// `frame`, storing the result as a keyframe at `frame`.
    ///
    /// Output corners honour the [`CornerShape`] constraint. Indices past
    /// 3 are ignored.
    pub fn set_corner(&mut self, side: QuadSide, frame: u32, index: usize, point: Point) {
        if index >= 4 {
            return;
        }
        let mut quad = self.quad(side, frame).unwrap_or_default();
        if side == QuadSide::Output && self.corner_shape == CornerShape::Rectangle {
            quad.set_rectangle_corner(index, point);
        } else {
            quad[index] = point;
        }
        self.keyframes_mut(side).set(frame, quad);
        self.listeners.notify(&FilterEvent::CornerMoved {
            side,
            frame,
            index: Some(index),
        });
    }

    /// Remove the keyframe on `side` that `frame` resolves to. Key 0
    /// stays. Returns `true` if something was removed.
    pub fn delete_key_frame(&mut self, side: QuadSide, frame: u32) -> bool {
        match self.keyframes_mut(side).delete(frame) {
            Some(key) => {
                self.listeners
                    .notify(&FilterEvent::KeyFrameDeleted { side, frame: key });
                true
            }
            None => false,
        }
    }

    /// Switch the store on `side` between fixed and per-frame mode,
    /// keeping the quad in effect at `frame` when fixing.
    pub fn set_fixed(&mut self, side: QuadSide, fixed: bool, frame: u32) {
        let store = self.keyframes_mut(side);
        if store.is_fixed() == fixed {
            return;
        }
        store.set_fixed(fixed, frame);
        self.listeners
            .notify(&FilterEvent::FixedChanged { side, fixed });
    }

    /// Register a change callback
    pub fn subscribe(&mut self, listener: impl FnMut(&FilterEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    /// Remove a change callback
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// The matrix taking output pixels to source pixels at `frame`, or
    /// `None` while either store is empty.
    pub fn transform(&self, frame: u32) -> Option<Matrix3> {
        let in_quad = self.input.resolve(frame)?;
        let out_quad = self.output.resolve(frame)?;
        Some(Matrix3::compose(&out_quad, &in_quad))
    }

    /// Number of times the per-pixel coordinate map has been rebuilt
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn refresh_coords(&mut self, frame: u32, width: u32, height: u32) {
        let (Some(in_quad), Some(out_quad)) = (self.input.resolve(frame), self.output.resolve(frame))
        else {
            self.cache = None;
            return;
        };
        if let Some(cache) = &self.cache
            && cache.matches(&in_quad, &out_quad, width, height)
        {
            return;
        }

        let m = Matrix3::compose(&out_quad, &in_quad);
        let count = width as usize * height as usize;
        let mut xs = Vec::with_capacity(count);
        let mut ys = Vec::with_capacity(count);
        for j in 0..height {
            for i in 0..width {
                let p = m.transform_point(Point::new(i as f64, j as f64));
                xs.push(p.x);
                ys.push(p.y);
            }
        }

        self.generation += 1;
        debug!(
            "perspective map rebuilt for frame {} ({}x{}), generation {}",
            frame, width, height, self.generation
        );
        self.cache = Some(CoordCache {
            in_quad,
            out_quad,
            width,
            height,
            xs,
            ys,
        });
    }

    /// Rectify `source` as it appears at `frame`.
    ///
    /// The output has the source's dimensions. Pixels that map outside
    /// the source are black.
    pub fn rectify(&mut self, source: &Raster, frame: u32) -> FilterResult<Raster> {
        let (width, height) = source.dimensions();
        self.set_image_size(width, height);
        self.refresh_coords(frame, width, height);

        match &self.cache {
            Some(cache) => Ok(remap(
                source,
                width,
                height,
                &cache.xs,
                &cache.ys,
                self.interpolation,
            )?),
            None => Ok(source.clone()),
        }
    }
}
