//! Projective transforms between the unit square and quadrilaterals
//!
//! A [`Matrix3`] maps homogeneous column vectors: `(x', y', w)ᵀ = M · (x, y, 1)ᵀ`,
//! followed by division by `w`. Matrices are only meaningful up to a
//! nonzero scale, which is why [`Matrix3::quad_to_square`] returns the
//! adjugate of the forward map instead of its true inverse.
//!
//! Building a quad-to-quad map goes through the unit square:
//!
//! ```text
//! out quad --quad_to_square--> unit square --square_to_quad--> in quad
//! ```

use crate::{TransformError, TransformResult};
use log::trace;
use rectify_core::{Point, Quad};
use std::ops::Mul;

/// 3x3 projective matrix, row-major
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    m: [[f64; 3]; 3],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3 {
    /// The identity transform
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Create a matrix from its rows
    pub const fn from_rows(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    /// The rows of the matrix
    #[inline]
    pub fn rows(&self) -> &[[f64; 3]; 3] {
        &self.m
    }

    /// Returns `true` if the bottom row is exactly `[0, 0, 1]`
    pub fn is_affine(&self) -> bool {
        self.m[2] == [0.0, 0.0, 1.0]
    }

    /// Map the unit square onto `quad`.
    ///
    /// `(0,0)`, `(1,0)`, `(1,1)`, `(0,1)` go to `quad[0]..quad[3]`. A
    /// parallelogram takes the affine path and gets a bottom row of
    /// `[0, 0, 1]`. A quad with three collinear corners produces
    /// non-finite entries rather than an error; points pushed through such
    /// a matrix end up outside every raster.
    pub fn square_to_quad(quad: &Quad) -> Self {
        let [p0, p1, p2, p3] = *quad.corners();
        let dx3 = p0.x - p1.x + p2.x - p3.x;
        let dy3 = p0.y - p1.y + p2.y - p3.y;

        if dx3 == 0.0 && dy3 == 0.0 {
            return Self::from_rows([
                [p1.x - p0.x, p2.x - p1.x, p0.x],
                [p1.y - p0.y, p2.y - p1.y, p0.y],
                [0.0, 0.0, 1.0],
            ]);
        }

        let dx1 = p1.x - p2.x;
        let dy1 = p1.y - p2.y;
        let dx2 = p3.x - p2.x;
        let dy2 = p3.y - p2.y;
        let invdet = 1.0 / (dx1 * dy2 - dx2 * dy1);
        let g = (dx3 * dy2 - dx2 * dy3) * invdet;
        let h = (dx1 * dy3 - dx3 * dy1) * invdet;

        Self::from_rows([
            [p1.x - p0.x + g * p1.x, p3.x - p0.x + h * p3.x, p0.x],
            [p1.y - p0.y + g * p1.y, p3.y - p0.y + h * p3.y, p0.y],
            [g, h, 1.0],
        ])
    }

    /// Map `quad` onto the unit square.
    ///
    /// This is the adjugate of [`Matrix3::square_to_quad`], proportional
    /// to its inverse. The determinant is never divided out.
    pub fn quad_to_square(quad: &Quad) -> Self {
        Self::square_to_quad(quad).adjugate()
    }

    /// Transposed cofactor matrix
    pub fn adjugate(&self) -> Self {
        let m = &self.m;
        Self::from_rows([
            [
                m[1][1] * m[2][2] - m[1][2] * m[2][1],
                m[0][2] * m[2][1] - m[0][1] * m[2][2],
                m[0][1] * m[1][2] - m[0][2] * m[1][1],
            ],
            [
                m[1][2] * m[2][0] - m[1][0] * m[2][2],
                m[0][0] * m[2][2] - m[0][2] * m[2][0],
                m[0][2] * m[1][0] - m[0][0] * m[1][2],
            ],
            [
                m[1][0] * m[2][1] - m[1][1] * m[2][0],
                m[0][1] * m[2][0] - m[0][0] * m[2][1],
                m[0][0] * m[1][1] - m[0][1] * m[1][0],
            ],
        ])
    }

    /// Determinant
    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// The single matrix taking points of `out_quad` to the matching
    /// points of `in_quad`.
    ///
    /// Equal to `square_to_quad(in_quad) · quad_to_square(out_quad)`.
    pub fn compose(out_quad: &Quad, in_quad: &Quad) -> Self {
        let m = Self::square_to_quad(in_quad) * Self::quad_to_square(out_quad);
        trace!("compose {:?} -> {:?}: {:?}", out_quad, in_quad, m);
        m
    }

    /// Apply the transform to a point.
    ///
    /// A zero homogeneous weight leaves the point unchanged.
    #[inline]
    pub fn transform_point(&self, p: Point) -> Point {
        let (x, y) = self.transform_xy(p.x, p.y);
        Point::new(x, y)
    }

    #[inline]
    fn transform_xy(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.m;
        let w = m[2][0] * x + m[2][1] * y + m[2][2];
        if w == 0.0 {
            return (x, y);
        }
        (
            (m[0][0] * x + m[0][1] * y + m[0][2]) / w,
            (m[1][0] * x + m[1][1] * y + m[1][2]) / w,
        )
    }

    /// Apply the transform to parallel coordinate slices.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidParameters`] if `xs` and `ys` differ
    /// in length.
    pub fn transform_coords(&self, xs: &[f64], ys: &[f64]) -> TransformResult<(Vec<f64>, Vec<f64>)> {
        if xs.len() != ys.len() {
            return Err(TransformError::InvalidParameters(format!(
                "coordinate slices differ in length: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }
        Ok(xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| self.transform_xy(x, y))
            .unzip())
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Matrix3 { m: out }
    }
}
