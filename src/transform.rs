//! Affine view transforms for zoom, pan and fit-to-window.
//!
//! Transforms use the row-vector convention: a point `p` maps to `p · M`, so
//! `a * b` applies `a` first and then `b`. Every operation builds
//! `delta * current`, putting the newest step closest to the image.

use std::ops::Mul;

use crate::error::TransformError;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn between(from: Point, to: Point) -> Self {
        Self::new(to.x - from.x, to.y - from.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A 2×3 affine matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            offset_x: dx,
            offset_y: dy,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            m11: sx,
            m22: sy,
            ..Self::IDENTITY
        }
    }

    pub fn uniform_scale(s: f64) -> Self {
        Self::scale(s, s)
    }

    /// Counter-clockwise rotation by `radians`.
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            m11: cos,
            m12: sin,
            m21: -sin,
            m22: cos,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn determinant(&self) -> f64 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    pub fn has_rotation_or_skew(&self) -> bool {
        self.m12 != 0.0 || self.m21 != 0.0
    }

    pub fn transform_point(&self, point: Point) -> Point {
        Point::new(
            point.x * self.m11 + point.y * self.m21 + self.offset_x,
            point.x * self.m12 + point.y * self.m22 + self.offset_y,
        )
    }

    /// The inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let m11 = self.m22 / det;
        let m12 = -self.m12 / det;
        let m21 = -self.m21 / det;
        let m22 = self.m11 / det;
        Some(Affine {
            m11,
            m12,
            m21,
            m22,
            offset_x: -(self.offset_x * m11 + self.offset_y * m21),
            offset_y: -(self.offset_x * m12 + self.offset_y * m22),
        })
    }

    pub fn approx_eq(&self, other: &Affine, epsilon: f64) -> bool {
        [
            (self.m11, other.m11),
            (self.m12, other.m12),
            (self.m21, other.m21),
            (self.m22, other.m22),
            (self.offset_x, other.offset_x),
            (self.offset_y, other.offset_y),
        ]
        .iter()
        .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Affine {
    type Output = Affine;

    /// `self` applied first, then `rhs`.
    fn mul(self, rhs: Affine) -> Affine {
        Affine {
            m11: self.m11 * rhs.m11 + self.m12 * rhs.m21,
            m12: self.m11 * rhs.m12 + self.m12 * rhs.m22,
            m21: self.m21 * rhs.m11 + self.m22 * rhs.m21,
            m22: self.m21 * rhs.m12 + self.m22 * rhs.m22,
            offset_x: self.offset_x * rhs.m11 + self.offset_y * rhs.m21 + rhs.offset_x,
            offset_y: self.offset_x * rhs.m12 + self.offset_y * rhs.m22 + rhs.offset_y,
        }
    }
}

pub struct ViewTransformEngine;

impl ViewTransformEngine {
    /// Scale by `factor` about `pivot`, on top of `current`.
    pub fn zoom(pivot: Point, factor: f64, current: Affine) -> Result<Affine, TransformError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(TransformError::InvalidZoomFactor(factor));
        }
        Ok(Affine::translation(-pivot.x, -pivot.y)
            * Affine::uniform_scale(factor)
            * Affine::translation(pivot.x, pivot.y)
            * current)
    }

    pub fn pan(delta: Vector, current: Affine) -> Affine {
        Affine::translation(delta.x, delta.y) * current
    }

    /// Largest uniform scale that fits `image` inside `viewport`.
    pub fn fit_to_window(image: Size, viewport: Size) -> Affine {
        if image.width == 0.0 || image.height == 0.0 {
            return Affine::IDENTITY;
        }
        let scale = (viewport.width / image.width).min(viewport.height / image.height);
        Affine::uniform_scale(scale)
    }

    pub fn reset() -> Affine {
        Affine::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn sample_transform() -> Affine {
        Affine::uniform_scale(1.7) * Affine::translation(12.0, -3.5)
    }

    #[test]
    fn multiplication_applies_left_operand_first() {
        let t = Affine::translation(10.0, 0.0) * Affine::uniform_scale(2.0);
        assert_eq!(t.transform_point(Point::new(1.0, 1.0)), Point::new(22.0, 2.0));

        let t = Affine::uniform_scale(2.0) * Affine::translation(10.0, 0.0);
        assert_eq!(t.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    }

    #[test]
    fn composition_is_associative() {
        let a = Affine::rotation(0.3);
        let b = Affine::translation(4.0, -2.0);
        let c = Affine::scale(1.5, 0.5);
        assert!(((a * b) * c).approx_eq(&(a * (b * c)), EPS));
    }

    #[test]
    fn unit_zoom_is_a_no_op() {
        let current = sample_transform();
        let zoomed = ViewTransformEngine::zoom(Point::new(37.0, -8.0), 1.0, current).unwrap();
        assert!(zoomed.approx_eq(&current, EPS));
    }

    #[test]
    fn zoom_keeps_pivot_fixed() {
        let pivot = Point::new(50.0, 25.0);
        let zoomed = ViewTransformEngine::zoom(pivot, 3.0, Affine::IDENTITY).unwrap();
        let mapped = zoomed.transform_point(pivot);
        assert!((mapped.x - pivot.x).abs() < EPS && (mapped.y - pivot.y).abs() < EPS);
        assert_eq!(zoomed.m11, 3.0);
    }

    #[test]
    fn successive_zooms_compose_multiplicatively() {
        let pivot = Point::new(128.0, 64.0);
        let current = sample_transform();
        let twice = ViewTransformEngine::zoom(
            pivot,
            0.8,
            ViewTransformEngine::zoom(pivot, 1.25, current).unwrap(),
        )
        .unwrap();
        let once = ViewTransformEngine::zoom(pivot, 1.25 * 0.8, current).unwrap();
        assert!(twice.approx_eq(&once, EPS));
    }

    #[test]
    fn zoom_rejects_non_positive_factor() {
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(ViewTransformEngine::zoom(Point::ORIGIN, factor, Affine::IDENTITY).is_err());
        }
    }

    #[test]
    fn pan_translates_before_current() {
        let current = Affine::uniform_scale(2.0);
        let panned = ViewTransformEngine::pan(Vector::new(5.0, -1.0), current);
        assert_eq!(panned.offset_x, 10.0);
        assert_eq!(panned.offset_y, -2.0);
    }

    #[test]
    fn fit_uses_limiting_dimension() {
        let fit = ViewTransformEngine::fit_to_window(Size::new(200.0, 100.0), Size::new(400.0, 400.0));
        assert_eq!(fit, Affine::uniform_scale(2.0));
    }

    #[test]
    fn fit_with_empty_image_is_identity() {
        let viewport = Size::new(400.0, 300.0);
        assert!(ViewTransformEngine::fit_to_window(Size::new(0.0, 100.0), viewport).is_identity());
        assert!(ViewTransformEngine::fit_to_window(Size::new(100.0, 0.0), viewport).is_identity());
    }

    #[test]
    fn inverse_round_trips_points() {
        let t = ViewTransformEngine::zoom(Point::new(10.0, 10.0), 2.5, sample_transform()).unwrap();
        let inverse = t.invert().unwrap();
        assert!((t * inverse).approx_eq(&Affine::IDENTITY, EPS));
        assert!(Affine::scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn reset_is_identity() {
        assert!(ViewTransformEngine::reset().is_identity());
    }
}
