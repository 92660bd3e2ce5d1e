//! 2D positions and bounding boxes.
//!
//! Positions are cosmetic: they drive layout and rendering only and never take
//! part in constraint evaluation.

use nalgebra::Vector2;

use crate::NclError;

pub type Real = f64;

/// A position or direction in the plane.
pub type Point = Vector2<Real>;

#[inline]
pub fn point(x: Real, y: Real) -> Point {
    Point::new(x, y)
}

/// Unit vector along `v`, `None` for the zero vector.
pub fn unit(v: Point) -> Option<Point> {
    let norm = v.norm();
    if norm > 0.0 { Some(v / norm) } else { None }
}

/// Axis-aligned box spanning a set of points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Smallest box containing every point, `None` when there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Self { min, max })
    }

    pub fn size(&self) -> Point {
        self.max - self.min
    }

    /// Half of the size.
    pub fn extents(&self) -> Point {
        self.size() / 2.0
    }

    pub fn center(&self) -> Point {
        self.min + self.extents()
    }
}

/// Reject NaN and infinite coordinates coming from external input.
pub fn ensure_finite(v: Real, what: &str) -> Result<Real, NclError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(NclError::format(format!("non-finite value for {what}: {v}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "x").unwrap_err();
        assert!(matches!(err, NclError::Format { .. }));
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn bounds_over_points() {
        let b = Bounds::from_points([point(0.0, 0.0), point(1.0, 1.0), point(1.0, -1.0)]).unwrap();
        assert_eq!(b.min, point(0.0, -1.0));
        assert_eq!(b.max, point(1.0, 1.0));
        assert_eq!(b.size(), point(1.0, 2.0));
        assert_eq!(b.extents(), point(0.5, 1.0));
        assert_eq!(b.center(), point(0.5, 0.0));
    }

    #[test]
    fn bounds_of_nothing() {
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn unit_of_zero_is_none() {
        assert!(unit(point(0.0, 0.0)).is_none());
        let u = unit(point(3.0, 4.0)).unwrap();
        assert!((u.norm() - 1.0).abs() < 1e-12);
    }
}
