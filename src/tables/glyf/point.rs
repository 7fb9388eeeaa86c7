use otspec::types::*;

/// Represents a point inside a glyf::Contour
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Point {
    /// x-coordinate
    pub x: int16,
    /// y-coordinate
    pub y: int16,
    /// Is this an on-curve point?
    pub on_curve: bool,
}

impl Point {
    /// An on-curve point at the given coordinates.
    pub fn on(x: int16, y: int16) -> Point {
        Point {
            x,
            y,
            on_curve: true,
        }
    }

    /// An off-curve (quadratic control) point at the given coordinates.
    pub fn off(x: int16, y: int16) -> Point {
        Point {
            x,
            y,
            on_curve: false,
        }
    }

    /// The point as a `kurbo::Point`.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x.into(), self.y.into())
    }
}
