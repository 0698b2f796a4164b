//! Plain value types for network-relative and pixel-space geometry.
//!
//! `Point2D` doubles as a coordinate and as a two-component scale/offset
//! operand: all arithmetic is component-wise, so multiplying a box or a
//! landmark by `Point2D::new(w, h)` maps it from network units to pixels.

mod landmark;

pub use landmark::{Landmark, Landmark5, NUM_LANDMARKS};

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

/// A 2D point (or per-axis operand).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    /// Creates a point from its components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates an operand with the same value on both axes.
    pub const fn splat(value: f32) -> Self {
        Self { x: value, y: value }
    }
}

macro_rules! impl_point_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $trait for Point2D {
            type Output = Point2D;

            #[inline]
            fn $method(self, rhs: Point2D) -> Point2D {
                Point2D::new(self.x $op rhs.x, self.y $op rhs.y)
            }
        }

        impl $assign_trait for Point2D {
            #[inline]
            fn $assign_method(&mut self, rhs: Point2D) {
                *self = *self $op rhs;
            }
        }
    };
}

impl_point_op!(Add, add, AddAssign, add_assign, +);
impl_point_op!(Sub, sub, SubAssign, sub_assign, -);
impl_point_op!(Mul, mul, MulAssign, mul_assign, *);
impl_point_op!(Div, div, DivAssign, div_assign, /);

/// Axis-aligned box given by two corners.
///
/// Nothing enforces `bottom_right >= top_left`; inverted and zero-size boxes
/// are carried through and yield zero or negative areas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub top_left: Point2D,
    pub bottom_right: Point2D,
}

impl BoundingBox {
    /// Creates a box from its corners.
    pub const fn new(top_left: Point2D, bottom_right: Point2D) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Creates a box from `[x1, y1, x2, y2]`.
    pub fn from_corners(coords: [f32; 4]) -> Self {
        Self::new(
            Point2D::new(coords[0], coords[1]),
            Point2D::new(coords[2], coords[3]),
        )
    }

    /// Signed width; negative for inverted boxes.
    pub fn width(&self) -> f32 {
        self.bottom_right.x - self.top_left.x
    }

    /// Signed height; negative for inverted boxes.
    pub fn height(&self) -> f32 {
        self.bottom_right.y - self.top_left.y
    }

    /// Signed area, `width * height`.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Returns the box with both corners multiplied component-wise by `scale`.
    pub fn scaled(&self, scale: Point2D) -> Self {
        Self::new(self.top_left * scale, self.bottom_right * scale)
    }

    /// Returns the box grown by `factor` of its extent on every side.
    pub fn padded(&self, factor: f32) -> Self {
        let padding = Point2D::new(self.width(), self.height()) * Point2D::splat(factor);
        Self::new(self.top_left - padding, self.bottom_right + padding)
    }

    /// Intersection over union with `other`.
    ///
    /// The intersection extent is clamped at zero. The union uses the signed
    /// areas, so degenerate inputs can make it zero or negative and the ratio
    /// non-finite or negative. Use [`overlaps`] for the thresholded decision.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x_max = self.bottom_right.x.min(other.bottom_right.x);
        let y_max = self.bottom_right.y.min(other.bottom_right.y);
        let x_min = self.top_left.x.max(other.top_left.x);
        let y_min = self.top_left.y.max(other.top_left.y);

        let w = (x_max - x_min).max(0.0);
        let h = (y_max - y_min).max(0.0);

        let intersection = w * h;
        let union = self.area() + other.area() - intersection;
        intersection / union
    }
}

/// Returns true when `iou(a, b)` is finite and strictly above `threshold`.
///
/// A zero union yields NaN or infinity; such pairs never count as overlapping.
pub fn overlaps(a: &BoundingBox, b: &BoundingBox, threshold: f32) -> bool {
    let iou = a.iou(b);
    if !iou.is_finite() {
        crate::trace::trace_debug!("degenerate_iou", iou = iou);
        return false;
    }
    iou > threshold
}
