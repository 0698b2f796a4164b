//! Fixed-size facial landmark sets.

use super::Point2D;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

/// Number of keypoints the RetinaFace head predicts per face.
pub const NUM_LANDMARKS: usize = 5;

/// An ordered set of `K` keypoints belonging to one detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark<const K: usize> {
    pub points: [Point2D; K],
}

/// Five-point face landmark (eyes, nose tip, mouth corners).
pub type Landmark5 = Landmark<NUM_LANDMARKS>;

impl<const K: usize> Landmark<K> {
    /// Number of points in the set.
    pub const SIZE: usize = K;

    /// Creates a landmark set from its points.
    pub const fn new(points: [Point2D; K]) -> Self {
        Self { points }
    }

    /// Builds a landmark from `2 * K` interleaved `x, y` values.
    ///
    /// Returns `None` when `coords` has a different length.
    pub fn from_interleaved(coords: &[f32]) -> Option<Self> {
        if coords.len() != 2 * K {
            return None;
        }
        let mut points = [Point2D::default(); K];
        for (point, pair) in points.iter_mut().zip(coords.chunks_exact(2)) {
            *point = Point2D::new(pair[0], pair[1]);
        }
        Some(Self { points })
    }

    /// Iterates over the keypoints in order.
    pub fn iter(&self) -> impl Iterator<Item = &Point2D> {
        self.points.iter()
    }
}

impl<const K: usize> Default for Landmark<K> {
    fn default() -> Self {
        Self {
            points: [Point2D::default(); K],
        }
    }
}

macro_rules! impl_landmark_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident) => {
        impl<const K: usize> $assign_trait<Point2D> for Landmark<K> {
            #[inline]
            fn $assign_method(&mut self, rhs: Point2D) {
                for point in self.points.iter_mut() {
                    point.$assign_method(rhs);
                }
            }
        }

        impl<const K: usize> $trait<Point2D> for Landmark<K> {
            type Output = Landmark<K>;

            #[inline]
            fn $method(mut self, rhs: Point2D) -> Landmark<K> {
                self.$assign_method(rhs);
                self
            }
        }
    };
}

impl_landmark_op!(Add, add, AddAssign, add_assign);
impl_landmark_op!(Sub, sub, SubAssign, sub_assign);
impl_landmark_op!(Mul, mul, MulAssign, mul_assign);
impl_landmark_op!(Div, div, DivAssign, div_assign);
