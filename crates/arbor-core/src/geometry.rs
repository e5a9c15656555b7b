//! Plain geometry types shared by the widget engine.
//!
//! Points and offsets are [`glam::Vec2`]; these types cover the axis-aligned
//! shapes that glam does not provide.

use glam::{Affine2, Vec2};
use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }

    pub fn cast<U: From<T>>(self) -> Size<U> {
        Size {
            width: U::from(self.width),
            height: U::from(self.height),
        }
    }
}

impl<T: Mul + Copy> Mul<T> for Size<T> {
    type Output = Size<<T as Mul>::Output>;

    fn mul(self, rhs: T) -> Self::Output {
        Size {
            width: self.width * rhs,
            height: self.height * rhs,
        }
    }
}

impl Size<f32> {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Both dimensions are finite and non-negative.
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }

    pub fn to_rect(self) -> Rect<f32> {
        Rect::from_origin_size(Vec2::ZERO, self)
    }
}

impl<T> Rect<T> {
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl Rect<f32> {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub fn from_origin_size(origin: Vec2, size: Size<f32>) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Size<f32> {
        Size::new(self.width, self.height)
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.max_x().max(other.max_x()) - x,
            self.max_y().max(other.max_y()) - y,
        )
    }

    /// Overlapping area, or a zero-sized rect at the clamped corner when disjoint.
    pub fn intersect(&self, other: &Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let width = (self.max_x().min(other.max_x()) - x).max(0.0);
        let height = (self.max_y().min(other.max_y()) - y).max(0.0);
        Self::new(x, y, width, height)
    }

    /// Axis-aligned bounding box of this rect after `transform`.
    pub fn transform_bbox(&self, transform: Affine2) -> Self {
        let corners = [
            Vec2::new(self.x, self.y),
            Vec2::new(self.max_x(), self.y),
            Vec2::new(self.x, self.max_y()),
            Vec2::new(self.max_x(), self.max_y()),
        ]
        .map(|p| transform.transform_point2(p));
        let min = corners.iter().fold(Vec2::splat(f32::INFINITY), |a, p| a.min(*p));
        let max = corners.iter().fold(Vec2::splat(f32::NEG_INFINITY), |a, p| a.max(*p));
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }
}

/// Edge offsets, used for padding and scroll margins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Insets {
    pub const ZERO: Self = Self::uniform(0.0);

    pub const fn uniform(value: f32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    pub fn x_value(&self) -> f32 {
        self.left + self.right
    }

    pub fn y_value(&self) -> f32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(rect.contains(Vec2::new(10.0, 10.0)));
        assert!(rect.contains(Vec2::new(29.9, 14.9)));
        assert!(!rect.contains(Vec2::new(30.0, 12.0)));
        assert!(!rect.contains(Vec2::new(15.0, 15.0)));
    }

    #[test]
    fn test_rect_intersect_disjoint_is_empty() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 5.0, 5.0);
        let hit = a.intersect(&b);
        assert_eq!(hit.width, 0.0);
        assert_eq!(hit.height, 0.0);
    }

    #[test]
    fn test_rect_transform_bbox_translation() {
        let rect = Rect::new(0.0, 0.0, 50.0, 20.0);
        let moved = rect.transform_bbox(Affine2::from_translation(Vec2::new(5.0, -5.0)));
        assert_eq!(moved, Rect::new(5.0, -5.0, 50.0, 20.0));
    }

    #[test]
    fn test_size_mul() {
        let size = Size::new(2.0, 3.0) * 2.0;
        assert_eq!(size, Size::new(4.0, 6.0));
    }
}
