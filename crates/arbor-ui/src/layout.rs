//! Box constraints passed down the tree during layout.

use arbor_core::geometry::Size;

/// Minimum and maximum size a widget may take.
///
/// Constraints flow down from parent to child; the child answers with a size
/// inside them. `max` may be infinite along an axis (a scroll container's
/// content, for instance), `min` never is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxConstraints {
    min: Size<f32>,
    max: Size<f32>,
}

impl BoxConstraints {
    /// Constraints that accept any size.
    pub const UNBOUNDED: Self = Self {
        min: Size::ZERO,
        max: Size::new(f32::INFINITY, f32::INFINITY),
    };

    pub fn new(min: Size<f32>, max: Size<f32>) -> Self {
        debug_assert!(
            min.width <= max.width && min.height <= max.height,
            "invalid constraints: min {min:?} exceeds max {max:?}"
        );
        debug_assert!(
            min.width.is_finite() && min.height.is_finite(),
            "min constraint must be finite, got {min:?}"
        );
        Self { min, max }
    }

    /// Constraints that only accept exactly `size`.
    pub fn tight(size: Size<f32>) -> Self {
        Self::new(size, size)
    }

    /// Constraints from zero up to `max`.
    pub fn loose(max: Size<f32>) -> Self {
        Self::new(Size::ZERO, max)
    }

    pub fn min(&self) -> Size<f32> {
        self.min
    }

    pub fn max(&self) -> Size<f32> {
        self.max
    }

    /// Drop the minimum, keeping the maximum.
    pub fn loosen(&self) -> Self {
        Self::loose(self.max)
    }

    pub fn is_width_bounded(&self) -> bool {
        self.max.width.is_finite()
    }

    pub fn is_height_bounded(&self) -> bool {
        self.max.height.is_finite()
    }

    /// Clamp `size` into these constraints.
    pub fn constrain(&self, size: Size<f32>) -> Size<f32> {
        Size::new(
            size.width.clamp(self.min.width, self.max.width),
            size.height.clamp(self.min.height, self.max.height),
        )
    }

    pub fn contains(&self, size: Size<f32>) -> bool {
        (self.min.width..=self.max.width).contains(&size.width)
            && (self.min.height..=self.max.height).contains(&size.height)
    }

    /// Shrink both bounds by a fixed amount, never below zero.
    pub fn shrink(&self, width: f32, height: f32) -> Self {
        let min = Size::new(
            (self.min.width - width).max(0.0),
            (self.min.height - height).max(0.0),
        );
        let max = Size::new(
            (self.max.width - width).max(0.0),
            (self.max.height - height).max(0.0),
        );
        Self::new(min, max)
    }

    /// Unbounded along the vertical axis, used for scrollable content.
    pub fn unbound_height(&self) -> Self {
        Self::new(
            Size::new(self.min.width, 0.0),
            Size::new(self.max.width, f32::INFINITY),
        )
    }
}
