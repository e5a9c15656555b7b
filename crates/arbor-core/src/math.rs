//! Vector and transform math, re-exported from [`glam`].
//!
//! The widget engine only needs 2D types: [`Vec2`] for points and offsets and
//! [`Affine2`] for composed widget transforms.
//!
//! ```
//! use arbor_core::math::{Affine2, Vec2};
//!
//! let parent = Affine2::from_translation(Vec2::new(10.0, 0.0));
//! let child = parent * Affine2::from_translation(Vec2::new(0.0, 5.0));
//! assert_eq!(child.transform_point2(Vec2::ZERO), Vec2::new(10.0, 5.0));
//! ```

pub use glam::{Affine2, Mat2, Vec2};
