//! Built-in widgets.
//!
//! Each widget exposes builder methods for construction and associated
//! functions taking `&mut WidgetMut<'_, Self>` for edits after insertion,
//! so that every edit requests the passes it invalidates.

mod button;
mod flex;
mod label;
mod portal;
mod sized_box;

pub use button::Button;
pub use flex::{Axis, Flex};
pub use label::Label;
pub use portal::Portal;
pub use sized_box::SizedBox;
