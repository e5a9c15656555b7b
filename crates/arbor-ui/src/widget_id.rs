//! Widget identifiers.
//!
//! Ids are handed out from a process-wide counter when a [`WidgetPod`] is
//! created, so they stay unique across every render root in the process and
//! are never reused.
//!
//! [`WidgetPod`]: crate::widget::WidgetPod

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// A stable identifier for a widget, valid for the widget's whole lifetime.
///
/// The reactive layer and test harnesses may cache these to target specific
/// widgets for inspection or mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(NonZeroU64);

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

impl WidgetId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        let raw = NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed);
        match NonZeroU64::new(raw) {
            Some(id) => Self(id),
            None => unreachable!("widget id counter starts at 1 and only increments"),
        }
    }

    /// Get the raw u64 value.
    pub const fn to_raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static_assertions::assert_eq_size!(WidgetId, Option<WidgetId>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = WidgetId::next();
        let b = WidgetId::next();
        assert_ne!(a, b);
        assert!(b.to_raw() > a.to_raw());
    }

    #[test]
    fn test_display() {
        let id = WidgetId::next();
        assert_eq!(id.to_string(), format!("#{}", id.to_raw()));
    }
}
