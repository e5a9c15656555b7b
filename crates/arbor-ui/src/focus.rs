//! Keyboard focus navigation.
//!
//! The tab order is the root's focus chain: every focusable, enabled,
//! non-stashed widget in depth-first pre-order. The chain is rebuilt by the
//! focus-chain pass; this module only walks it.
//!
//! # Example
//!
//! ```ignore
//! let chain = [b, c];
//! assert_eq!(next_in_chain(&chain, None, FocusDirection::Next), Some(b));
//! assert_eq!(next_in_chain(&chain, Some(b), FocusDirection::Next), Some(c));
//! assert_eq!(next_in_chain(&chain, Some(c), FocusDirection::Next), Some(b));
//! ```

use crate::widget_id::WidgetId;

/// Focus navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    /// Move focus forward (Tab)
    Next,
    /// Move focus backward (Shift+Tab)
    Previous,
}

impl FocusDirection {
    pub fn from_forward(forward: bool) -> Self {
        if forward { Self::Next } else { Self::Previous }
    }
}

/// The widget that should receive focus after `current`.
///
/// With nothing focused (or a focused widget that left the chain), `Next`
/// starts at the first entry and `Previous` at the last. Navigation wraps.
pub fn next_in_chain(
    chain: &[WidgetId],
    current: Option<WidgetId>,
    direction: FocusDirection,
) -> Option<WidgetId> {
    if chain.is_empty() {
        return None;
    }
    let position = current.and_then(|current| chain.iter().position(|id| *id == current));
    let index = match (position, direction) {
        (None, FocusDirection::Next) => 0,
        (None, FocusDirection::Previous) => chain.len() - 1,
        (Some(i), FocusDirection::Next) => (i + 1) % chain.len(),
        (Some(i), FocusDirection::Previous) => (i + chain.len() - 1) % chain.len(),
    };
    Some(chain[index])
}

/// Split two root-ward paths into the ids only in `old` and only in `new`.
pub(crate) fn path_diff(old: &[WidgetId], new: &[WidgetId]) -> (Vec<WidgetId>, Vec<WidgetId>) {
    let lost = old.iter().filter(|id| !new.contains(id)).copied().collect();
    let gained = new.iter().filter(|id| !old.contains(id)).copied().collect();
    (lost, gained)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<WidgetId> {
        (0..n).map(|_| WidgetId::next()).collect()
    }

    #[test]
    fn test_first_tab_goes_to_first_entry() {
        let chain = ids(3);
        assert_eq!(next_in_chain(&chain, None, FocusDirection::Next), Some(chain[0]));
        assert_eq!(next_in_chain(&chain, None, FocusDirection::Previous), Some(chain[2]));
    }

    #[test]
    fn test_navigation_wraps() {
        let chain = ids(2);
        assert_eq!(next_in_chain(&chain, Some(chain[1]), FocusDirection::Next), Some(chain[0]));
        assert_eq!(
            next_in_chain(&chain, Some(chain[0]), FocusDirection::Previous),
            Some(chain[1])
        );
    }

    #[test]
    fn test_empty_chain() {
        assert_eq!(next_in_chain(&[], None, FocusDirection::Next), None);
    }

    #[test]
    fn test_path_diff() {
        let all = ids(4);
        let old = vec![all[0], all[1], all[3]];
        let new = vec![all[2], all[1], all[3]];
        let (lost, gained) = path_diff(&old, &new);
        assert_eq!(lost, vec![all[0]]);
        assert_eq!(gained, vec![all[2]]);
    }
}
