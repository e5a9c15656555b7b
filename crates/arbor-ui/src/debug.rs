//! Debug rails and tree dumps.

use crate::widget::WidgetArena;
use crate::widget_id::WidgetId;
use std::fmt::Write;

/// Report a logic error: panics in debug builds, logs in release builds.
///
/// The caller is expected to skip the offending operation afterwards; the
/// release-mode path never tries to repair the tree.
macro_rules! debug_panic {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            panic!($($arg)*);
        } else {
            ::tracing::error!($($arg)*);
        }
    };
}

pub(crate) use debug_panic;

/// Render the subtree rooted at `root` as an indented listing of type names,
/// ids, sizes and flags.
pub fn dump_tree(arena: &WidgetArena, root: WidgetId) -> String {
    let mut out = String::new();
    dump_node(arena, root, 0, &mut out);
    out
}

fn dump_node(arena: &WidgetArena, id: WidgetId, depth: usize, out: &mut String) {
    let Some(state) = arena.try_state(id) else {
        let _ = writeln!(out, "{:indent$}<missing {id}>", "", indent = depth * 2);
        return;
    };
    let _ = writeln!(
        out,
        "{:indent$}{} {id} {}x{} {:?}",
        "",
        state.debug_name,
        state.size.width,
        state.size.height,
        state.flags,
        indent = depth * 2
    );
    for child in &state.children {
        dump_node(arena, *child, depth + 1, out);
    }
}
