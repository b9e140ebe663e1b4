//! Selection pruning
//!
//! Removes one denied field path from a selection tree. When the
//! removal leaves an ancestor with nothing selected, that ancestor is
//! removed from its own parent as well, cascading upward. The root is
//! never removed and may end up empty.

use super::{Selection, SelectionNode};

/// Remove the selection at `path`; returns true iff something was
/// actually removed.
///
/// A path that leads through a leaf, a missing field, or that is
/// empty reports false and leaves the tree untouched, so pruning the
/// same path twice is a harmless no-op.
pub fn prune(node: &mut SelectionNode, path: &[String]) -> bool {
    let Some((first, rest)) = path.split_first() else {
        return false;
    };

    if rest.is_empty() {
        return node.fields.shift_remove(first).is_some();
    }

    let removed = match node.fields.get_mut(first) {
        Some(Selection::Node(child)) => prune(child, rest),
        // Leaf or absent: the path is stale
        _ => false,
    };

    if removed {
        let now_empty = matches!(
            node.fields.get(first),
            Some(Selection::Node(child)) if child.is_selection_empty()
        );
        if now_empty {
            node.fields.shift_remove(first);
        }
    }

    removed
}
