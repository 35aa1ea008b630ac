use serde::{Deserialize, Serialize};

use crate::node::{NavNode, NodeKind};
use crate::search::TreeSearch;

/// Where a drop lands relative to its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    /// First child of a container target.
    Inside,
}

/// The parent a dragged node would end up under.
///
/// Returns `None` for `Inside` against a non-container, which is never a legal drop. The
/// outer `Option` is the answer; the inner one is the parent (`None` for the root list).
pub fn destination_parent<K: NodeKind, Id: Clone>(
    dragged_kind: K,
    target_id: &Id,
    target_kind: K,
    target_parent_id: Option<&Id>,
    position: DropPosition,
) -> Option<Option<Id>> {
    match position {
        DropPosition::Inside => target_kind.is_container().then(|| Some(target_id.clone())),
        DropPosition::Before | DropPosition::After => {
            // Root containers placed next to each other stay at the root.
            if dragged_kind.is_root_container() && target_kind.is_root_container() {
                Some(None)
            } else {
                Some(target_parent_id.cloned())
            }
        }
    }
}

/// Whether dropping a node of `dragged_kind` at `position` relative to `target_id` is legal.
///
/// `is_within_dragged` must answer whether an id is the dragged node itself or one of its
/// descendants.
pub fn is_valid_drop<K: NodeKind, Id: Clone>(
    dragged_kind: K,
    target_id: &Id,
    target_kind: K,
    target_parent_id: Option<&Id>,
    position: DropPosition,
    is_within_dragged: impl Fn(&Id) -> bool,
) -> bool {
    let Some(parent_id) = destination_parent(
        dragged_kind,
        target_id,
        target_kind,
        target_parent_id,
        position,
    ) else {
        return false;
    };

    if dragged_kind.is_root_container() && parent_id.is_some() {
        return false;
    }

    !is_within_dragged(target_id)
}

/// [`is_valid_drop`] with kinds and parents resolved through `search`.
pub fn is_valid_drop_in<T: NavNode>(
    search: &TreeSearch<'_, T>,
    dragged_id: &T::Id,
    dragged_kind: T::Kind,
    target_id: &T::Id,
    position: DropPosition,
) -> bool {
    let Some(target) = search.find_by_id(target_id) else {
        return false;
    };
    is_valid_drop(
        dragged_kind,
        target_id,
        target.node.kind(),
        target.parent_id.as_ref(),
        position,
        |id| search.is_descendant_of(id, dragged_id),
    )
}
