use kurbo::Rect;

use crate::node::{NavNode, NodeKind};
use crate::pointer::DropZone;

/// Accessibility role a renderer should report for a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleRole {
    TreeItem,
    /// A tree item that owns a child group and can be expanded.
    ExpandableTreeItem,
}

impl HandleRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TreeItem | Self::ExpandableTreeItem => "treeitem",
        }
    }

    pub fn is_expandable(self) -> bool {
        self == Self::ExpandableTreeItem
    }
}

/// What a renderer attaches to a row's drag handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandleBinding<Id, K> {
    pub id: Id,
    pub kind: K,
    /// The row may start a native or long-press drag.
    pub draggable: bool,
    /// The row takes part in keyboard navigation and can be picked up with the keyboard.
    pub tab_reachable: bool,
    pub role: HandleRole,
}

impl<Id: Clone, K: NodeKind> HandleBinding<Id, K> {
    /// The drop-zone tag for this row, once the renderer knows where it sits.
    pub fn drop_zone(&self, bounds: Rect) -> DropZone<Id> {
        DropZone {
            id: self.id.clone(),
            is_container: self.kind.is_container(),
            bounds,
        }
    }
}

/// Bindings for `node`. Disabled rows stay visible but can neither be dragged nor picked up.
pub fn handle_binding<T: NavNode>(node: &T, disabled: bool) -> HandleBinding<T::Id, T::Kind> {
    let kind = node.kind();
    HandleBinding {
        id: node.id(),
        kind,
        draggable: !disabled,
        tab_reachable: !disabled,
        role: if kind.is_container() {
            HandleRole::ExpandableTreeItem
        } else {
            HandleRole::TreeItem
        },
    }
}
