use std::{cell::RefCell, rc::Rc};

use gpui::SharedString;
use nav_tree_core::{DropPosition, HandleBinding, NavKind, NavNode, NodeKind as _, handle_binding};

#[derive(Clone)]
struct NavTreeItemState {
    expanded: bool,
    disabled: bool,
}

/// A navigation node: a section, group or page with an expanded state.
///
/// Clones share the expanded/disabled state, so toggling a row survives a reorder.
#[derive(Clone)]
pub struct NavTreeItem {
    pub id: SharedString,
    pub label: SharedString,
    pub kind: NavKind,
    pub children: Vec<NavTreeItem>,
    state: Rc<RefCell<NavTreeItemState>>,
}

impl std::fmt::Debug for NavTreeItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavTreeItem")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("children", &self.children)
            .finish()
    }
}

impl NavTreeItem {
    pub fn new(id: impl Into<SharedString>, label: impl Into<SharedString>, kind: NavKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            children: Vec::new(),
            state: Rc::new(RefCell::new(NavTreeItemState {
                expanded: false,
                disabled: false,
            })),
        }
    }

    pub fn section(id: impl Into<SharedString>, label: impl Into<SharedString>) -> Self {
        Self::new(id, label, NavKind::Section)
    }

    pub fn group(id: impl Into<SharedString>, label: impl Into<SharedString>) -> Self {
        Self::new(id, label, NavKind::Group)
    }

    pub fn page(id: impl Into<SharedString>, label: impl Into<SharedString>) -> Self {
        Self::new(id, label, NavKind::Page)
    }

    pub fn child(mut self, child: NavTreeItem) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl Into<Vec<NavTreeItem>>) -> Self {
        self.children.extend(children.into());
        self
    }

    pub fn expanded(self, expanded: bool) -> Self {
        self.state.borrow_mut().expanded = expanded;
        self
    }

    pub fn disabled(self, disabled: bool) -> Self {
        self.state.borrow_mut().disabled = disabled;
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    pub fn is_expanded(&self) -> bool {
        self.state.borrow().expanded
    }

    pub(crate) fn set_expanded(&self, expanded: bool) {
        self.state.borrow_mut().expanded = expanded;
    }
}

impl NavNode for NavTreeItem {
    type Id = SharedString;
    type Kind = NavKind;

    const CAN_SET_CHILDREN: bool = true;

    fn id(&self) -> SharedString {
        self.id.clone()
    }

    fn kind(&self) -> NavKind {
        self.kind
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn set_children(&self, children: Vec<Self>) -> Option<Self> {
        Some(Self {
            children,
            ..self.clone()
        })
    }
}

/// A flattened, visible row of the tree.
#[derive(Clone)]
pub struct NavTreeEntry {
    pub(crate) item: NavTreeItem,
    pub(crate) depth: usize,
    pub(crate) parent_id: Option<SharedString>,
    pub(crate) is_preview: bool,
}

impl NavTreeEntry {
    #[inline]
    pub fn item(&self) -> &NavTreeItem {
        &self.item
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn parent_id(&self) -> Option<&SharedString> {
        self.parent_id.as_ref()
    }

    /// Whether this row is the dragged node shown at its would-be destination.
    #[inline]
    pub fn is_preview(&self) -> bool {
        self.is_preview
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        self.item.is_container()
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.item.is_expanded()
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.item.is_disabled()
    }

    /// Drag-handle and drop-zone bindings for this row. Preview rows are never handles.
    pub fn binding(&self) -> HandleBinding<SharedString, NavKind> {
        let mut binding = handle_binding(&self.item, self.is_disabled());
        if self.is_preview {
            binding.draggable = false;
        }
        binding
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NavTreeRowState {
    pub selected: bool,
    /// The row is the node being dragged.
    pub dragging: bool,
    /// The row is the dragged node previewed at a new position.
    pub preview: bool,
    /// The row was picked up with the keyboard.
    pub grabbed: bool,
    pub drop_target: Option<DropPosition>,
}

pub(crate) fn expand(items: &[NavTreeItem], id: &SharedString) -> bool {
    for item in items {
        if item.id == *id {
            item.set_expanded(true);
            return true;
        }
        if expand(&item.children, id) {
            return true;
        }
    }
    false
}

pub(crate) fn find<'a>(items: &'a [NavTreeItem], id: &SharedString) -> Option<&'a NavTreeItem> {
    items.iter().find_map(|item| {
        if item.id == *id {
            Some(item)
        } else {
            find(&item.children, id)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_tree_core::{MoveEvent, apply_move};

    #[test]
    fn expanded_state_survives_a_reorder() {
        let group = NavTreeItem::group("g", "Guides")
            .child(NavTreeItem::page("a", "A"))
            .child(NavTreeItem::page("b", "B"));
        let roots = vec![NavTreeItem::section("s", "Docs").child(group)];

        let event = MoveEvent {
            item: roots[0].children[0].children[1].clone(),
            from_parent_id: Some(SharedString::from("g")),
            to_parent_id: Some(SharedString::from("g")),
            to_index: 0,
        };
        let moved = apply_move(&roots, &event);
        let ids: Vec<&str> = moved[0].children[0]
            .children
            .iter()
            .map(|item| item.id.as_str())
            .collect();
        assert_eq!(ids, ["b", "a"]);

        assert!(expand(&moved, &SharedString::from("g")));
        assert!(roots[0].children[0].is_expanded());
        assert!(!expand(&moved, &SharedString::from("missing")));
    }

    #[test]
    fn preview_and_disabled_rows_are_not_handles() {
        let entry = |item: NavTreeItem, is_preview| NavTreeEntry {
            item,
            depth: 0,
            parent_id: None,
            is_preview,
        };

        let group = entry(NavTreeItem::group("g", "Guides"), false).binding();
        assert!(group.draggable);
        assert!(group.role.is_expandable());

        assert!(!entry(NavTreeItem::page("p", "P"), true).binding().draggable);
        let disabled = entry(NavTreeItem::page("d", "D").disabled(true), false).binding();
        assert!(!disabled.draggable);
        assert!(!disabled.tab_reachable);
    }

    #[test]
    fn find_walks_nested_children() {
        let roots = vec![
            NavTreeItem::section("s", "Docs").child(NavTreeItem::group("g", "Guides")),
        ];
        assert_eq!(
            find(&roots, &SharedString::from("g")).map(|item| item.kind),
            Some(NavKind::Group)
        );
        assert!(find(&roots, &SharedString::from("x")).is_none());
    }
}
