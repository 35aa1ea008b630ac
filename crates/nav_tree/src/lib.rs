mod item;
mod tree;

pub use item::{NavTreeEntry, NavTreeItem, NavTreeRowState};
pub use nav_tree_core::{DragConfig, DropPosition, MoveEvent, NavKind, ReorderMode};
pub use tree::{NavTree, NavTreeState, nav_tree};
