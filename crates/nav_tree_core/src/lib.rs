//! Headless drag-and-drop reordering for navigation trees.
//!
//! Everything here is plain data plus pure functions over it; timers, frames and pixels are
//! supplied by whoever renders the tree.

mod auto_scroll;
mod config;
mod constraints;
mod flip;
mod handle;
mod hover_expand;
mod index;
mod keyboard;
mod node;
mod pointer;
mod preview;
mod reorder;
mod search;
mod session;
mod timer;

pub use auto_scroll::AutoScroll;
pub use config::{AutoScrollConfig, DragConfig};
pub use constraints::{DropPosition, destination_parent, is_valid_drop, is_valid_drop_in};
pub use flip::FlipAnimator;
pub use handle::{HandleBinding, HandleRole, handle_binding};
pub use hover_expand::HoverExpand;
pub use index::{Forest, TreeIndex, TreeIndexEntry};
pub use keyboard::{Announcement, KeyboardDragState, KeyboardRefusal, KeyboardStep};
pub use node::{BasicNode, NavKind, NavNode, NodeKind};
pub use pointer::{DropZone, DropZoneCache, PointerDragState, drop_position_for};
pub use preview::{
    DraggedItem, PreviewInsert, compute_insert_position, is_preview_item, items_with_preview,
    materialize,
};
pub use reorder::{MoveEvent, ReorderMode, apply_move, try_apply_move};
pub use search::{Found, TreeSearch};
pub use session::{
    DragModality, DragPhase, DragSession, DropOutcome, DropTarget, KeyboardMove, PointerMove,
};
pub use timer::{TimerRequest, TimerToken};

pub use kurbo::{Point, Rect, Vec2};
