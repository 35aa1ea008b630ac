use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::node::NavNode;

/// A committed move.
///
/// `to_index` addresses the destination sibling list with `item` already removed, so a move and
/// its [`inverse`](MoveEvent::inverse) cancel out.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveEvent<T: NavNode> {
    pub item: T,
    pub from_parent_id: Option<T::Id>,
    pub to_parent_id: Option<T::Id>,
    pub to_index: usize,
}

impl<T: NavNode> MoveEvent<T> {
    /// The move that puts `item` back at `from_index` under its original parent.
    pub fn inverse(&self, from_index: usize) -> Self {
        Self {
            item: self.item.clone(),
            from_parent_id: self.to_parent_id.clone(),
            to_parent_id: self.from_parent_id.clone(),
            to_index: from_index,
        }
    }
}

/// Who applies committed moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderMode {
    /// Reorder internally when the node shape supports `set_children` and nobody handles moves.
    #[default]
    Auto,
    /// Always hand the move to the caller.
    Controlled,
    /// Always reorder internally.
    Uncontrolled,
}

impl ReorderMode {
    pub fn reorders_internally<T: NavNode>(self, has_external_handler: bool) -> bool {
        match self {
            Self::Auto => T::CAN_SET_CHILDREN && !has_external_handler,
            Self::Controlled => false,
            Self::Uncontrolled => true,
        }
    }
}

enum Edit<T: NavNode> {
    Remove { id: T::Id, removed: Option<T> },
    Insert { node: Option<T>, index: usize },
}

impl<T: NavNode> Edit<T> {
    fn apply(&mut self, list: &[T]) -> Option<Vec<T>> {
        match self {
            Self::Remove { id, removed } => {
                let position = list.iter().position(|node| node.id() == *id)?;
                let mut list = list.to_vec();
                *removed = Some(list.remove(position));
                Some(list)
            }
            Self::Insert { node, index } => {
                let node = node.take()?;
                let mut list = list.to_vec();
                let index = (*index).min(list.len());
                list.insert(index, node);
                Some(list)
            }
        }
    }
}

/// Apply `event` to a copy of `roots`.
///
/// Returns `None`, leaving nothing half-applied, when the item is not under `from_parent_id`,
/// when `to_parent_id` cannot be found once the item is removed, or when a node on either
/// path refuses `set_children`.
pub fn try_apply_move<T: NavNode>(roots: &[T], event: &MoveEvent<T>) -> Option<Vec<T>> {
    let mut remove = Edit::Remove {
        id: event.item.id(),
        removed: None,
    };
    let without = rebuild(roots, event.from_parent_id.as_ref(), &mut remove)?;
    let Edit::Remove {
        removed: Some(node),
        ..
    } = remove
    else {
        return None;
    };

    let mut insert = Edit::Insert {
        node: Some(node),
        index: event.to_index,
    };
    rebuild(&without, event.to_parent_id.as_ref(), &mut insert)
}

/// Like [`try_apply_move`], but a stale event is a no-op that returns an unchanged copy.
pub fn apply_move<T: NavNode>(roots: &[T], event: &MoveEvent<T>) -> Vec<T> {
    try_apply_move(roots, event).unwrap_or_else(|| {
        log::warn!(
            "ignoring stale move of {:?} from {:?} to {:?}[{}]",
            event.item.id(),
            event.from_parent_id,
            event.to_parent_id,
            event.to_index
        );
        roots.to_vec()
    })
}

/// Apply `edit` to the child list of `parent_id` (or the root list), rebuilding every ancestor
/// on the way down.
fn rebuild<T: NavNode>(
    nodes: &[T],
    parent_id: Option<&T::Id>,
    edit: &mut Edit<T>,
) -> Option<Vec<T>> {
    match parent_id {
        None => edit.apply(nodes),
        Some(parent_id) => rebuild_under(nodes, parent_id, edit, &mut HashSet::new()),
    }
}

fn rebuild_under<T: NavNode>(
    nodes: &[T],
    parent_id: &T::Id,
    edit: &mut Edit<T>,
    visited: &mut HashSet<T::Id>,
) -> Option<Vec<T>> {
    for (ix, node) in nodes.iter().enumerate() {
        let id = node.id();
        if !visited.insert(id.clone()) {
            continue;
        }

        let is_parent = id == *parent_id;
        let children = if is_parent {
            edit.apply(node.children())
        } else {
            rebuild_under(node.children(), parent_id, edit, visited)
        };

        match children {
            Some(children) => {
                let rebuilt = node.set_children(children)?;
                let mut nodes = nodes.to_vec();
                nodes[ix] = rebuilt;
                return Some(nodes);
            }
            None if is_parent => return None,
            None => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::BasicNode;

    fn id(s: &str) -> String {
        s.to_string()
    }

    fn dump(items: &[BasicNode], depth: usize, out: &mut String) {
        for node in items {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&node.id);
            out.push('\n');
            dump(&node.children, depth + 1, out);
        }
    }

    fn dumped(items: &[BasicNode]) -> String {
        let mut s = String::new();
        dump(items, 0, &mut s);
        s.trim().to_string()
    }

    fn sample() -> Vec<BasicNode> {
        vec![
            BasicNode::section("S").child(
                BasicNode::group("G")
                    .child(BasicNode::page("P1"))
                    .child(BasicNode::page("P2")),
            ),
            BasicNode::section("T").child(BasicNode::group("H")),
        ]
    }

    fn page(id: &str) -> BasicNode {
        BasicNode::page(id)
    }

    #[test]
    fn move_within_one_parent() {
        let roots = sample();
        let event = MoveEvent {
            item: page("P2"),
            from_parent_id: Some(id("G")),
            to_parent_id: Some(id("G")),
            to_index: 0,
        };
        let moved = apply_move(&roots, &event);
        assert_eq!(
            dumped(&moved),
            r#"S
  G
    P2
    P1
T
  H"#
        );
        // The input is untouched.
        assert_eq!(roots[0].children[0].children[0].id, "P1");
    }

    #[test]
    fn move_across_sections() {
        let roots = sample();
        let event = MoveEvent {
            item: page("P1"),
            from_parent_id: Some(id("G")),
            to_parent_id: Some(id("H")),
            to_index: 5,
        };
        assert_eq!(
            dumped(&apply_move(&roots, &event)),
            r#"S
  G
    P2
T
  H
    P1"#
        );
    }

    #[test]
    fn move_to_root_list() {
        let roots = sample();
        let event = MoveEvent {
            item: page("P1"),
            from_parent_id: Some(id("G")),
            to_parent_id: None,
            to_index: 1,
        };
        assert_eq!(
            dumped(&apply_move(&roots, &event)),
            r#"S
  G
    P2
P1
T
  H"#
        );
    }

    #[test]
    fn stale_events_are_no_ops() {
        let roots = sample();
        let wrong_parent = MoveEvent {
            item: page("P1"),
            from_parent_id: Some(id("H")),
            to_parent_id: None,
            to_index: 0,
        };
        assert!(try_apply_move(&roots, &wrong_parent).is_none());
        assert_eq!(apply_move(&roots, &wrong_parent), roots);

        let missing_destination = MoveEvent {
            item: page("P1"),
            from_parent_id: Some(id("G")),
            to_parent_id: Some(id("gone")),
            to_index: 0,
        };
        assert_eq!(apply_move(&roots, &missing_destination), roots);
    }

    #[test]
    fn moving_into_own_subtree_is_a_no_op() {
        let roots = sample();
        let event = MoveEvent {
            item: roots[0].children[0].clone(),
            from_parent_id: Some(id("S")),
            to_parent_id: Some(id("P1")),
            to_index: 0,
        };
        assert!(try_apply_move(&roots, &event).is_none());
    }

    #[test]
    fn inverse_restores_the_original() {
        let roots = sample();
        let event = MoveEvent {
            item: page("P2"),
            from_parent_id: Some(id("G")),
            to_parent_id: Some(id("T")),
            to_index: 0,
        };
        let moved = apply_move(&roots, &event);
        let restored = apply_move(&moved, &event.inverse(1));
        assert_eq!(restored, roots);
    }

    #[test]
    fn mode_resolution() {
        assert!(ReorderMode::Auto.reorders_internally::<BasicNode>(false));
        assert!(!ReorderMode::Auto.reorders_internally::<BasicNode>(true));
        assert!(!ReorderMode::Controlled.reorders_internally::<BasicNode>(false));
        assert!(ReorderMode::Uncontrolled.reorders_internally::<BasicNode>(true));
    }
}
