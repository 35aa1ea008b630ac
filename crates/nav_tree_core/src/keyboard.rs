use std::fmt;

use crate::constraints::DropPosition;
use crate::node::{NavNode, NodeKind as _};
use crate::preview::PreviewInsert;
use crate::search::TreeSearch;

/// One arrow-key step within the current sibling list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyboardStep {
    Up,
    Down,
}

/// Why a keyboard move left the virtual position where it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyboardRefusal {
    AtStart,
    AtEnd,
    /// Already at the root list, there is no level to move out to.
    AtRoot,
    /// The node just above the virtual position is not a container.
    NotAGroup,
    /// The move would break a drop constraint, such as nesting a root container.
    NotAllowed,
}

/// A keyboard drag in progress.
///
/// `siblings_at_current_level` never contains the dragged node itself, and `current_index` is an
/// insertion slot in that list (`0..=len`). Every transition returns a fresh state; the old one is
/// left untouched.
#[derive(Clone, Debug)]
pub struct KeyboardDragState<T: NavNode> {
    pub item: T,
    pub id: T::Id,
    pub original_parent_id: Option<T::Id>,
    pub original_index: usize,
    pub current_parent_id: Option<T::Id>,
    pub current_index: usize,
    pub siblings_at_current_level: Vec<T::Id>,
}

impl<T: NavNode> KeyboardDragState<T> {
    pub fn pick_up(search: &TreeSearch<'_, T>, id: &T::Id) -> Option<Self> {
        let found = search.find_by_id(id)?;
        let siblings = sibling_ids(search, found.parent_id.as_ref(), id)?;
        Some(Self {
            item: found.node.clone(),
            id: id.clone(),
            original_parent_id: found.parent_id.clone(),
            original_index: found.index,
            current_parent_id: found.parent_id,
            current_index: found.index.min(siblings.len()),
            siblings_at_current_level: siblings,
        })
    }

    pub fn insert_position(&self) -> PreviewInsert<T::Id> {
        PreviewInsert {
            parent_id: self.current_parent_id.clone(),
            index: self.current_index,
        }
    }

    /// The virtual position as a drop against a neighbour: before the node that now sits in the
    /// slot, after the last one, or inside an empty parent. `None` for an empty root list.
    pub fn drop_target(&self) -> Option<(T::Id, DropPosition)> {
        let siblings = &self.siblings_at_current_level;
        if let Some(next) = siblings.get(self.current_index) {
            return Some((next.clone(), DropPosition::Before));
        }
        if let Some(last) = siblings.last() {
            return Some((last.clone(), DropPosition::After));
        }
        self.current_parent_id
            .clone()
            .map(|parent_id| (parent_id, DropPosition::Inside))
    }

    /// Whether the virtual position still matches where the node started.
    pub fn is_at_origin(&self) -> bool {
        self.current_parent_id == self.original_parent_id
            && self.current_index == self.original_index
    }

    /// Number of slots at the current level, the dragged node included.
    pub fn level_len(&self) -> usize {
        self.siblings_at_current_level.len() + 1
    }

    pub fn step(&self, step: KeyboardStep) -> Result<Self, KeyboardRefusal> {
        let current_index = match step {
            KeyboardStep::Up => self
                .current_index
                .checked_sub(1)
                .ok_or(KeyboardRefusal::AtStart)?,
            KeyboardStep::Down => {
                if self.current_index >= self.siblings_at_current_level.len() {
                    return Err(KeyboardRefusal::AtEnd);
                }
                self.current_index + 1
            }
        };
        Ok(Self {
            current_index,
            ..self.clone()
        })
    }

    /// Move to the grandparent level, right after the current parent.
    pub fn move_out(&self, search: &TreeSearch<'_, T>) -> Result<Self, KeyboardRefusal> {
        let parent_id = self
            .current_parent_id
            .as_ref()
            .ok_or(KeyboardRefusal::AtRoot)?;
        let parent = search
            .find_by_id(parent_id)
            .ok_or(KeyboardRefusal::AtRoot)?;
        if self.item.kind().is_root_container() && parent.parent_id.is_some() {
            return Err(KeyboardRefusal::NotAllowed);
        }

        let siblings = sibling_ids(search, parent.parent_id.as_ref(), &self.id)
            .ok_or(KeyboardRefusal::AtRoot)?;
        let parent_position = siblings
            .iter()
            .position(|id| id == parent_id)
            .ok_or(KeyboardRefusal::AtRoot)?;

        Ok(Self {
            current_parent_id: parent.parent_id,
            current_index: parent_position + 1,
            siblings_at_current_level: siblings,
            ..self.clone()
        })
    }

    /// Move to the end of the container just above the virtual position.
    pub fn move_in(&self, search: &TreeSearch<'_, T>) -> Result<Self, KeyboardRefusal> {
        let previous_id = self
            .current_index
            .checked_sub(1)
            .and_then(|ix| self.siblings_at_current_level.get(ix))
            .ok_or(KeyboardRefusal::NotAGroup)?;
        let previous = search
            .find_by_id(previous_id)
            .ok_or(KeyboardRefusal::NotAGroup)?;
        if !previous.node.kind().is_container() {
            return Err(KeyboardRefusal::NotAGroup);
        }
        if self.item.kind().is_root_container() || search.is_descendant_of(previous_id, &self.id) {
            return Err(KeyboardRefusal::NotAllowed);
        }

        let siblings = sibling_ids(search, Some(previous_id), &self.id)
            .ok_or(KeyboardRefusal::NotAGroup)?;
        Ok(Self {
            current_parent_id: Some(previous_id.clone()),
            current_index: siblings.len(),
            siblings_at_current_level: siblings,
            ..self.clone()
        })
    }
}

fn sibling_ids<T: NavNode>(
    search: &TreeSearch<'_, T>,
    parent_id: Option<&T::Id>,
    dragged_id: &T::Id,
) -> Option<Vec<T::Id>> {
    let children = search.children_of(parent_id)?;
    Some(
        children
            .iter()
            .map(NavNode::id)
            .filter(|id| id != dragged_id)
            .collect(),
    )
}

/// Something worth telling a screen reader about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Announcement<Id> {
    PickedUp {
        id: Id,
        position: usize,
        count: usize,
    },
    Moved {
        id: Id,
        parent_id: Option<Id>,
        position: usize,
        count: usize,
    },
    Refused {
        id: Id,
        reason: KeyboardRefusal,
    },
    Dropped {
        id: Id,
    },
    Cancelled {
        id: Id,
    },
}

impl<Id: fmt::Debug> fmt::Display for Announcement<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PickedUp {
                id,
                position,
                count,
            } => write!(f, "Picked up {id:?}, position {position} of {count}"),
            Self::Moved {
                id,
                parent_id: Some(parent_id),
                position,
                count,
            } => write!(f, "{id:?} moved to position {position} of {count} in {parent_id:?}"),
            Self::Moved {
                id,
                parent_id: None,
                position,
                count,
            } => write!(f, "{id:?} moved to position {position} of {count} at the top level"),
            Self::Refused { id, reason } => match reason {
                KeyboardRefusal::AtStart => write!(f, "{id:?} is already first"),
                KeyboardRefusal::AtEnd => write!(f, "{id:?} is already last"),
                KeyboardRefusal::AtRoot => write!(f, "{id:?} is already at the top level"),
                KeyboardRefusal::NotAGroup => write!(f, "The item above {id:?} is not a group"),
                KeyboardRefusal::NotAllowed => write!(f, "{id:?} cannot be moved there"),
            },
            Self::Dropped { id } => write!(f, "Dropped {id:?}"),
            Self::Cancelled { id } => write!(f, "Move of {id:?} cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::BasicNode;

    fn id(s: &str) -> String {
        s.to_string()
    }

    fn sample() -> Vec<BasicNode> {
        vec![BasicNode::section("S").with_children([
            BasicNode::page("intro"),
            BasicNode::group("G").with_children([BasicNode::page("P1"), BasicNode::page("P2")]),
            BasicNode::page("P3"),
        ])]
    }

    #[test]
    fn steps_clamp_at_both_ends() {
        let roots = sample();
        let search = TreeSearch::new(&roots);
        let state = KeyboardDragState::pick_up(&search, &id("P1")).unwrap();
        assert_eq!(state.siblings_at_current_level, [id("P2")]);
        assert_eq!(state.current_index, 0);

        assert_eq!(state.step(KeyboardStep::Up).unwrap_err(), KeyboardRefusal::AtStart);
        let down = state.step(KeyboardStep::Down).unwrap();
        assert_eq!(down.current_index, 1);
        assert_eq!(state.current_index, 0, "transitions do not touch the old state");
        assert_eq!(down.step(KeyboardStep::Down).unwrap_err(), KeyboardRefusal::AtEnd);
    }

    #[test]
    fn virtual_position_reads_as_a_drop() {
        let roots = sample();
        let search = TreeSearch::new(&roots);
        let state = KeyboardDragState::pick_up(&search, &id("P1")).unwrap();
        assert_eq!(state.drop_target(), Some((id("P2"), DropPosition::Before)));
        let down = state.step(KeyboardStep::Down).unwrap();
        assert_eq!(down.drop_target(), Some((id("P2"), DropPosition::After)));

        let lone = vec![BasicNode::section("S").child(BasicNode::page("only"))];
        let search = TreeSearch::new(&lone);
        let state = KeyboardDragState::pick_up(&search, &id("only")).unwrap();
        assert_eq!(state.drop_target(), Some((id("S"), DropPosition::Inside)));
        let state = KeyboardDragState::pick_up(&search, &id("S")).unwrap();
        assert_eq!(state.drop_target(), None);
    }

    #[test]
    fn move_out_lands_after_the_old_parent() {
        let roots = sample();
        let search = TreeSearch::new(&roots);
        let state = KeyboardDragState::pick_up(&search, &id("P2")).unwrap();
        let out = state.move_out(&search).unwrap();
        assert_eq!(out.current_parent_id.as_deref(), Some("S"));
        assert_eq!(out.current_index, 2);
        assert_eq!(out.siblings_at_current_level, [id("intro"), id("G"), id("P3")]);

        let root = out.move_out(&search).unwrap();
        assert_eq!(root.current_parent_id, None);
        assert_eq!(root.current_index, 1);
        assert_eq!(root.move_out(&search).unwrap_err(), KeyboardRefusal::AtRoot);
    }

    #[test]
    fn move_in_needs_a_group_above() {
        let roots = sample();
        let search = TreeSearch::new(&roots);

        let p1 = KeyboardDragState::pick_up(&search, &id("P1")).unwrap();
        assert_eq!(p1.move_in(&search).unwrap_err(), KeyboardRefusal::NotAGroup);
        let below_p2 = p1.step(KeyboardStep::Down).unwrap();
        assert_eq!(below_p2.move_in(&search).unwrap_err(), KeyboardRefusal::NotAGroup);

        let p3 = KeyboardDragState::pick_up(&search, &id("P3")).unwrap();
        let inside = p3.move_in(&search).unwrap();
        assert_eq!(inside.current_parent_id.as_deref(), Some("G"));
        assert_eq!(inside.current_index, 2);
        assert_eq!(inside.level_len(), 3);
    }

    #[test]
    fn sections_stay_at_the_root() {
        let roots = vec![
            BasicNode::section("A").child(BasicNode::page("a")),
            BasicNode::section("B"),
        ];
        let search = TreeSearch::new(&roots);
        let b = KeyboardDragState::pick_up(&search, &id("B")).unwrap();
        assert_eq!(b.move_in(&search).unwrap_err(), KeyboardRefusal::NotAllowed);
        assert_eq!(b.move_out(&search).unwrap_err(), KeyboardRefusal::AtRoot);
        assert_eq!(b.step(KeyboardStep::Up).unwrap().current_index, 0);
    }

    #[test]
    fn announcements_read_naturally() {
        let moved = Announcement::Moved {
            id: "P1",
            parent_id: Some("G"),
            position: 2,
            count: 3,
        };
        assert_eq!(moved.to_string(), r#""P1" moved to position 2 of 3 in "G""#);
        let refused = Announcement::Refused {
            id: "P1",
            reason: KeyboardRefusal::NotAGroup,
        };
        assert_eq!(refused.to_string(), r#"The item above "P1" is not a group"#);
    }
}
