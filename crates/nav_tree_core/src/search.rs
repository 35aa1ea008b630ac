use std::collections::HashSet;

use crate::index::TreeIndex;
use crate::node::NavNode;

/// A node together with its current location.
#[derive(Debug)]
pub struct Found<'a, T: NavNode> {
    pub node: &'a T,
    pub parent_id: Option<T::Id>,
    pub index: usize,
}

impl<T: NavNode> Clone for Found<'_, T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node,
            parent_id: self.parent_id.clone(),
            index: self.index,
        }
    }
}

/// Lookups over a forest.
///
/// Served by a [`TreeIndex`] when one is attached, otherwise by cycle-safe walks that yield the
/// same answers.
#[derive(Debug)]
pub struct TreeSearch<'a, T: NavNode> {
    roots: &'a [T],
    index: Option<&'a TreeIndex<T::Id>>,
}

impl<T: NavNode> Clone for TreeSearch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: NavNode> Copy for TreeSearch<'_, T> {}

impl<'a, T: NavNode> TreeSearch<'a, T> {
    /// A search that always walks the tree.
    pub fn new(roots: &'a [T]) -> Self {
        Self { roots, index: None }
    }

    /// A search backed by `index`, which must have been built from `roots`.
    pub fn indexed(roots: &'a [T], index: &'a TreeIndex<T::Id>) -> Self {
        Self {
            roots,
            index: Some(index),
        }
    }

    pub fn roots(&self) -> &'a [T] {
        self.roots
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub fn find_by_id(&self, id: &T::Id) -> Option<Found<'a, T>> {
        match self.index {
            Some(index) => {
                let entry = index.get(id)?;
                let node = index.node(self.roots, id)?;
                Some(Found {
                    node,
                    parent_id: entry.parent_id.clone(),
                    index: entry.position,
                })
            }
            None => walk_find(self.roots, id, None, &mut HashSet::new()),
        }
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Depth of a node, `0` for root-level nodes.
    pub fn depth(&self, id: &T::Id) -> Option<usize> {
        if let Some(index) = self.index {
            return index.get(id).map(|entry| entry.depth);
        }

        let found = self.find_by_id(id)?;
        let mut depth = 0;
        let mut visited = HashSet::from([id.clone()]);
        let mut parent_id = found.parent_id;
        while let Some(id) = parent_id {
            if !visited.insert(id.clone()) {
                break;
            }
            depth += 1;
            parent_id = self.find_by_id(&id).and_then(|found| found.parent_id);
        }
        Some(depth)
    }

    /// Depth of the sibling level under `parent_id`: `0` for the root list, otherwise one deeper
    /// than the parent. Unknown parents are treated as the root list.
    pub fn depth_of(&self, parent_id: Option<&T::Id>) -> usize {
        parent_id
            .and_then(|parent_id| self.depth(parent_id))
            .map_or(0, |depth| depth + 1)
    }

    /// The child list under `parent_id`, or the root list for `None`.
    pub fn children_of(&self, parent_id: Option<&T::Id>) -> Option<&'a [T]> {
        match parent_id {
            None => Some(self.roots),
            Some(parent_id) => self.find_by_id(parent_id).map(|found| found.node.children()),
        }
    }

    /// Whether `target_id` is `ancestor_id` or lies somewhere beneath it.
    pub fn is_descendant_of(&self, target_id: &T::Id, ancestor_id: &T::Id) -> bool {
        if target_id == ancestor_id {
            return true;
        }

        match self.index {
            Some(index) => {
                let mut visited = HashSet::new();
                let mut current = index.get(target_id).and_then(|e| e.parent_id.as_ref());
                while let Some(id) = current {
                    if id == ancestor_id {
                        return true;
                    }
                    if !visited.insert(id) {
                        return false;
                    }
                    current = index.get(id).and_then(|e| e.parent_id.as_ref());
                }
                false
            }
            // Resolve the target from the roots so duplicate ids follow the same first-seen
            // copy the index keeps.
            None => self
                .path_to(target_id)
                .is_some_and(|path| path.contains(ancestor_id)),
        }
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn path_to(&self, id: &T::Id) -> Option<Vec<T::Id>> {
        match self.index {
            Some(index) => {
                let mut path = vec![id.clone()];
                let mut visited = HashSet::from([id.clone()]);
                let mut current = index.get(id)?.parent_id.clone();
                while let Some(parent_id) = current {
                    if !visited.insert(parent_id.clone()) {
                        break;
                    }
                    current = index.get(&parent_id).and_then(|e| e.parent_id.clone());
                    path.push(parent_id);
                }
                path.reverse();
                Some(path)
            }
            None => {
                let mut path = Vec::new();
                walk_path(self.roots, id, &mut path, &mut HashSet::new()).then_some(path)
            }
        }
    }
}

fn walk_find<'a, T: NavNode>(
    nodes: &'a [T],
    id: &T::Id,
    parent_id: Option<&T::Id>,
    visited: &mut HashSet<T::Id>,
) -> Option<Found<'a, T>> {
    for (index, node) in nodes.iter().enumerate() {
        let node_id = node.id();
        if !visited.insert(node_id.clone()) {
            continue;
        }
        if node_id == *id {
            return Some(Found {
                node,
                parent_id: parent_id.cloned(),
                index,
            });
        }
        if let Some(found) = walk_find(node.children(), id, Some(&node_id), visited) {
            return Some(found);
        }
    }
    None
}

fn walk_path<T: NavNode>(
    nodes: &[T],
    id: &T::Id,
    path: &mut Vec<T::Id>,
    visited: &mut HashSet<T::Id>,
) -> bool {
    for node in nodes {
        let node_id = node.id();
        if !visited.insert(node_id.clone()) {
            continue;
        }
        path.push(node_id.clone());
        if node_id == *id || walk_path(node.children(), id, path, visited) {
            return true;
        }
        path.pop();
    }
    false
}
