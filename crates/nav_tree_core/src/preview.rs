use std::collections::HashSet;

use crate::constraints::{DropPosition, destination_parent};
use crate::node::{NavNode, NodeKind as _};
use crate::search::TreeSearch;

/// Snapshot of the node being dragged, taken when the session starts.
#[derive(Clone, Debug)]
pub struct DraggedItem<T: NavNode> {
    pub id: T::Id,
    pub node: T,
    pub origin_parent_id: Option<T::Id>,
    pub origin_index: usize,
}

impl<T: NavNode> DraggedItem<T> {
    pub fn capture(search: &TreeSearch<'_, T>, id: &T::Id) -> Option<Self> {
        let found = search.find_by_id(id)?;
        Some(Self {
            id: id.clone(),
            node: found.node.clone(),
            origin_parent_id: found.parent_id,
            origin_index: found.index,
        })
    }
}

/// Where the dragged node would land if the drag were committed now.
///
/// `index` addresses the destination sibling list with the dragged node already removed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreviewInsert<Id> {
    pub parent_id: Option<Id>,
    pub index: usize,
}

pub fn compute_insert_position<T: NavNode>(
    search: &TreeSearch<'_, T>,
    dragged: &DraggedItem<T>,
    target_id: &T::Id,
    position: DropPosition,
) -> Option<PreviewInsert<T::Id>> {
    let target = search.find_by_id(target_id)?;
    let target_kind = target.node.kind();
    let parent_id = destination_parent(
        dragged.node.kind(),
        target_id,
        target_kind,
        target.parent_id.as_ref(),
        position,
    )?;

    if dragged.node.kind().is_root_container() && parent_id.is_some() {
        return None;
    }

    let index = match position {
        DropPosition::Inside => 0,
        DropPosition::Before => target.index,
        DropPosition::After => target.index + 1,
    };
    let mut insert = PreviewInsert { parent_id, index };

    // The dragged node's own removal shifts everything after it one slot left.
    if let Some(current) = search.find_by_id(&dragged.id)
        && current.parent_id == insert.parent_id
        && current.index < insert.index
    {
        insert.index -= 1;
    }

    Some(insert)
}

/// Whether `id` is the dragged node and the preview would actually move it.
pub fn is_preview_item<T: NavNode>(
    search: &TreeSearch<'_, T>,
    dragged: &DraggedItem<T>,
    preview: &PreviewInsert<T::Id>,
    id: &T::Id,
) -> bool {
    if dragged.id != *id {
        return false;
    }
    match search.find_by_id(id) {
        Some(current) => current.parent_id != preview.parent_id || current.index != preview.index,
        None => true,
    }
}

/// The sibling list under `parent_id` as it should be rendered during the drag.
///
/// The dragged node is dropped from whichever level currently holds it and inserted at the
/// level the preview points at; other levels pass through untouched.
pub fn items_with_preview<'a, T: NavNode>(
    siblings: &'a [T],
    parent_id: Option<&T::Id>,
    dragged: &'a DraggedItem<T>,
    preview: Option<&PreviewInsert<T::Id>>,
) -> Vec<&'a T> {
    let Some(preview) = preview else {
        return siblings.iter().collect();
    };

    let mut items: Vec<&T> = siblings
        .iter()
        .filter(|node| node.id() != dragged.id)
        .collect();
    if preview.parent_id.as_ref() == parent_id {
        let index = preview.index.min(items.len());
        items.insert(index, &dragged.node);
    }
    items
}

/// The whole forest with the preview move applied, for node shapes that support
/// [`NavNode::set_children`]. Nodes that refuse keep their original children.
pub fn materialize<T: NavNode>(
    roots: &[T],
    dragged: &DraggedItem<T>,
    preview: Option<&PreviewInsert<T::Id>>,
) -> Vec<T> {
    fn level<T: NavNode>(
        nodes: &[T],
        parent_id: Option<&T::Id>,
        dragged: &DraggedItem<T>,
        preview: Option<&PreviewInsert<T::Id>>,
        visited: &mut HashSet<T::Id>,
    ) -> Vec<T> {
        items_with_preview(nodes, parent_id, dragged, preview)
            .into_iter()
            .map(|node| {
                let id = node.id();
                if !visited.insert(id.clone()) {
                    return node.clone();
                }
                let children = level(node.children(), Some(&id), dragged, preview, visited);
                node.set_children(children).unwrap_or_else(|| node.clone())
            })
            .collect()
    }

    level(roots, None, dragged, preview, &mut HashSet::new())
}
