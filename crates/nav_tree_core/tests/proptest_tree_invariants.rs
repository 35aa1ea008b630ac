//! Property tests over randomly shaped navigation trees.

use std::collections::HashMap;

use nav_tree_core::{
    BasicNode, DraggedItem, DropPosition, Forest, MoveEvent, NavKind, NavNode, TreeSearch,
    compute_insert_position, is_valid_drop_in, items_with_preview, try_apply_move,
};
use proptest::prelude::*;

const POSITIONS: [DropPosition; 3] = [
    DropPosition::Before,
    DropPosition::After,
    DropPosition::Inside,
];

fn kind_strategy() -> impl Strategy<Value = NavKind> {
    prop_oneof![
        Just(NavKind::Section),
        Just(NavKind::Group),
        Just(NavKind::Page),
    ]
}

/// Each entry picks a parent among the earlier nodes. Picks that land on a page, or sections
/// that would end up nested, fall back to something legal.
fn forest_strategy() -> impl Strategy<Value = Vec<BasicNode>> {
    prop::collection::vec((any::<usize>(), kind_strategy()), 1..24).prop_map(|specs| build(&specs))
}

fn build(specs: &[(usize, NavKind)]) -> Vec<BasicNode> {
    let mut parents: Vec<Option<usize>> = Vec::with_capacity(specs.len());
    let mut kinds: Vec<NavKind> = Vec::with_capacity(specs.len());
    for (ix, (choice, kind)) in specs.iter().enumerate() {
        let pick = choice % (ix + 1);
        let parent = (pick < ix && kinds[pick] != NavKind::Page).then_some(pick);
        let kind = match (kind, parent) {
            (NavKind::Section, Some(_)) => NavKind::Group,
            (kind, _) => *kind,
        };
        parents.push(parent);
        kinds.push(kind);
    }

    fn assemble(ix: usize, parents: &[Option<usize>], kinds: &[NavKind]) -> BasicNode {
        let children = (0..parents.len())
            .filter(|child| parents[*child] == Some(ix))
            .map(|child| assemble(child, parents, kinds));
        BasicNode::new(format!("n{ix}"), kinds[ix]).with_children(children)
    }

    (0..specs.len())
        .filter(|ix| parents[*ix].is_none())
        .map(|ix| assemble(ix, &parents, &kinds))
        .collect()
}

fn all_ids(nodes: &[BasicNode], out: &mut Vec<String>) {
    for node in nodes {
        out.push(node.id.clone());
        all_ids(&node.children, out);
    }
}

/// Child id lists keyed by parent, with `None` for the root list.
fn levels(nodes: &[BasicNode]) -> HashMap<Option<String>, Vec<String>> {
    fn visit(
        nodes: &[BasicNode],
        parent: Option<String>,
        out: &mut HashMap<Option<String>, Vec<String>>,
    ) {
        out.insert(parent, nodes.iter().map(|node| node.id.clone()).collect());
        for node in nodes {
            visit(&node.children, Some(node.id.clone()), out);
        }
    }
    let mut out = HashMap::new();
    visit(nodes, None, &mut out);
    out
}

fn pick<'a>(ids: &'a [String], seed: usize) -> &'a String {
    &ids[seed % ids.len()]
}

proptest! {
    #[test]
    fn indexed_and_walked_lookups_agree(roots in forest_strategy()) {
        let forest = Forest::new(roots.clone());
        let indexed = forest.search();
        let walked = TreeSearch::new(&roots);

        let mut ids = Vec::new();
        all_ids(&roots, &mut ids);
        for id in &ids {
            let a = indexed.find_by_id(id).unwrap();
            let b = walked.find_by_id(id).unwrap();
            prop_assert_eq!(&a.node.id, &b.node.id);
            prop_assert_eq!(&a.parent_id, &b.parent_id);
            prop_assert_eq!(a.index, b.index);
            prop_assert_eq!(indexed.depth(id), walked.depth(id));
        }
        prop_assert_eq!(forest.index().len(), ids.len());
    }

    #[test]
    fn descendant_checks_follow_the_path(roots in forest_strategy()) {
        let forest = Forest::new(roots.clone());
        let indexed = forest.search();
        let walked = TreeSearch::new(&roots);

        let mut ids = Vec::new();
        all_ids(&roots, &mut ids);
        for item in &ids {
            let path = indexed.path_to(item).unwrap();
            let walked_path = walked.path_to(item);
            prop_assert_eq!(Some(&path), walked_path.as_ref());
            for ancestor in &ids {
                let expected = path.contains(ancestor);
                prop_assert_eq!(indexed.is_descendant_of(item, ancestor), expected);
                prop_assert_eq!(walked.is_descendant_of(item, ancestor), expected);
            }
        }
    }

    #[test]
    fn drops_onto_self_or_descendants_are_rejected(roots in forest_strategy()) {
        let search = TreeSearch::new(&roots);
        let mut ids = Vec::new();
        all_ids(&roots, &mut ids);
        for dragged in &ids {
            let kind = search.find_by_id(dragged).unwrap().node.kind;
            for target in &ids {
                if !search.is_descendant_of(target, dragged) {
                    continue;
                }
                for position in POSITIONS {
                    prop_assert!(!is_valid_drop_in(&search, dragged, kind, target, position));
                }
            }
        }
    }

    #[test]
    fn dropping_next_to_itself_keeps_the_index(roots in forest_strategy(), seed in any::<usize>()) {
        let search = TreeSearch::new(&roots);
        let mut ids = Vec::new();
        all_ids(&roots, &mut ids);
        let id = pick(&ids, seed);
        let dragged = DraggedItem::capture(&search, id).unwrap();

        for position in [DropPosition::Before, DropPosition::After] {
            let insert = compute_insert_position(&search, &dragged, id, position).unwrap();
            prop_assert_eq!(&insert.parent_id, &dragged.origin_parent_id);
            prop_assert_eq!(insert.index, dragged.origin_index);
        }
    }

    #[test]
    fn preview_shows_the_dragged_node_exactly_once(
        roots in forest_strategy(),
        dragged_seed in any::<usize>(),
        target_seed in any::<usize>(),
        position_seed in 0usize..3,
    ) {
        let search = TreeSearch::new(&roots);
        let mut ids = Vec::new();
        all_ids(&roots, &mut ids);
        let dragged_id = pick(&ids, dragged_seed);
        let target_id = pick(&ids, target_seed);
        let position = POSITIONS[position_seed];

        let dragged = DraggedItem::capture(&search, dragged_id).unwrap();
        prop_assume!(is_valid_drop_in(&search, dragged_id, dragged.node.kind, target_id, position));
        let preview = compute_insert_position(&search, &dragged, target_id, position);
        prop_assume!(preview.is_some());

        let mut seen = 0;
        for (parent, _) in levels(&roots) {
            let siblings = search.children_of(parent.as_ref()).unwrap();
            let shown = items_with_preview(siblings, parent.as_ref(), &dragged, preview.as_ref());
            seen += shown.iter().filter(|node| node.id() == *dragged_id).count();
        }
        prop_assert_eq!(seen, 1);
    }

    #[test]
    fn a_move_and_its_inverse_cancel_out(
        roots in forest_strategy(),
        dragged_seed in any::<usize>(),
        target_seed in any::<usize>(),
        position_seed in 0usize..3,
    ) {
        let search = TreeSearch::new(&roots);
        let mut ids = Vec::new();
        all_ids(&roots, &mut ids);
        let dragged_id = pick(&ids, dragged_seed);
        let target_id = pick(&ids, target_seed);
        let position = POSITIONS[position_seed];

        let dragged = DraggedItem::capture(&search, dragged_id).unwrap();
        prop_assume!(is_valid_drop_in(&search, dragged_id, dragged.node.kind, target_id, position));
        let Some(insert) = compute_insert_position(&search, &dragged, target_id, position) else {
            return Ok(());
        };

        let event = MoveEvent {
            item: dragged.node.clone(),
            from_parent_id: dragged.origin_parent_id.clone(),
            to_parent_id: insert.parent_id,
            to_index: insert.index,
        };
        let moved = try_apply_move(&roots, &event).unwrap();
        let mut moved_ids = Vec::new();
        all_ids(&moved, &mut moved_ids);
        prop_assert_eq!(moved_ids.len(), ids.len());

        let restored = try_apply_move(&moved, &event.inverse(dragged.origin_index)).unwrap();
        prop_assert_eq!(levels(&restored), levels(&roots));
    }
}
