use std::cell::OnceCell;
use std::collections::HashMap;
use std::hash::Hash;

use crate::node::NavNode;
use crate::search::TreeSearch;

/// Where a node sits in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeIndexEntry<Id> {
    pub parent_id: Option<Id>,
    /// `0` for root-level nodes.
    pub depth: usize,
    pub position: usize,
    path: Vec<usize>,
}

impl<Id> TreeIndexEntry<Id> {
    /// Child offsets from the root list down to this node.
    pub fn path(&self) -> &[usize] {
        &self.path
    }
}

/// Flat id → location map over a forest, built in one depth-first pass.
///
/// Duplicate ids (and anything reachable only through a duplicate) are skipped: the first
/// occurrence in pre-order wins and is never overwritten.
#[derive(Clone, Debug)]
pub struct TreeIndex<Id> {
    entries: HashMap<Id, TreeIndexEntry<Id>>,
    order: Vec<Id>,
}

impl<Id: Clone + Eq + Hash> TreeIndex<Id> {
    pub fn build<T: NavNode<Id = Id>>(roots: &[T]) -> Self {
        let mut index = Self {
            entries: HashMap::new(),
            order: Vec::new(),
        };
        let mut path = Vec::new();
        index.visit(roots, None, 0, &mut path);
        index
    }

    fn visit<T: NavNode<Id = Id>>(
        &mut self,
        nodes: &[T],
        parent_id: Option<&Id>,
        depth: usize,
        path: &mut Vec<usize>,
    ) {
        for (position, node) in nodes.iter().enumerate() {
            let id = node.id();
            // `entries` doubles as the visited set.
            if self.entries.contains_key(&id) {
                continue;
            }

            path.push(position);
            self.entries.insert(
                id.clone(),
                TreeIndexEntry {
                    parent_id: parent_id.cloned(),
                    depth,
                    position,
                    path: path.clone(),
                },
            );
            self.order.push(id.clone());
            self.visit(node.children(), Some(&id), depth + 1, path);
            path.pop();
        }
    }

    pub fn get(&self, id: &Id) -> Option<&TreeIndexEntry<Id>> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Indexed ids in depth-first pre-order.
    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.order.iter()
    }

    /// Resolve an indexed id back to its node.
    ///
    /// Returns `None` when `roots` is not the forest this index was built from.
    pub fn node<'a, T: NavNode<Id = Id>>(&self, roots: &'a [T], id: &Id) -> Option<&'a T> {
        let entry = self.entries.get(id)?;
        let (&first, rest) = entry.path.split_first()?;
        let mut node = roots.get(first)?;
        for &offset in rest {
            node = node.children().get(offset)?;
        }
        (node.id() == *id).then_some(node)
    }
}

/// Caller-owned roots plus a lazily built index for the current data version.
///
/// Any structural change goes through [`Forest::set_roots`], which drops the index. Mutating
/// nodes behind interior mutability requires an explicit [`Forest::invalidate`].
#[derive(Clone, Debug)]
pub struct Forest<T: NavNode> {
    roots: Vec<T>,
    index: OnceCell<TreeIndex<T::Id>>,
}

impl<T: NavNode> Default for Forest<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: NavNode> Forest<T> {
    pub fn new(roots: impl Into<Vec<T>>) -> Self {
        Self {
            roots: roots.into(),
            index: OnceCell::new(),
        }
    }

    pub fn roots(&self) -> &[T] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<T> {
        self.roots
    }

    pub fn set_roots(&mut self, roots: impl Into<Vec<T>>) {
        self.roots = roots.into();
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.index = OnceCell::new();
    }

    pub fn is_indexed(&self) -> bool {
        self.index.get().is_some()
    }

    pub fn index(&self) -> &TreeIndex<T::Id> {
        self.index.get_or_init(|| TreeIndex::build(&self.roots))
    }

    /// An index-backed search over the current roots.
    pub fn search(&self) -> TreeSearch<'_, T> {
        TreeSearch::indexed(&self.roots, self.index())
    }
}
