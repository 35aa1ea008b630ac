use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// What the engine needs to know about a node kind.
pub trait NodeKind: Copy + Eq + Debug {
    /// Whether nodes of this kind may hold children.
    fn is_container(self) -> bool;

    /// Whether nodes of this kind are pinned to the root level.
    ///
    /// Root containers can be reordered among themselves but never become a child of anything.
    fn is_root_container(self) -> bool;
}

/// The stock sections → groups → pages kind set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavKind {
    Section,
    Group,
    Page,
}

impl NodeKind for NavKind {
    fn is_container(self) -> bool {
        matches!(self, Self::Section | Self::Group)
    }

    fn is_root_container(self) -> bool {
        matches!(self, Self::Section)
    }
}

/// Accessors the engine uses to read (and, for internal reordering, rebuild) a caller-owned tree.
///
/// Nothing else about the node shape is assumed: ids must be stable and unique, `children`
/// returns the ordered child list (empty for leaves), and `set_children` returns a copy of the
/// node with its child list replaced.
pub trait NavNode: Clone {
    type Id: Clone + Eq + Hash + Debug;
    type Kind: NodeKind;

    /// Whether `set_children` is supported. `ReorderMode::Auto` only reorders internally when
    /// this is `true`.
    const CAN_SET_CHILDREN: bool = false;

    fn id(&self) -> Self::Id;

    fn kind(&self) -> Self::Kind;

    fn children(&self) -> &[Self];

    fn set_children(&self, children: Vec<Self>) -> Option<Self> {
        let _ = children;
        None
    }
}

/// A plain owned node, handy for headless use and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicNode {
    pub id: String,
    pub kind: NavKind,
    pub children: Vec<BasicNode>,
}

impl BasicNode {
    pub fn new(id: impl Into<String>, kind: NavKind) -> Self {
        Self {
            id: id.into(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn section(id: impl Into<String>) -> Self {
        Self::new(id, NavKind::Section)
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self::new(id, NavKind::Group)
    }

    pub fn page(id: impl Into<String>) -> Self {
        Self::new(id, NavKind::Page)
    }

    pub fn child(mut self, child: BasicNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = BasicNode>) -> Self {
        self.children.extend(children);
        self
    }
}

impl NavNode for BasicNode {
    type Id = String;
    type Kind = NavKind;

    const CAN_SET_CHILDREN: bool = true;

    fn id(&self) -> String {
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
            id: self.id.clone(),
            kind: self.kind,
            children,
        })
    }
}
