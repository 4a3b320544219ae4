use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::{Record, Value};

/// Stable identity of a synthetic group.
///
/// Derived from the tree scope (the nearest enclosing source record, `None` at the root) and the
/// key path from the outermost grouping level down to the group. Rebuilding the projection from
/// the same data yields the same ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId<Id> {
    scope: Option<Id>,
    path: Vec<Value>,
}

impl<Id> GroupId<Id> {
    pub fn new(scope: Option<Id>, path: Vec<Value>) -> Self {
        debug_assert!(!path.is_empty(), "GroupId requires at least one key");
        Self { scope, path }
    }

    pub fn scope(&self) -> Option<&Id> {
        self.scope.as_ref()
    }

    pub fn path(&self) -> &[Value] {
        &self.path
    }

    /// Grouping level of the group (0 = outermost).
    pub fn level(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn key(&self) -> &Value {
        self.path.last().unwrap_or(&crate::value::NULL)
    }

    pub(crate) fn child(&self, key: Value) -> Self
    where
        Id: Clone,
    {
        let mut path = self.path.clone();
        path.push(key);
        Self {
            scope: self.scope.clone(),
            path,
        }
    }
}

/// A synthetic node representing one group at one grouping level.
///
/// Membership is not stored on the node; query it with [`crate::VirtualCollection::members`].
#[derive(Clone, Debug, PartialEq)]
pub struct GroupNode<Id> {
    id: GroupId<Id>,
    display: Value,
}

impl<Id> GroupNode<Id> {
    pub(crate) fn new(id: GroupId<Id>, display: Value) -> Self {
        Self { id, display }
    }

    pub fn id(&self) -> &GroupId<Id> {
        &self.id
    }

    pub fn level(&self) -> usize {
        self.id.level()
    }

    pub fn key(&self) -> &Value {
        self.id.key()
    }

    /// The value produced by the level's model factory (the key when none is configured).
    pub fn display(&self) -> &Value {
        &self.display
    }

    /// Display text of the group.
    pub fn label(&self) -> String {
        self.display.to_string()
    }
}

/// The payload of a projection entry.
pub enum Node<R: Record> {
    Leaf(Arc<R>),
    Group(Arc<GroupNode<R::Id>>),
}

impl<R: Record> Clone for Node<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(r) => Self::Leaf(Arc::clone(r)),
            Self::Group(g) => Self::Group(Arc::clone(g)),
        }
    }
}

impl<R: Record> fmt::Debug for Node<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(r) => f.debug_tuple("Leaf").field(&r.id()).finish(),
            Self::Group(g) => f.debug_tuple("Group").field(g.id()).finish(),
        }
    }
}

/// Identity of a projection entry: a source record id or a group id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryId<Id> {
    Record(Id),
    Group(GroupId<Id>),
}

/// A direct member of a group: a leaf record or a nested group.
pub type Member<Id> = EntryId<Id>;

/// One position of a projection: a leaf record or a group node, with its nesting depth.
///
/// Entries compare by identity and depth, not by record contents.
pub struct Entry<R: Record> {
    pub node: Node<R>,
    /// Nesting level, 0 = top.
    pub depth: usize,
}

impl<R: Record> Entry<R> {
    pub(crate) fn leaf(record: Arc<R>, depth: usize) -> Self {
        Self {
            node: Node::Leaf(record),
            depth,
        }
    }

    pub(crate) fn group(node: Arc<GroupNode<R::Id>>, depth: usize) -> Self {
        Self {
            node: Node::Group(node),
            depth,
        }
    }

    pub fn id(&self) -> EntryId<R::Id> {
        match &self.node {
            Node::Leaf(r) => EntryId::Record(r.id()),
            Node::Group(g) => EntryId::Group(g.id().clone()),
        }
    }

    pub fn record(&self) -> Option<&Arc<R>> {
        match &self.node {
            Node::Leaf(r) => Some(r),
            Node::Group(_) => None,
        }
    }

    pub fn group_node(&self) -> Option<&Arc<GroupNode<R::Id>>> {
        match &self.node {
            Node::Leaf(_) => None,
            Node::Group(g) => Some(g),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.node, Node::Group(_))
    }
}

impl<R: Record> Clone for Entry<R> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            depth: self.depth,
        }
    }
}

impl<R: Record> PartialEq for Entry<R> {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth
            && match (&self.node, &other.node) {
                (Node::Leaf(a), Node::Leaf(b)) => a.id() == b.id(),
                (Node::Group(a), Node::Group(b)) => a.id() == b.id(),
                _ => false,
            }
    }
}

impl<R: Record> fmt::Debug for Entry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("node", &self.node)
            .field("depth", &self.depth)
            .finish()
    }
}
