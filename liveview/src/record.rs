use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::Value;
use crate::key::IdentityKey;

/// A source record: a stable identity, named attributes and (in tree mode) ordered children.
///
/// Records are owned by the caller and shared with projections through `Arc`. Projections never
/// mutate them; an attribute change is expressed by replacing the record and forwarding a
/// [`crate::SourceEvent::Change`].
///
/// Children form an owned forest. A record whose id reappears among its own descendants is
/// rejected with [`crate::ConfigError::CyclicRecord`].
pub trait Record {
    type Id: IdentityKey + Clone + fmt::Debug;

    fn id(&self) -> Self::Id;

    /// Returns the named attribute, or `None` when the record does not define it.
    fn attribute(&self, name: &str) -> Option<&Value>;

    fn children(&self) -> &[Arc<Self>]
    where
        Self: Sized,
    {
        &[]
    }
}

/// A general-purpose [`Record`] backed by an attribute map.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    id: u64,
    attributes: BTreeMap<String, Value>,
    children: Vec<Arc<Model>>,
}

impl Model {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Model>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    /// Sets an attribute and returns the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn children_mut(&mut self) -> &mut Vec<Arc<Model>> {
        &mut self.children
    }
}

impl Record for Model {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }

    fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    fn children(&self) -> &[Arc<Self>] {
        &self.children
    }
}
