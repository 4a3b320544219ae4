use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::{KeySpec, Record};

/// A predicate selecting which leaf records a projection keeps.
pub type Filter<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Configuration for one grouping level.
pub struct GroupDescriptor<R> {
    /// Extracts the group key from a member record.
    pub iterator: KeySpec<R>,
    /// Orders group nodes, evaluated on each group's first-seen member.
    ///
    /// When `None`, groups keep first-seen order.
    pub comparator: Option<KeySpec<R>>,
    /// Produces the group's display value from its first-seen member.
    ///
    /// When `None`, the group key is displayed.
    pub model_factory: Option<KeySpec<R>>,
    /// Attributes whose change on a member triggers re-grouping.
    ///
    /// When `None` and every configured spec is an attribute name, the set is derived from those
    /// names. Otherwise every change triggers re-grouping.
    pub affected_attributes: Option<Vec<String>>,
}

impl<R> Clone for GroupDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            iterator: self.iterator.clone(),
            comparator: self.comparator.clone(),
            model_factory: self.model_factory.clone(),
            affected_attributes: self.affected_attributes.clone(),
        }
    }
}

impl<R> fmt::Debug for GroupDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupDescriptor")
            .field("iterator", &self.iterator)
            .field("comparator", &self.comparator)
            .field("model_factory", &self.model_factory)
            .field("affected_attributes", &self.affected_attributes)
            .finish()
    }
}

impl<R: Record + 'static> GroupDescriptor<R> {
    pub fn new(iterator: impl Into<KeySpec<R>>) -> Self {
        Self {
            iterator: iterator.into(),
            comparator: None,
            model_factory: None,
            affected_attributes: None,
        }
    }

    /// Groups by an attribute: the attribute is the key, the display value and the group order.
    pub fn by_attribute(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(KeySpec::Attribute(name.clone())).with_comparator(KeySpec::Attribute(name))
    }

    pub fn with_comparator(mut self, comparator: impl Into<KeySpec<R>>) -> Self {
        self.comparator = Some(comparator.into());
        self
    }

    pub fn with_model_factory(mut self, model_factory: impl Into<KeySpec<R>>) -> Self {
        self.model_factory = Some(model_factory.into());
        self
    }

    pub fn with_affected_attributes<S: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.affected_attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// The attributes whose change triggers re-grouping, or `None` for "any change".
    pub fn resolved_affected_attributes(&self) -> Option<Vec<String>> {
        if let Some(explicit) = &self.affected_attributes {
            return Some(explicit.clone());
        }
        let mut names = Vec::new();
        let specs = [
            Some(&self.iterator),
            self.comparator.as_ref(),
            self.model_factory.as_ref(),
        ];
        for spec in specs.into_iter().flatten() {
            let name = spec.attribute_name()?;
            if !names.iter().any(|n: &String| n == name) {
                names.push(String::from(name));
            }
        }
        Some(names)
    }
}

/// Configuration for [`crate::VirtualCollection`].
///
/// Cheap to clone: closures are stored in `Arc`s.
pub struct VirtualCollectionOptions<R> {
    /// Grouping levels, outermost first.
    pub grouping: Vec<GroupDescriptor<R>>,
    /// Leaf order within the innermost group (or the whole projection when ungrouped).
    ///
    /// When `None`, leaves keep source order.
    pub comparator: Option<KeySpec<R>>,
    pub filter: Option<Filter<R>>,
}

impl<R> Clone for VirtualCollectionOptions<R> {
    fn clone(&self) -> Self {
        Self {
            grouping: self.grouping.clone(),
            comparator: self.comparator.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<R> Default for VirtualCollectionOptions<R> {
    fn default() -> Self {
        Self {
            grouping: Vec::new(),
            comparator: None,
            filter: None,
        }
    }
}

impl<R> fmt::Debug for VirtualCollectionOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualCollectionOptions")
            .field("grouping", &self.grouping)
            .field("comparator", &self.comparator)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl<R: Record + 'static> VirtualCollectionOptions<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grouping(mut self, grouping: impl IntoIterator<Item = GroupDescriptor<R>>) -> Self {
        self.grouping = grouping.into_iter().collect();
        self
    }

    pub fn with_group(mut self, descriptor: GroupDescriptor<R>) -> Self {
        self.grouping.push(descriptor);
        self
    }

    pub fn with_comparator(mut self, comparator: impl Into<KeySpec<R>>) -> Self {
        self.comparator = Some(comparator.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn is_grouped(&self) -> bool {
        !self.grouping.is_empty()
    }
}
