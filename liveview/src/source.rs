use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use crate::key::IdMap;
use crate::{Change, Collection, Record};

/// Read access to a source collection: its records in current order and lookup by id.
///
/// Subscriptions are explicit: whoever mutates the source forwards the matching
/// [`SourceEvent`] to the projections built on it, after the mutation is applied.
pub trait Source {
    type Record: Record;

    /// Top-level records in current order.
    fn records(&self) -> &[Arc<Self::Record>];

    /// Finds a record by id, at any depth of the tree.
    fn find(&self, id: &<Self::Record as Record>::Id) -> Option<&Arc<Self::Record>>;
}

/// A mutation notification from a source collection.
pub enum SourceEvent<R> {
    /// `record` was inserted at top-level `index`.
    Insert { record: Arc<R>, index: usize },
    /// `record` was removed from top-level `index`.
    Remove { record: Arc<R>, index: usize },
    /// `record` replaced the record with the same id; `changed` names the attributes that
    /// changed (empty = unknown, treated as "anything may have changed").
    Change { record: Arc<R>, changed: Vec<String> },
    /// The source was reordered in place.
    Sort,
    /// The source contents were replaced wholesale.
    Reset,
}

impl<R> SourceEvent<R> {
    /// The structural change this event represents for a plain ordered view of the source.
    ///
    /// Attribute changes do not move records, so they map to `None`.
    pub fn to_change(&self) -> Option<Change<Arc<R>>> {
        match self {
            Self::Insert { record, index } => Some(Change::Add {
                item: Arc::clone(record),
                index: *index,
            }),
            Self::Remove { record, index } => Some(Change::Remove {
                item: Arc::clone(record),
                index: *index,
            }),
            Self::Change { .. } => None,
            Self::Sort | Self::Reset => Some(Change::Reset),
        }
    }
}

impl<R> Clone for SourceEvent<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Insert { record, index } => Self::Insert {
                record: Arc::clone(record),
                index: *index,
            },
            Self::Remove { record, index } => Self::Remove {
                record: Arc::clone(record),
                index: *index,
            },
            Self::Change { record, changed } => Self::Change {
                record: Arc::clone(record),
                changed: changed.clone(),
            },
            Self::Sort => Self::Sort,
            Self::Reset => Self::Reset,
        }
    }
}

impl<R: Record> fmt::Debug for SourceEvent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert { record, index } => f
                .debug_struct("Insert")
                .field("id", &record.id())
                .field("index", index)
                .finish(),
            Self::Remove { record, index } => f
                .debug_struct("Remove")
                .field("id", &record.id())
                .field("index", index)
                .finish(),
            Self::Change { record, changed } => f
                .debug_struct("Change")
                .field("id", &record.id())
                .field("changed", changed)
                .finish(),
            Self::Sort => f.write_str("Sort"),
            Self::Reset => f.write_str("Reset"),
        }
    }
}

fn find_in<'a, R: Record>(records: &'a [Arc<R>], id: &R::Id) -> Option<&'a Arc<R>> {
    for record in records {
        if record.id() == *id {
            return Some(record);
        }
        if let Some(found) = find_in(record.children(), id) {
            return Some(found);
        }
    }
    None
}

impl<R: Record> Source for [Arc<R>] {
    type Record = R;

    fn records(&self) -> &[Arc<R>] {
        self
    }

    fn find(&self, id: &R::Id) -> Option<&Arc<R>> {
        find_in(self, id)
    }
}

impl<R: Record> Source for Vec<Arc<R>> {
    type Record = R;

    fn records(&self) -> &[Arc<R>] {
        self
    }

    fn find(&self, id: &R::Id) -> Option<&Arc<R>> {
        find_in(self, id)
    }
}

/// An in-memory source collection.
///
/// Every mutator applies the change and returns the [`SourceEvent`] to forward to dependent
/// projections.
pub struct SourceList<R: Record> {
    records: Vec<Arc<R>>,
    index: IdMap<R::Id, usize>,
}

impl<R: Record> SourceList<R> {
    pub fn new(records: impl IntoIterator<Item = R>) -> Self {
        Self::from_shared(records.into_iter().map(Arc::new))
    }

    pub fn from_shared(records: impl IntoIterator<Item = Arc<R>>) -> Self {
        let mut list = Self {
            records: records.into_iter().collect(),
            index: IdMap::new(),
        };
        list.reindex();
        list
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, record) in self.records.iter().enumerate() {
            self.index.insert(record.id(), i);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&Arc<R>> {
        self.records.get(index)
    }

    /// Top-level position of a record.
    pub fn position(&self, id: &R::Id) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<R>> {
        self.records.iter()
    }

    pub fn push(&mut self, record: R) -> SourceEvent<R> {
        let index = self.records.len();
        self.insert(index, record)
    }

    /// Inserts at `index` (clamped to the current length).
    pub fn insert(&mut self, index: usize, record: R) -> SourceEvent<R> {
        self.insert_shared(index, Arc::new(record))
    }

    pub fn insert_shared(&mut self, index: usize, record: Arc<R>) -> SourceEvent<R> {
        let index = index.min(self.records.len());
        self.records.insert(index, Arc::clone(&record));
        self.reindex();
        SourceEvent::Insert { record, index }
    }

    pub fn remove(&mut self, id: &R::Id) -> Option<SourceEvent<R>> {
        let index = self.position(id)?;
        self.remove_at(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<SourceEvent<R>> {
        if index >= self.records.len() {
            return None;
        }
        let record = self.records.remove(index);
        self.reindex();
        Some(SourceEvent::Remove { record, index })
    }

    /// Replaces the top-level record with the same id.
    pub fn replace<S: Into<String>>(
        &mut self,
        record: R,
        changed: impl IntoIterator<Item = S>,
    ) -> Option<SourceEvent<R>> {
        let index = self.position(&record.id())?;
        let record = Arc::new(record);
        self.records[index] = Arc::clone(&record);
        Some(SourceEvent::Change {
            record,
            changed: changed.into_iter().map(Into::into).collect(),
        })
    }

    /// Mutates a top-level record in place (copy-on-write) and reports the changed attributes.
    pub fn update<S: Into<String>>(
        &mut self,
        id: &R::Id,
        changed: impl IntoIterator<Item = S>,
        f: impl FnOnce(&mut R),
    ) -> Option<SourceEvent<R>>
    where
        R: Clone,
    {
        let index = self.position(id)?;
        f(Arc::make_mut(&mut self.records[index]));
        debug_assert!(
            self.records[index].id() == *id,
            "SourceList::update must not change the record id"
        );
        Some(SourceEvent::Change {
            record: Arc::clone(&self.records[index]),
            changed: changed.into_iter().map(Into::into).collect(),
        })
    }

    pub fn reset(&mut self, records: impl IntoIterator<Item = R>) -> SourceEvent<R> {
        self.records = records.into_iter().map(Arc::new).collect();
        self.reindex();
        SourceEvent::Reset
    }

    /// Stable-sorts the records in place.
    pub fn sort_by(&mut self, mut cmp: impl FnMut(&R, &R) -> Ordering) -> SourceEvent<R> {
        self.records.sort_by(|a, b| cmp(a, b));
        self.reindex();
        SourceEvent::Sort
    }
}

impl<R: Record> Source for SourceList<R> {
    type Record = R;

    fn records(&self) -> &[Arc<R>] {
        &self.records
    }

    fn find(&self, id: &R::Id) -> Option<&Arc<R>> {
        match self.position(id) {
            Some(i) => self.records.get(i),
            None => find_in(&self.records, id),
        }
    }
}

impl<R: Record> Collection for SourceList<R> {
    type Item = Arc<R>;

    fn len(&self) -> usize {
        self.records.len()
    }

    fn item(&self, index: usize) -> Option<&Arc<R>> {
        self.records.get(index)
    }
}

impl<R: Record> fmt::Debug for SourceList<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.records.iter().map(|r| r.id()))
            .finish()
    }
}
