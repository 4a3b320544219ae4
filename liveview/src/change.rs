use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::{Error, Result};

/// A change notification emitted by an observable collection.
///
/// A consumer can always rebuild the collection's current sequence from either a single
/// `Reset` (re-read everything) or by applying `Add`/`Remove` in the order they were emitted.
/// Each index refers to the sequence as it is right before that notification is applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Change<T> {
    Add { item: T, index: usize },
    Remove { item: T, index: usize },
    Reset,
}

impl<T> Change<T> {
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset)
    }

    pub fn item(&self) -> Option<&T> {
        match self {
            Self::Add { item, .. } | Self::Remove { item, .. } => Some(item),
            Self::Reset => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Add { index, .. } | Self::Remove { index, .. } => Some(*index),
            Self::Reset => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Change<U> {
        match self {
            Self::Add { item, index } => Change::Add {
                item: f(item),
                index,
            },
            Self::Remove { item, index } => Change::Remove {
                item: f(item),
                index,
            },
            Self::Reset => Change::Reset,
        }
    }
}

/// Read access to an ordered collection.
///
/// Implemented by every collection in this crate so windows can slice any of them.
pub trait Collection {
    type Item: Clone;

    fn len(&self) -> usize;

    fn item(&self, index: usize) -> Option<&Self::Item>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positional lookup that reports out-of-range indexes as [`Error::IndexOutOfRange`].
    fn try_item(&self, index: usize) -> Result<&Self::Item> {
        self.item(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }
}

impl<T: Clone> Collection for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn item(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<T: Clone> Collection for [T] {
    type Item = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn item(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

/// A callback fired for every change notification, synchronously and in emission order.
pub type Listener<T> = Arc<dyn Fn(&Change<T>) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A registry of change listeners.
pub struct Listeners<T> {
    next: u64,
    entries: Vec<(SubscriptionId, Listener<T>)>,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self {
            next: 0,
            entries: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Listener<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next = self.next.saturating_add(1);
        self.entries.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn emit(&self, change: &Change<T>) {
        for (_, listener) in &self.entries {
            listener(change);
        }
    }

    pub fn emit_all(&self, changes: &[Change<T>]) {
        if self.entries.is_empty() {
            return;
        }
        for change in changes {
            self.emit(change);
        }
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            entries: self.entries.clone(),
        }
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}
