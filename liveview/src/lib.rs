//! Live, grouped, sorted and filtered projections over observable record collections.
//!
//! For windowing a projection (paging or scrolling through a fixed-size slice), see the
//! `liveview-window` crate.
//!
//! A [`VirtualCollection`] presents a read-only, ordered view of a source collection. It can
//! group records by one or more keys (inserting synthetic group nodes), sort leaves, filter them,
//! and flatten hierarchical sources. The projection keeps itself up to date as source mutations
//! are forwarded to it and reports every change as a minimal [`Change`] sequence.
//!
//! It is storage-agnostic. The caller provides:
//! - records implementing [`Record`] (or the ready-made [`Model`])
//! - a [`Source`] to read current contents from
//! - a [`SourceEvent`] after each mutation
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod change;
mod collection;
mod comparator;
mod entry;
mod error;
mod grouping;
mod key;
mod options;
mod record;
mod source;
mod value;


pub use change::{Change, Collection, Listener, Listeners, SubscriptionId};
pub use collection::VirtualCollection;
pub use comparator::{Comparator, Extractor, KeySpec, compare_attribute, resolve_comparator};
pub use entry::{Entry, EntryId, GroupId, GroupNode, Member, Node};
pub use error::{ConfigError, Error, Result};
pub use options::{Filter, GroupDescriptor, VirtualCollectionOptions};
pub use record::{Model, Record};
pub use source::{Source, SourceEvent, SourceList};
pub use value::{Value, ValueKind};

#[doc(hidden)]
pub use key::IdentityKey;
