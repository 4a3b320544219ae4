#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Identity index used for id → position and id → group lookups.
#[cfg(feature = "std")]
pub(crate) type IdMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type IdMap<K, V> = BTreeMap<K, V>;

/// Bound for record identities and group keys.
///
/// With `feature = "std"` identities are hashed; without it they are ordered.
#[cfg(feature = "std")]
pub trait IdentityKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> IdentityKey for K {}

#[cfg(not(feature = "std"))]
pub trait IdentityKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> IdentityKey for K {}
