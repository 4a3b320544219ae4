//! Sort and group key specifications, resolved once into canonical callables.

use alloc::string::String;
use alloc::sync::Arc;
use core::cmp::Ordering;
use core::fmt;

use crate::value::NULL;
use crate::{Record, Value};

/// A two-argument ordering function over records.
pub type Comparator<R> = Arc<dyn Fn(&R, &R) -> Ordering + Send + Sync>;

/// A single-argument key extraction function over records.
pub type Extractor<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;

/// A key specification: an attribute name, a key extractor, or an ordering function.
///
/// Specs are resolved once at configuration time (see [`resolve_comparator`] and
/// [`KeySpec::to_extractor`]); comparisons never branch on the variant.
pub enum KeySpec<R> {
    /// Shorthand for "extract this attribute and compare with the default [`Value`] order".
    Attribute(String),
    Extractor(Extractor<R>),
    Orderer(Comparator<R>),
}

impl<R> Clone for KeySpec<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Attribute(name) => Self::Attribute(name.clone()),
            Self::Extractor(f) => Self::Extractor(Arc::clone(f)),
            Self::Orderer(f) => Self::Orderer(Arc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for KeySpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            Self::Extractor(_) => f.write_str("Extractor(..)"),
            Self::Orderer(_) => f.write_str("Orderer(..)"),
        }
    }
}

impl<R> From<&str> for KeySpec<R> {
    fn from(name: &str) -> Self {
        Self::Attribute(String::from(name))
    }
}

impl<R> From<String> for KeySpec<R> {
    fn from(name: String) -> Self {
        Self::Attribute(name)
    }
}

impl<R: Record + 'static> KeySpec<R> {
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    pub fn extractor<V: Into<Value>>(f: impl Fn(&R) -> V + Send + Sync + 'static) -> Self {
        Self::Extractor(Arc::new(move |r| f(r).into()))
    }

    pub fn orderer(f: impl Fn(&R, &R) -> Ordering + Send + Sync + 'static) -> Self {
        Self::Orderer(Arc::new(f))
    }

    /// Reverses the order this spec produces. Equal elements stay equal, so stability holds.
    pub fn descending(self) -> Self {
        let cmp = resolve_comparator(Some(&self));
        Self::Orderer(Arc::new(move |a, b| cmp(b, a)))
    }

    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Self::Attribute(name) => Some(name),
            _ => None,
        }
    }

    /// Resolves this spec into a key extractor.
    ///
    /// Returns `None` for [`KeySpec::Orderer`]: an ordering function has no key to extract.
    pub fn to_extractor(&self) -> Option<Extractor<R>> {
        match self {
            Self::Attribute(name) => {
                let name = name.clone();
                Some(Arc::new(move |r: &R| {
                    r.attribute(&name).cloned().unwrap_or_default()
                }))
            }
            Self::Extractor(f) => Some(Arc::clone(f)),
            Self::Orderer(_) => None,
        }
    }

    /// Resolves this spec into a canonical two-argument ordering function.
    pub fn to_comparator(&self) -> Comparator<R> {
        match self {
            Self::Attribute(name) => {
                let name = name.clone();
                Arc::new(move |a: &R, b: &R| compare_attribute(a, b, &name))
            }
            Self::Extractor(f) => {
                let f = Arc::clone(f);
                Arc::new(move |a: &R, b: &R| f(a).cmp(&f(b)))
            }
            Self::Orderer(f) => Arc::clone(f),
        }
    }
}

/// Resolves an optional spec into an ordering function.
///
/// Without a spec every pair compares equal, so a stable sort keeps insertion order.
pub fn resolve_comparator<R: Record + 'static>(spec: Option<&KeySpec<R>>) -> Comparator<R> {
    match spec {
        Some(spec) => spec.to_comparator(),
        None => Arc::new(|_: &R, _: &R| Ordering::Equal),
    }
}

/// Compares one attribute of two records; missing attributes sort as `Null`.
pub fn compare_attribute<R: Record>(a: &R, b: &R, name: &str) -> Ordering {
    let a = a.attribute(name).unwrap_or(&NULL);
    let b = b.attribute(name).unwrap_or(&NULL);
    a.cmp(b)
}
