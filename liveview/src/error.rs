use alloc::string::String;

use thiserror::Error;

use crate::ValueKind;

/// A configuration the projection cannot honor.
///
/// Raised when options are resolved and on every rebuild; the previous valid projection is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An ordering function was supplied where a key or display value must be extracted.
    #[error("{role} of grouping level {level} must extract a value, not order records")]
    OrdererNotAllowed { level: usize, role: &'static str },

    /// A grouping level produced keys of different kinds, so groups cannot be ordered.
    #[error("grouping level {level} produced keys of mixed kinds ({expected} and {found})")]
    MixedKeyTypes {
        level: usize,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A record appears as its own descendant in a tree source.
    #[error("record {id} appears as its own descendant")]
    CyclicRecord { id: String },
}

/// Errors surfaced by projection queries and mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// A positional query outside `[0, len)`. The collection is unchanged.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result type for projection operations.
pub type Result<T> = core::result::Result<T, Error>;
