//! Error types for smallworld.

use thiserror::Error;

/// Errors that can occur while building, querying, or persisting an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The pairwise distance cache cannot address `n * (n + 1) / 2` entries.
    #[error("distance cache cannot address {items} items on this platform")]
    CapacityExceeded { items: usize },

    /// Search was attempted before `build` completed.
    #[error("index has not been built")]
    NotBuilt,

    /// Serialized graph data is malformed.
    #[error("corrupt graph data: {0}")]
    Corrupt(String),

    /// I/O failure while reading or writing a serialized graph.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for smallworld operations.
pub type Result<T> = std::result::Result<T, IndexError>;
