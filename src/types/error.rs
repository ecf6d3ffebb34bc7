//! Error types for the temporal index.

use thiserror::Error;

/// All errors that can occur in the temporal index.
#[derive(Error, Debug)]
pub enum TemporalError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the embedded key-value store.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Operation requires an open index.
    #[error("Index closed")]
    IndexClosed,

    /// Operation requires a closed index.
    #[error("Index open")]
    IndexOpen,

    /// A range iterator was used after `close()`.
    #[error("Iterator closed")]
    IteratorClosed,

    /// Missing or malformed configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configured index type has no implementation.
    #[error("Unsupported index type: {0}")]
    UnsupportedIndexType(String),

    /// No operator is registered under the given name.
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    /// Neither operand is bound and fully unbound evaluation is disabled.
    #[error("Unbound evaluation not allowed for {0}")]
    UnboundEvaluation(String),

    /// Literal that cannot be read as a dateTime or interval.
    #[error("Invalid temporal literal: {0}")]
    InvalidLiteral(String),

    /// Argument outside the accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

macro_rules! storage_error {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for TemporalError {
                fn from(e: $ty) -> Self {
                    TemporalError::Storage(e.to_string())
                }
            }
        )*
    };
}

storage_error!(
    redb::Error,
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError
);

/// Convenience result type for temporal index operations.
pub type TemporalResult<T> = Result<T, TemporalError>;
