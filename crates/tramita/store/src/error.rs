use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Compare-and-swap failure: the persisted state no longer matches
    /// what the caller read. Carries expected/found state names.
    #[error("conflict on '{key}': expected '{expected}', found '{found}'")]
    Conflict {
        key: String,
        expected: String,
        found: String,
    },

    #[error("backend error: {0}")]
    Backend(String),
}
