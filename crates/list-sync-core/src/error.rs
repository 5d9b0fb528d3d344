//! Engine Errors
//!
//! The four failure kinds every public operation can resolve with.

use thiserror::Error;

use crate::item::ItemId;

/// Common result type for engine operations
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Empty or oversized input, rejected before any remote call
    #[error("invalid input: {0}")]
    Validation(String),
    /// A store request (create/update/delete/search/list) did not complete
    #[error("request failed: {0}")]
    Network(String),
    /// Hub unreachable, handshake refused or connection dropped
    #[error("connection failed: {0}")]
    Connection(String),
    /// The id is no longer in the cache (usually a concurrent delete)
    #[error("item {0} no longer exists")]
    StaleReference(ItemId),
}

impl SyncError {
    pub fn network(err: impl std::fmt::Display) -> Self {
        SyncError::Network(err.to_string())
    }

    pub fn connection(err: impl std::fmt::Display) -> Self {
        SyncError::Connection(err.to_string())
    }
}
