//! Error types for directory synchronization.

use checkin_db::DbError;
use checkin_graph::GraphError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, DirectorySyncError>;

/// Errors that abort a sync run.
///
/// Per-record photo failures are not represented here; they are captured in
/// the photo sync report instead.
#[derive(Debug, Error)]
pub enum DirectorySyncError {
    /// No bearer token was supplied, or it was blank.
    #[error("Access token is required")]
    MissingAccessToken,

    /// The remote directory rejected or failed a request.
    #[error("Directory request failed: {0}")]
    Upstream(#[from] GraphError),

    /// A store read or write failed.
    #[error("Store operation failed: {0}")]
    Store(#[from] DbError),
}

impl DirectorySyncError {
    /// Check if this error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, DirectorySyncError::MissingAccessToken)
    }
}
