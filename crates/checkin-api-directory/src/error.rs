//! Error types for the directory sync API.
//!
//! Every error renders as `{"error": "<message>"}`. Internal failures are
//! logged in full and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use checkin_directory_sync::DirectorySyncError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Directory sync API errors.
#[derive(Debug, Error)]
pub enum DirectoryApiError {
    /// The request carried no usable access token.
    #[error("Access token is required.")]
    MissingAccessToken,

    /// The request body could not be decoded.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// An `id` in the photo request is not a valid identifier.
    #[error("Invalid user id: {0}")]
    InvalidId(String),

    /// The directory returned no users at all.
    #[error("No user data found.")]
    NoRemoteUsers,

    /// A sync run failed upstream or in the store.
    #[error("Sync failed: {0}")]
    Sync(#[source] DirectorySyncError),
}

impl From<DirectorySyncError> for DirectoryApiError {
    fn from(err: DirectorySyncError) -> Self {
        match err {
            DirectorySyncError::MissingAccessToken => DirectoryApiError::MissingAccessToken,
            other => DirectoryApiError::Sync(other),
        }
    }
}

impl DirectoryApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            DirectoryApiError::MissingAccessToken
            | DirectoryApiError::InvalidBody(_)
            | DirectoryApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            DirectoryApiError::NoRemoteUsers => StatusCode::NOT_FOUND,
            DirectoryApiError::Sync(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to the client-facing payload.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let error = match self {
            DirectoryApiError::Sync(DirectorySyncError::Upstream(err)) => {
                tracing::error!(error = %err, "Directory request failed during sync");
                "Failed to fetch data from the directory.".to_string()
            }
            DirectoryApiError::Sync(err) => {
                tracing::error!(error = %err, "Store error during sync");
                "Failed to update the directory store.".to_string()
            }
            other => other.to_string(),
        };
        ErrorBody { error }
    }
}

impl IntoResponse for DirectoryApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}
