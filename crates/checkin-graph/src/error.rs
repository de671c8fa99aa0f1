//! Error types for the Graph directory client.

use thiserror::Error;

/// Result type alias using `GraphError`.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur when talking to the Microsoft Graph API.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The bearer token was rejected (401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The token lacks the required permission (403).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other non-success response from Microsoft Graph.
    #[error("Graph API error ({status}): {code} - {message}")]
    GraphApi {
        status: u16,
        code: String,
        message: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl GraphError {
    /// Returns true when the upstream rejected the credentials.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            GraphError::Unauthorized(_) | GraphError::PermissionDenied(_)
        )
    }

    /// Returns true for a 404 from the upstream.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_api_error_display() {
        let err = GraphError::GraphApi {
            status: 500,
            code: "generalException".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Graph API error (500): generalException - boom"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(GraphError::Unauthorized("x".into()).is_auth_error());
        assert!(GraphError::PermissionDenied("x".into()).is_auth_error());
        assert!(!GraphError::NotFound("x".into()).is_auth_error());
        assert!(GraphError::NotFound("x".into()).is_not_found());
    }
}
