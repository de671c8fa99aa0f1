//! Configuration for the Graph directory client.

use std::time::Duration;

use crate::{GraphError, GraphResult};

/// Default Microsoft Graph endpoint, including the API version.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the Graph API.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Base URL including the API version, without a trailing slash.
    pub base_url: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GraphConfig {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> GraphConfigBuilder {
        GraphConfigBuilder::default()
    }
}

/// Builder for [`GraphConfig`].
#[derive(Debug, Default)]
pub struct GraphConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl GraphConfigBuilder {
    /// Overrides the Graph base URL (useful for sovereign clouds and tests).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Config` if the base URL is not an absolute
    /// http(s) URL or the timeout is zero.
    pub fn build(self) -> GraphResult<GraphConfig> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        let parsed = url::Url::parse(&base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GraphError::Config(format!(
                "Unsupported URL scheme '{}' for Graph base URL",
                parsed.scheme()
            )));
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(GraphError::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(GraphConfig { base_url, timeout })
    }
}
