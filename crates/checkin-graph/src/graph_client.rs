//! Microsoft Graph API HTTP client for the user directory.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::source::DirectorySource;
use crate::users::{RemoteUserRecord, UserPage};
use crate::{GraphConfig, GraphError, GraphResult};

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
}

/// Response wrapper for paginated Graph API responses.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Microsoft Graph API client.
///
/// The client holds no credentials; the caller passes the bearer token with
/// every request.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    /// Creates a new Graph client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &GraphConfig) -> GraphResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GraphError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    /// Returns the base URL for Graph API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the first page of the user collection.
    #[must_use]
    pub fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    /// URL of the binary avatar for a user.
    #[must_use]
    pub fn photo_url(&self, mail: &str) -> String {
        format!(
            "{}/users/{}/photo/$value",
            self.base_url,
            urlencoding::encode(mail)
        )
    }

    /// Performs an authenticated GET and decodes the JSON body.
    #[instrument(skip(self, token))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &SecretString,
    ) -> GraphResult<T> {
        let response = self.send_get(url, token).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(GraphError::from)
    }

    /// Performs an authenticated GET and returns the raw body.
    #[instrument(skip(self, token))]
    pub async fn get_bytes(&self, url: &str, token: &SecretString) -> GraphResult<Vec<u8>> {
        let response = self.send_get(url, token).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn send_get(&self, url: &str, token: &SecretString) -> GraphResult<reqwest::Response> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        warn!(status = %status, url = %url, "Graph request failed");
        Err(error_from_status(status, &error_body))
    }
}

/// Maps a non-success Graph response to a typed error.
fn error_from_status(status: reqwest::StatusCode, body: &str) -> GraphError {
    let (code, message) = match serde_json::from_str::<ODataError>(body) {
        Ok(odata_error) => (odata_error.error.code, odata_error.error.message),
        Err(_) => (status.to_string(), body.to_string()),
    };

    match status {
        reqwest::StatusCode::UNAUTHORIZED => GraphError::Unauthorized(format!("{code} - {message}")),
        reqwest::StatusCode::FORBIDDEN => {
            GraphError::PermissionDenied(format!("{code} - {message}"))
        }
        reqwest::StatusCode::NOT_FOUND => GraphError::NotFound(format!("{code} - {message}")),
        _ => GraphError::GraphApi {
            status: status.as_u16(),
            code,
            message,
        },
    }
}

#[async_trait]
impl DirectorySource for GraphClient {
    async fn fetch_users_page(
        &self,
        token: &SecretString,
        cursor: Option<&str>,
    ) -> GraphResult<UserPage> {
        let url = cursor.map_or_else(|| self.users_url(), str::to_string);
        debug!(url = %url, "Requesting user page");

        let response: ODataResponse<RemoteUserRecord> = self.get_json(&url, token).await?;
        Ok(UserPage {
            users: response.value,
            next_link: response.next_link,
        })
    }

    async fn fetch_photo(&self, token: &SecretString, mail: &str) -> GraphResult<Vec<u8>> {
        let url = self.photo_url(mail);
        self.get_bytes(&url, token).await
    }
}
