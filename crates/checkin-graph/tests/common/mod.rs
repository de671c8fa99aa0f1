//! Common test utilities for checkin-graph integration tests.

#![allow(dead_code)]

use checkin_graph::{GraphClient, GraphConfig};
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "mock-access-token";

/// Test data factory for creating Graph users.
pub fn create_test_user(id: &str, email_prefix: &str) -> Value {
    json!({
        "id": id,
        "userPrincipalName": format!("{}@test.onmicrosoft.com", email_prefix),
        "displayName": format!("Test User {}", email_prefix),
        "givenName": "Test",
        "surname": "User",
        "mail": format!("{}@example.com", email_prefix),
        "jobTitle": "Test Engineer",
        "businessPhones": ["+1 555 0100"]
    })
}

/// Wraps items in an `OData` response format.
pub fn create_odata_response(items: Vec<Value>, next_link: Option<&str>) -> Value {
    let mut response = json!({ "value": items });
    if let Some(link) = next_link {
        response["@odata.nextLink"] = json!(link);
    }
    response
}

/// Creates an `OData` error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Generate a sequence of test users.
pub fn generate_test_users(start: usize, count: usize) -> Vec<Value> {
    (start..start + count)
        .map(|i| create_test_user(&format!("user-{i}"), &format!("user{i}")))
        .collect()
}

pub fn token() -> SecretString {
    SecretString::from(TEST_TOKEN.to_string())
}

/// Mock server wrapper with common setup helpers.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    /// Creates a new mock Graph API server.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Returns the mock server's Graph base URL (including API version).
    pub fn base_url(&self) -> String {
        format!("{}/v1.0", self.server.uri())
    }

    /// Builds a client pointed at the mock server.
    pub fn client(&self) -> GraphClient {
        let config = GraphConfig::builder()
            .base_url(self.base_url())
            .build()
            .unwrap();
        GraphClient::new(&config).unwrap()
    }

    /// Mounts one mock per page, chained by `$skiptoken` links.
    ///
    /// Every page expects exactly one request.
    pub async fn mock_user_pages(&self, pages: Vec<Vec<Value>>) {
        let total_pages = pages.len();

        for (i, page) in pages.into_iter().enumerate() {
            let next_link = (i + 1 < total_pages)
                .then(|| format!("{}/users?$skiptoken=page{}", self.base_url(), i + 1));
            let response = create_odata_response(page, next_link.as_deref());

            let mock = Mock::given(method("GET"))
                .and(path("/v1.0/users"))
                .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()));

            let mock = if i == 0 {
                mock.and(query_param_is_missing("$skiptoken"))
            } else {
                mock.and(query_param("$skiptoken", format!("page{i}").as_str()))
            };

            mock.respond_with(ResponseTemplate::new(200).set_body_json(response))
                .expect(1)
                .mount(&self.server)
                .await;
        }
    }

    /// Mounts a fixed response for every request to the user collection.
    pub async fn mock_users_response(&self, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path("/v1.0/users"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts a binary photo for a user.
    pub async fn mock_photo(&self, encoded_mail: &str, bytes: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/users/{encoded_mail}/photo/$value")))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "image/jpeg")
                    .set_body_bytes(bytes),
            )
            .mount(&self.server)
            .await;
    }

    /// Mounts a missing photo (404) for a user.
    pub async fn mock_photo_missing(&self, encoded_mail: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/users/{encoded_mail}/photo/$value")))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(create_odata_error("ImageNotFound", "Photo not found")),
            )
            .mount(&self.server)
            .await;
    }
}
