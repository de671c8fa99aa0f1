//! Shared fixtures for directory sync tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use checkin_db::DirectoryUser;
use checkin_directory_sync::InMemoryDirectoryStore;
use checkin_graph::{InMemoryDirectorySource, RemoteUserRecord};
use chrono::Utc;
use secrecy::SecretString;
use serde_json::{json, Value};
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub fn token() -> SecretString {
    SecretString::from("mock-access-token".to_string())
}

/// A remote record as the Graph API would return it.
pub fn remote_user(i: usize) -> RemoteUserRecord {
    remote_from(json!({
        "id": format!("remote-{i}"),
        "mail": format!("user{i}@example.com"),
        "displayName": format!("User {i}"),
        "givenName": "User",
        "surname": format!("{i}"),
        "jobTitle": "Engineer",
        "businessPhones": ["+1 555 0100"]
    }))
}

pub fn remote_from(value: Value) -> RemoteUserRecord {
    serde_json::from_value(value).expect("valid remote record")
}

/// A local record with the given mail and display name.
pub fn local_user(mail: Option<&str>, display_name: &str) -> DirectoryUser {
    let now = Utc::now();
    DirectoryUser {
        id: Uuid::new_v4(),
        remote_id: "remote-old".to_string(),
        mail: mail.map(str::to_string),
        display_name: Some(display_name.to_string()),
        given_name: None,
        job_title: None,
        mobile_phone: None,
        office_location: None,
        preferred_language: None,
        surname: None,
        user_principal_name: None,
        business_phones: None,
        photo: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn source_with(users: Vec<RemoteUserRecord>, page_size: usize) -> Arc<InMemoryDirectorySource> {
    let source = InMemoryDirectorySource::new(page_size);
    source.set_users(users);
    Arc::new(source)
}

pub fn store_with(users: Vec<DirectoryUser>) -> Arc<InMemoryDirectoryStore> {
    Arc::new(InMemoryDirectoryStore::with_users(users))
}
