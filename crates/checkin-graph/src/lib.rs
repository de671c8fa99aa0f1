//! Microsoft Graph directory client for the check-in service.
//!
//! Reads the organisation's user directory through the Microsoft Graph API
//! so it can be mirrored into the local check-in database.
//!
//! # Features
//!
//! - Lazy, sequential `@odata.nextLink` pagination over `/users`
//! - Per-user avatar download (`/users/{mail}/photo/$value`)
//! - Typed errors for auth, not-found and `OData` failures
//! - [`DirectorySource`] seam, with [`InMemoryDirectorySource`] for tests
//!
//! # Example
//!
//! ```no_run
//! use checkin_graph::{fetch_all_users, GraphClient, GraphConfig};
//! use secrecy::SecretString;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GraphConfig::builder().build()?;
//! let client = GraphClient::new(&config)?;
//! let token = SecretString::from("bearer-token".to_string());
//!
//! let users = fetch_all_users(&client, &token).await?;
//! println!("{} users in directory", users.len());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod graph_client;
mod memory;
mod source;
mod users;

// Re-exports
pub use config::{GraphConfig, GraphConfigBuilder, DEFAULT_GRAPH_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{GraphError, GraphResult};
pub use graph_client::{GraphClient, ODataError, ODataErrorBody, ODataResponse};
pub use memory::InMemoryDirectorySource;
pub use source::{fetch_all_users, user_pages, DirectorySource};
pub use users::{RemoteUserRecord, UserPage};
