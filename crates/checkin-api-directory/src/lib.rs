//! Directory sync trigger API.
//!
//! This crate provides REST API endpoints for:
//! - Mirroring the remote user directory into the local store
//! - Fetching user avatars, for everyone missing one or for selected users
//!
//! # Example
//!
//! ```rust,ignore
//! use checkin_api_directory::{directory_router, DirectorySyncState};
//! use axum::Router;
//!
//! let state = DirectorySyncState::new(Arc::new(graph_client), Arc::new(store), 16);
//! let app = Router::new().merge(directory_router(state));
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;

// Re-export public API
pub use error::{DirectoryApiError, ErrorBody};
pub use router::{directory_router, DirectorySyncState};
