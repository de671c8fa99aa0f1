//! Check-in directory service.
//!
//! Wires configuration, logging, the Postgres store and the Graph client
//! into one axum application exposing the directory sync triggers.

pub mod config;
pub mod health;
pub mod logging;

use std::sync::Arc;

use axum::{routing::get, Router};
use checkin_api_directory::{directory_router, DirectorySyncState};
use checkin_directory_sync::DirectoryStore;
use checkin_graph::DirectorySource;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use health::health_handler;

/// Build the full application router.
pub fn build_router(
    source: Arc<dyn DirectorySource>,
    store: Arc<dyn DirectoryStore>,
    photo_sync_concurrency: usize,
) -> Router {
    let state = DirectorySyncState::new(source, store, photo_sync_concurrency);

    Router::new()
        .route("/health", get(health_handler))
        .merge(directory_router(state))
        .layer(TraceLayer::new_for_http())
}
