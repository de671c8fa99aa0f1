//! Router and state for the directory sync API.

use std::sync::Arc;

use axum::{routing::post, Extension, Router};
use checkin_directory_sync::{DirectoryStore, PhotoSync, ProfileSync};
use checkin_graph::DirectorySource;

use crate::handlers;

/// Shared state for directory sync routes.
#[derive(Clone)]
pub struct DirectorySyncState {
    pub profile_sync: ProfileSync,
    pub photo_sync: PhotoSync,
}

impl DirectorySyncState {
    /// Wire both sync services to the same source and store.
    pub fn new(
        source: Arc<dyn DirectorySource>,
        store: Arc<dyn DirectoryStore>,
        photo_concurrency: usize,
    ) -> Self {
        Self {
            profile_sync: ProfileSync::new(Arc::clone(&source), Arc::clone(&store)),
            photo_sync: PhotoSync::new(source, store).with_concurrency(photo_concurrency),
        }
    }
}

/// Create the directory sync router.
///
/// - POST /admin/directory/sync/users
/// - POST /admin/directory/sync/photos
pub fn directory_router(state: DirectorySyncState) -> Router {
    Router::new()
        .route(
            "/admin/directory/sync/users",
            post(handlers::sync::sync_users),
        )
        .route(
            "/admin/directory/sync/photos",
            post(handlers::sync::sync_photos),
        )
        .layer(Extension(state))
}
