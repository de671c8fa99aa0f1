//! Avatar synchronization with per-record failure isolation.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use checkin_db::DirectoryUser;
use checkin_graph::DirectorySource;
use futures::future::join_all;
use secrecy::SecretString;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::SyncResult;
use crate::service::require_token;
use crate::store::DirectoryStore;

/// Default cap on concurrent avatar fetches.
pub const DEFAULT_PHOTO_CONCURRENCY: usize = 16;

/// Which local records to fetch avatars for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoTarget {
    /// Explicitly named records.
    Ids(Vec<Uuid>),
    /// Every record that has no avatar yet.
    MissingPhoto,
}

impl PhotoTarget {
    /// Target `ids`, or every record missing an avatar when `ids` is empty.
    #[must_use]
    pub fn from_ids(ids: Vec<Uuid>) -> Self {
        if ids.is_empty() {
            PhotoTarget::MissingPhoto
        } else {
            PhotoTarget::Ids(ids)
        }
    }
}

/// Result for one targeted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoSyncDetail {
    pub mail: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhotoSyncDetail {
    fn succeeded(mail: &str) -> Self {
        Self {
            mail: Some(mail.to_string()),
            success: true,
            error: None,
        }
    }

    fn failed(mail: Option<&str>, error: impl Into<String>) -> Self {
        Self {
            mail: mail.map(str::to_string),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Summary of one photo sync run. `details` follows target order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhotoSyncReport {
    pub successful_updates: usize,
    pub failed_updates: usize,
    pub details: Vec<PhotoSyncDetail>,
}

impl PhotoSyncReport {
    fn from_details(details: Vec<PhotoSyncDetail>) -> Self {
        let successful_updates = details.iter().filter(|d| d.success).count();
        Self {
            successful_updates,
            failed_updates: details.len() - successful_updates,
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSyncOutcome {
    /// The target selected no records.
    NothingToSync,
    Completed(PhotoSyncReport),
}

/// Fetches avatars from the directory and stores them base64-encoded.
#[derive(Clone)]
pub struct PhotoSync {
    source: Arc<dyn DirectorySource>,
    store: Arc<dyn DirectoryStore>,
    concurrency: usize,
}

impl PhotoSync {
    #[must_use]
    pub fn new(source: Arc<dyn DirectorySource>, store: Arc<dyn DirectoryStore>) -> Self {
        Self {
            source,
            store,
            concurrency: DEFAULT_PHOTO_CONCURRENCY,
        }
    }

    /// Cap concurrent fetches at `concurrency` (at least one).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sync avatars for `target`.
    ///
    /// A failing fetch or write only marks its own record as failed.
    ///
    /// # Errors
    ///
    /// Returns `MissingAccessToken` for a blank token, or a store error if
    /// the target records cannot be selected.
    #[instrument(skip_all, fields(target = ?target))]
    pub async fn run(&self, token: &SecretString, target: PhotoTarget) -> SyncResult<PhotoSyncOutcome> {
        require_token(token)?;

        let users = match &target {
            PhotoTarget::Ids(ids) => self.store.find_by_ids(ids).await?,
            PhotoTarget::MissingPhoto => self.store.find_without_photo().await?,
        };

        if users.is_empty() {
            info!("No directory users need a photo");
            return Ok(PhotoSyncOutcome::NothingToSync);
        }

        info!(users = users.len(), concurrency = self.concurrency, "Syncing photos");

        let semaphore = Semaphore::new(self.concurrency);
        let details = join_all(users.iter().map(|user| {
            let semaphore = &semaphore;
            async move {
                // Held until this record is done.
                let _permit = semaphore.acquire().await;
                self.sync_one(token, user).await
            }
        }))
        .await;

        let report = PhotoSyncReport::from_details(details);
        info!(
            successful = report.successful_updates,
            failed = report.failed_updates,
            "Photo sync finished"
        );

        Ok(PhotoSyncOutcome::Completed(report))
    }

    async fn sync_one(&self, token: &SecretString, user: &DirectoryUser) -> PhotoSyncDetail {
        let Some(mail) = user.mail.as_deref().filter(|m| !m.is_empty()) else {
            warn!(user_id = %user.id, "Directory user has no mail, skipping photo");
            return PhotoSyncDetail::failed(None, "User has no mail address");
        };

        let bytes = match self.source.fetch_photo(token, mail).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(mail, error = %e, "Failed to fetch photo");
                return PhotoSyncDetail::failed(Some(mail), e.to_string());
            }
        };

        let encoded = STANDARD.encode(&bytes);

        match self.store.update_photo_by_mail(mail, &encoded).await {
            Ok(_) => {
                debug!(mail, bytes = bytes.len(), "Stored photo");
                PhotoSyncDetail::succeeded(mail)
            }
            Err(e) => {
                warn!(mail, error = %e, "Failed to store photo");
                PhotoSyncDetail::failed(Some(mail), e.to_string())
            }
        }
    }
}
