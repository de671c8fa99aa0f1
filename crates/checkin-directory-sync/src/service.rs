//! Profile sync orchestration: fetch, normalize, plan, write.

use std::sync::Arc;

use checkin_graph::{fetch_all_users, DirectorySource};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use crate::batch_writer::{BatchPolicy, BatchWriter, SyncCounts};
use crate::error::{DirectorySyncError, SyncResult};
use crate::normalize::normalize_all;
use crate::planner::{lookup_mails, plan};
use crate::store::DirectoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSyncOutcome {
    /// The directory returned no users; nothing was written.
    NoRemoteUsers,
    Synced(SyncCounts),
}

/// Mirrors the remote user directory into the local store.
#[derive(Clone)]
pub struct ProfileSync {
    source: Arc<dyn DirectorySource>,
    store: Arc<dyn DirectoryStore>,
    writer: BatchWriter,
}

impl ProfileSync {
    #[must_use]
    pub fn new(source: Arc<dyn DirectorySource>, store: Arc<dyn DirectoryStore>) -> Self {
        Self::with_policy(source, store, BatchPolicy::default())
    }

    #[must_use]
    pub fn with_policy(
        source: Arc<dyn DirectorySource>,
        store: Arc<dyn DirectoryStore>,
        policy: BatchPolicy,
    ) -> Self {
        let writer = BatchWriter::with_policy(Arc::clone(&store), policy);
        Self {
            source,
            store,
            writer,
        }
    }

    /// Run one full profile sync.
    ///
    /// Records are never deleted locally. Running twice against an
    /// unchanged directory writes nothing the second time.
    ///
    /// # Errors
    ///
    /// Returns `MissingAccessToken` for a blank token, `Upstream` if any page
    /// fetch fails (nothing is written in that case) and `Store` if a lookup
    /// or write chunk fails.
    #[instrument(skip_all)]
    pub async fn run(&self, token: &SecretString) -> SyncResult<ProfileSyncOutcome> {
        require_token(token)?;

        let remote = fetch_all_users(self.source.as_ref(), token).await?;
        if remote.is_empty() {
            info!("Directory returned no users");
            return Ok(ProfileSyncOutcome::NoRemoteUsers);
        }

        let total = remote.len();
        let normalized = normalize_all(remote);

        let mails = lookup_mails(&normalized);
        let local = self.store.find_by_mails(&mails).await?;
        info!(remote = total, matched = local.len(), "Loaded local counterparts");

        let plan = plan(normalized, local);
        info!(
            creates = plan.creates.len(),
            updates = plan.updates.len(),
            unchanged = total - plan.creates.len() - plan.updates.len(),
            "Planned directory sync"
        );

        let report = self.writer.apply(plan, total).await?;
        Ok(ProfileSyncOutcome::Synced(report.counts))
    }
}

/// Reject blank bearer tokens before any request is made.
pub(crate) fn require_token(token: &SecretString) -> SyncResult<()> {
    if token.expose_secret().trim().is_empty() {
        return Err(DirectorySyncError::MissingAccessToken);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_token() {
        assert!(require_token(&SecretString::from("abc".to_string())).is_ok());
        assert!(matches!(
            require_token(&SecretString::from("   ".to_string())),
            Err(DirectorySyncError::MissingAccessToken)
        ));
    }
}
