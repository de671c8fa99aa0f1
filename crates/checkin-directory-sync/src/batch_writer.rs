//! Applies a sync plan to the store in bounded batches.

use std::sync::Arc;

use checkin_db::NewDirectoryUser;
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::SyncResult;
use crate::planner::{PlannedUpdate, SyncPlan};
use crate::store::DirectoryStore;

/// Default number of profile updates issued together.
pub const UPDATE_BATCH_SIZE: usize = 50;

/// Default number of records per bulk insert.
pub const CREATE_BATCH_SIZE: usize = 100;

/// Batch sizes for the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub update_batch_size: usize,
    pub create_batch_size: usize,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            update_batch_size: UPDATE_BATCH_SIZE,
            create_batch_size: CREATE_BATCH_SIZE,
        }
    }
}

impl BatchPolicy {
    /// Build a policy; sizes below one are raised to one.
    #[must_use]
    pub fn new(update_batch_size: usize, create_batch_size: usize) -> Self {
        Self {
            update_batch_size: update_batch_size.max(1),
            create_batch_size: create_batch_size.max(1),
        }
    }
}

/// Outcome counts of a profile sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncCounts {
    pub created: usize,
    pub updated: usize,
    /// Size of the remote snapshot, including unchanged records.
    pub total: usize,
}

/// Counts plus the number of store batches issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub counts: SyncCounts,
    pub update_chunks: usize,
    pub create_chunks: usize,
}

/// Writes creates and updates in fixed-size chunks.
///
/// Updates go first, in chunks whose members run concurrently. Creates
/// follow, one bulk insert per chunk. Chunks run one after another and the
/// first failing chunk aborts the run; chunks already written stay written.
#[derive(Clone)]
pub struct BatchWriter {
    store: Arc<dyn DirectoryStore>,
    policy: BatchPolicy,
}

impl BatchWriter {
    /// Create a writer with the default batch sizes.
    #[must_use]
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self::with_policy(store, BatchPolicy::default())
    }

    #[must_use]
    pub fn with_policy(store: Arc<dyn DirectoryStore>, policy: BatchPolicy) -> Self {
        Self { store, policy }
    }

    #[must_use]
    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Apply `plan`; `total` is the size of the remote snapshot it came from.
    ///
    /// # Errors
    ///
    /// Returns the first store error. No later chunk is started after it.
    #[instrument(skip_all, fields(creates = plan.creates.len(), updates = plan.updates.len(), total = total))]
    pub async fn apply(&self, plan: SyncPlan, total: usize) -> SyncResult<WriteReport> {
        let mut report = WriteReport {
            counts: SyncCounts {
                total,
                ..SyncCounts::default()
            },
            ..WriteReport::default()
        };

        for chunk in plan.updates.chunks(self.policy.update_batch_size) {
            report.update_chunks += 1;
            debug!(chunk = report.update_chunks, size = chunk.len(), "Writing update chunk");
            try_join_all(chunk.iter().map(|update| self.write_update(update))).await?;
            report.counts.updated += chunk.len();
        }

        let creates: Vec<NewDirectoryUser> =
            plan.creates.into_iter().map(NewDirectoryUser::from).collect();

        for chunk in creates.chunks(self.policy.create_batch_size) {
            report.create_chunks += 1;
            debug!(chunk = report.create_chunks, size = chunk.len(), "Writing create chunk");
            self.store.insert_many(chunk).await?;
            report.counts.created += chunk.len();
        }

        info!(
            created = report.counts.created,
            updated = report.counts.updated,
            update_chunks = report.update_chunks,
            create_chunks = report.create_chunks,
            "Applied sync plan"
        );

        Ok(report)
    }

    async fn write_update(&self, update: &PlannedUpdate) -> SyncResult<u64> {
        let Some(mail) = update.record.join_mail() else {
            return Ok(0);
        };

        debug!(
            local_id = %update.local_id,
            changed = ?update.changed_fields,
            "Updating directory user"
        );

        Ok(self
            .store
            .update_profile_by_mail(mail, &update.record.remote_id, &update.record.profile)
            .await?)
    }
}
