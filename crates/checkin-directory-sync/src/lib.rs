//! # Directory Sync
//!
//! Mirrors the organisation's remote user directory into the local
//! check-in store.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌────────────┐    ┌───────────┐    ┌──────────────┐
//! │ Graph pages  │───►│ Normalizer │───►│  Planner  │───►│ Batch Writer │
//! │ (sequential) │    │            │    │ (by mail) │    │ (50 / 100)   │
//! └──────────────┘    └────────────┘    └───────────┘    └──────────────┘
//! ```
//!
//! Photo sync is a separate pipeline: it selects local records, fetches each
//! avatar independently and stores it base64-encoded. One failing record
//! never aborts the others.
//!
//! ## Example
//!
//! ```ignore
//! use checkin_directory_sync::{ProfileSync, ProfileSyncOutcome, PgDirectoryStore};
//!
//! let sync = ProfileSync::new(Arc::new(graph_client), Arc::new(PgDirectoryStore::new(pool)));
//! match sync.run(&token).await? {
//!     ProfileSyncOutcome::Synced(counts) => println!("{} created", counts.created),
//!     ProfileSyncOutcome::NoRemoteUsers => println!("empty directory"),
//! }
//! ```

pub mod batch_writer;
pub mod error;
pub mod normalize;
pub mod photos;
pub mod planner;
pub mod service;
pub mod store;

pub use batch_writer::{
    BatchPolicy, BatchWriter, SyncCounts, WriteReport, CREATE_BATCH_SIZE, UPDATE_BATCH_SIZE,
};
pub use error::{DirectorySyncError, SyncResult};
pub use normalize::{normalize, normalize_all, NormalizedUserRecord};
pub use photos::{
    PhotoSync, PhotoSyncDetail, PhotoSyncOutcome, PhotoSyncReport, PhotoTarget,
    DEFAULT_PHOTO_CONCURRENCY,
};
pub use planner::{lookup_mails, plan, PlannedUpdate, SyncPlan};
pub use service::{ProfileSync, ProfileSyncOutcome};
pub use store::{DirectoryStore, InMemoryDirectoryStore, PgDirectoryStore, StoreCall};
