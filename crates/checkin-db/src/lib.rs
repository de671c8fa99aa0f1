//! Postgres persistence for the check-in directory.
//!
//! Holds the local mirror of the remote user directory (`directory_users`)
//! together with the connection pool and embedded migrations.
//!
//! # Example
//!
//! ```rust,ignore
//! use checkin_db::{run_migrations, DbPool, DirectoryUser};
//!
//! let pool = DbPool::connect("postgres://localhost/checkin").await?;
//! run_migrations(&pool).await?;
//! let missing = DirectoryUser::find_without_photo(pool.inner()).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::{DirectoryProfile, DirectoryUser, NewDirectoryUser};
pub use pool::{DbPool, DEFAULT_MAX_CONNECTIONS};
