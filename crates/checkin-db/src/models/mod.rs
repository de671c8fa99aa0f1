//! Database models.

pub mod directory_user;

pub use directory_user::{DirectoryProfile, DirectoryUser, NewDirectoryUser};
