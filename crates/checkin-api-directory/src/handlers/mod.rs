//! HTTP handlers for the directory sync API.

pub mod sync;
