//! Request and response bodies for the directory sync endpoints.

use checkin_directory_sync::{PhotoSyncDetail, PhotoSyncReport, SyncCounts};
use serde::{Deserialize, Serialize};

pub const USERS_SYNCED_MESSAGE: &str = "Sync completed.";
pub const PHOTOS_SYNCED_MESSAGE: &str = "Photo sync completed.";
pub const NOTHING_TO_SYNC_MESSAGE: &str = "No users need a photo sync.";

/// Body of `POST /admin/directory/sync/users`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncUsersRequest {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// A single id or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(id) => vec![id],
            OneOrMany::Many(ids) => ids,
        }
    }
}

/// Body of `POST /admin/directory/sync/photos`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPhotosRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    /// Records to sync; all records without a photo when absent or empty.
    #[serde(default)]
    pub id: Option<OneOrMany>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncUsersResponse {
    pub message: String,
    pub created: usize,
    pub updated: usize,
    pub total: usize,
}

impl From<SyncCounts> for SyncUsersResponse {
    fn from(counts: SyncCounts) -> Self {
        Self {
            message: USERS_SYNCED_MESSAGE.to_string(),
            created: counts.created,
            updated: counts.updated,
            total: counts.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPhotosReportResponse {
    pub message: String,
    pub successful_updates: usize,
    pub failed_updates: usize,
    pub details: Vec<PhotoSyncDetail>,
}

impl From<PhotoSyncReport> for SyncPhotosReportResponse {
    fn from(report: PhotoSyncReport) -> Self {
        Self {
            message: PHOTOS_SYNCED_MESSAGE.to_string(),
            successful_updates: report.successful_updates,
            failed_updates: report.failed_updates,
            details: report.details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response of `POST /admin/directory/sync/photos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SyncPhotosResponse {
    Report(SyncPhotosReportResponse),
    NothingToSync(MessageResponse),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_accepts_string_or_list() {
        let one: SyncPhotosRequest =
            serde_json::from_value(json!({ "accessToken": "t", "id": "abc" })).unwrap();
        let many: SyncPhotosRequest =
            serde_json::from_value(json!({ "accessToken": "t", "id": ["a", "b"] })).unwrap();
        let none: SyncPhotosRequest = serde_json::from_value(json!({ "accessToken": "t" })).unwrap();

        assert_eq!(one.id.unwrap().into_vec(), vec!["abc".to_string()]);
        assert_eq!(many.id.unwrap().into_vec().len(), 2);
        assert!(none.id.is_none());
    }

    #[test]
    fn test_missing_token_deserializes() {
        let request: SyncUsersRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.access_token.is_none());
    }

    #[test]
    fn test_photo_report_is_camel_case() {
        let response = SyncPhotosResponse::Report(SyncPhotosReportResponse {
            message: PHOTOS_SYNCED_MESSAGE.to_string(),
            successful_updates: 1,
            failed_updates: 0,
            details: Vec::new(),
        });

        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["successfulUpdates"], 1);
        assert_eq!(value["failedUpdates"], 0);
    }
}
