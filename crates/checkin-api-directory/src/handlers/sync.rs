//! Sync trigger handlers.
//!
//! - POST /admin/directory/sync/users: Mirror the remote user directory
//! - POST /admin/directory/sync/photos: Fetch missing or selected avatars

use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::{Extension, Json};
use checkin_directory_sync::{PhotoSyncOutcome, PhotoTarget, ProfileSyncOutcome};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::DirectoryApiError;
use crate::models::{
    MessageResponse, SyncPhotosRequest, SyncPhotosResponse, SyncUsersRequest, SyncUsersResponse,
    NOTHING_TO_SYNC_MESSAGE,
};
use crate::router::DirectorySyncState;

/// Mirror every remote user into the local store.
pub async fn sync_users(
    Extension(state): Extension<DirectorySyncState>,
    request: Request,
) -> Result<Json<SyncUsersResponse>, DirectoryApiError> {
    let request: SyncUsersRequest = read_body(request).await?;
    let token = access_token(request.access_token)?;

    match state.profile_sync.run(&token).await? {
        ProfileSyncOutcome::NoRemoteUsers => Err(DirectoryApiError::NoRemoteUsers),
        ProfileSyncOutcome::Synced(counts) => {
            tracing::info!(
                created = counts.created,
                updated = counts.updated,
                total = counts.total,
                "Directory user sync finished"
            );
            Ok(Json(counts.into()))
        }
    }
}

/// Fetch avatars for the requested records, or for every record without one.
pub async fn sync_photos(
    Extension(state): Extension<DirectorySyncState>,
    request: Request,
) -> Result<Json<SyncPhotosResponse>, DirectoryApiError> {
    let request: SyncPhotosRequest = read_body(request).await?;
    let token = access_token(request.access_token)?;
    let ids = parse_ids(request.id.map(|id| id.into_vec()).unwrap_or_default())?;

    let response = match state.photo_sync.run(&token, PhotoTarget::from_ids(ids)).await? {
        PhotoSyncOutcome::NothingToSync => SyncPhotosResponse::NothingToSync(MessageResponse {
            message: NOTHING_TO_SYNC_MESSAGE.to_string(),
        }),
        PhotoSyncOutcome::Completed(report) => SyncPhotosResponse::Report(report.into()),
    };

    Ok(Json(response))
}

/// Upper bound on a trigger request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Decode a JSON trigger body.
///
/// A request without a JSON content type or with an empty body decodes to
/// the default request, so it fails later on the missing token.
async fn read_body<T>(request: Request) -> Result<T, DirectoryApiError>
where
    T: DeserializeOwned + Default,
{
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(is_json_content_type);

    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| DirectoryApiError::InvalidBody(format!("Failed to read request body: {e}")))?;

    if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| DirectoryApiError::InvalidBody(format!("Invalid JSON: {e}")))
}

fn is_json_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("application/json")
        || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn access_token(raw: Option<String>) -> Result<SecretString, DirectoryApiError> {
    raw.filter(|token| !token.trim().is_empty())
        .map(SecretString::from)
        .ok_or(DirectoryApiError::MissingAccessToken)
}

fn parse_ids(raw: Vec<String>) -> Result<Vec<Uuid>, DirectoryApiError> {
    raw.into_iter()
        .map(|id| Uuid::parse_str(id.trim()).map_err(|_| DirectoryApiError::InvalidId(id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_rejects_blank() {
        assert!(access_token(None).is_err());
        assert!(access_token(Some("  ".to_string())).is_err());
        assert!(access_token(Some("abc".to_string())).is_ok());
    }

    #[test]
    fn test_json_content_type_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("application/merge-patch+json"));
        assert!(!is_json_content_type("text/plain"));
        assert!(!is_json_content_type(""));
    }

    #[tokio::test]
    async fn test_read_body_defaults_without_content() {
        let request = axum::http::Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        let body: SyncPhotosRequest = read_body(request).await.unwrap();
        assert!(body.access_token.is_none());
        assert!(body.id.is_none());
    }

    #[tokio::test]
    async fn test_read_body_rejects_malformed_json() {
        let request = axum::http::Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(r#"{"accessToken":"t","id":5}"#))
            .unwrap();
        let result: Result<SyncPhotosRequest, _> = read_body(request).await;
        assert!(matches!(result, Err(DirectoryApiError::InvalidBody(_))));
    }

    #[test]
    fn test_parse_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_ids(vec![id.to_string()]).unwrap(), vec![id]);
        assert!(parse_ids(Vec::new()).unwrap().is_empty());
        assert!(matches!(
            parse_ids(vec!["not-a-uuid".to_string()]),
            Err(DirectoryApiError::InvalidId(id)) if id == "not-a-uuid"
        ));
    }
}
