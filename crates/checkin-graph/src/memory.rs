//! In-memory directory for tests and local development.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::source::DirectorySource;
use crate::users::{RemoteUserRecord, UserPage};
use crate::{GraphError, GraphResult};

const CURSOR_PREFIX: &str = "memory://users?page=";

/// In-memory implementation of [`DirectorySource`].
///
/// Users are served in pages of `page_size`, chained with synthetic cursor
/// links. Photo fetches yield once before answering so that concurrent
/// callers actually overlap, and the peak overlap is recorded.
#[derive(Debug)]
pub struct InMemoryDirectorySource {
    users: RwLock<Vec<RemoteUserRecord>>,
    page_size: usize,
    photos: RwLock<HashMap<String, Vec<u8>>>,
    failing_photos: RwLock<HashSet<String>>,
    users_failure: RwLock<Option<u16>>,
    page_requests: AtomicUsize,
    photo_requests: AtomicUsize,
    photos_in_flight: AtomicUsize,
    peak_photos_in_flight: AtomicUsize,
}

impl Default for InMemoryDirectorySource {
    fn default() -> Self {
        Self::new(100)
    }
}

impl InMemoryDirectorySource {
    /// Create an empty directory serving pages of `page_size` users.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            page_size: page_size.max(1),
            photos: RwLock::new(HashMap::new()),
            failing_photos: RwLock::new(HashSet::new()),
            users_failure: RwLock::new(None),
            page_requests: AtomicUsize::new(0),
            photo_requests: AtomicUsize::new(0),
            photos_in_flight: AtomicUsize::new(0),
            peak_photos_in_flight: AtomicUsize::new(0),
        }
    }

    /// Replace the directory contents.
    pub fn set_users(&self, users: Vec<RemoteUserRecord>) {
        *self.users.write().expect("lock poisoned") = users;
    }

    /// Register avatar bytes for `mail`.
    pub fn add_photo(&self, mail: &str, bytes: Vec<u8>) {
        self.photos
            .write()
            .expect("lock poisoned")
            .insert(mail.to_string(), bytes);
    }

    /// Make the avatar fetch for `mail` fail with a 500.
    pub fn fail_photo(&self, mail: &str) {
        self.failing_photos
            .write()
            .expect("lock poisoned")
            .insert(mail.to_string());
    }

    /// Make every page request answer with `status`.
    pub fn fail_users_with(&self, status: u16) {
        *self.users_failure.write().expect("lock poisoned") = Some(status);
    }

    /// Number of page requests served so far.
    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    /// Number of photo requests served so far.
    pub fn photo_requests(&self) -> usize {
        self.photo_requests.load(Ordering::SeqCst)
    }

    /// Highest number of photo fetches that were in flight at once.
    pub fn peak_photos_in_flight(&self) -> usize {
        self.peak_photos_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectorySource for InMemoryDirectorySource {
    async fn fetch_users_page(
        &self,
        _token: &SecretString,
        cursor: Option<&str>,
    ) -> GraphResult<UserPage> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = *self.users_failure.read().expect("lock poisoned") {
            return Err(error_for_status(status, "users"));
        }

        let page_index = match cursor {
            None => 0,
            Some(link) => link
                .strip_prefix(CURSOR_PREFIX)
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| GraphError::Config(format!("Unknown cursor: {link}")))?,
        };

        let users = self.users.read().expect("lock poisoned");
        let start = page_index * self.page_size;
        let end = (start + self.page_size).min(users.len());
        let page = users.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_link = (end < users.len()).then(|| format!("{CURSOR_PREFIX}{}", page_index + 1));

        Ok(UserPage {
            users: page,
            next_link,
        })
    }

    async fn fetch_photo(&self, _token: &SecretString, mail: &str) -> GraphResult<Vec<u8>> {
        self.photo_requests.fetch_add(1, Ordering::SeqCst);
        let now = self.photos_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_photos_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::task::yield_now().await;

        let result = if self
            .failing_photos
            .read()
            .expect("lock poisoned")
            .contains(mail)
        {
            Err(error_for_status(500, mail))
        } else {
            self.photos
                .read()
                .expect("lock poisoned")
                .get(mail)
                .cloned()
                .ok_or_else(|| GraphError::NotFound(format!("ImageNotFound - no photo for {mail}")))
        };

        self.photos_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn error_for_status(status: u16, target: &str) -> GraphError {
    match status {
        401 => GraphError::Unauthorized(format!("token rejected for {target}")),
        403 => GraphError::PermissionDenied(format!("access denied for {target}")),
        _ => GraphError::GraphApi {
            status,
            code: "InternalServerError".to_string(),
            message: format!("request for {target} failed"),
        },
    }
}
