//! Store contract for the sync engine, with Postgres and in-memory adapters.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use checkin_db::{DbError, DbPool, DirectoryProfile, DirectoryUser, NewDirectoryUser};
use chrono::Utc;
use uuid::Uuid;

/// Persistence operations the sync engine needs.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Every record whose mail is in `mails`.
    async fn find_by_mails(&self, mails: &[String]) -> Result<Vec<DirectoryUser>, DbError>;

    /// Records with the given identifiers; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<DirectoryUser>, DbError>;

    /// Records without an avatar.
    async fn find_without_photo(&self) -> Result<Vec<DirectoryUser>, DbError>;

    /// Insert a batch atomically. Returns the number of inserted records.
    async fn insert_many(&self, users: &[NewDirectoryUser]) -> Result<u64, DbError>;

    /// Overwrite the profile and remote id of the record with `mail`.
    async fn update_profile_by_mail(
        &self,
        mail: &str,
        remote_id: &str,
        profile: &DirectoryProfile,
    ) -> Result<u64, DbError>;

    /// Store a base64 avatar for the record with `mail`.
    async fn update_photo_by_mail(&self, mail: &str, photo: &str) -> Result<u64, DbError>;
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgDirectoryStore {
    pool: DbPool,
}

impl PgDirectoryStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn find_by_mails(&self, mails: &[String]) -> Result<Vec<DirectoryUser>, DbError> {
        Ok(DirectoryUser::find_by_mails(self.pool.inner(), mails).await?)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<DirectoryUser>, DbError> {
        Ok(DirectoryUser::find_by_ids(self.pool.inner(), ids).await?)
    }

    async fn find_without_photo(&self) -> Result<Vec<DirectoryUser>, DbError> {
        Ok(DirectoryUser::find_without_photo(self.pool.inner()).await?)
    }

    async fn insert_many(&self, users: &[NewDirectoryUser]) -> Result<u64, DbError> {
        Ok(DirectoryUser::insert_many(self.pool.inner(), users).await?)
    }

    async fn update_profile_by_mail(
        &self,
        mail: &str,
        remote_id: &str,
        profile: &DirectoryProfile,
    ) -> Result<u64, DbError> {
        Ok(DirectoryUser::update_profile_by_mail(self.pool.inner(), mail, remote_id, profile).await?)
    }

    async fn update_photo_by_mail(&self, mail: &str, photo: &str) -> Result<u64, DbError> {
        Ok(DirectoryUser::update_photo_by_mail(self.pool.inner(), mail, photo).await?)
    }
}

/// A store call, as recorded by [`InMemoryDirectoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FindByMails(usize),
    FindByIds(usize),
    FindWithoutPhoto,
    InsertMany(usize),
    UpdateProfile(String),
    UpdatePhoto(String),
}

/// In-memory implementation of `DirectoryStore` for testing.
///
/// Mirrors the Postgres adapter's behaviour: mails are unique, inserts are
/// atomic, and updates of unknown mails affect zero rows. Profile writes
/// yield once mid-flight so concurrent callers overlap; the peak overlap is
/// recorded.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryStore {
    users: RwLock<Vec<DirectoryUser>>,
    calls: Mutex<Vec<StoreCall>>,
    failing_mails: RwLock<HashSet<String>>,
    fail_inserts: RwLock<bool>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl InMemoryDirectoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `users`.
    #[must_use]
    pub fn with_users(users: Vec<DirectoryUser>) -> Self {
        let store = Self::new();
        *store.users.write().expect("lock poisoned") = users;
        store
    }

    /// All records (for testing).
    pub fn users(&self) -> Vec<DirectoryUser> {
        self.users.read().expect("lock poisoned").clone()
    }

    /// The record with `mail` (for testing).
    pub fn get_by_mail(&self, mail: &str) -> Option<DirectoryUser> {
        self.users
            .read()
            .expect("lock poisoned")
            .iter()
            .find(|u| u.mail.as_deref() == Some(mail))
            .cloned()
    }

    /// Every call made so far, in order (for testing).
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Forget the recorded calls (for testing).
    pub fn clear_calls(&self) {
        self.calls.lock().expect("lock poisoned").clear();
        self.peak_in_flight.store(0, Ordering::SeqCst);
    }

    /// Sizes of every `insert_many` call, in order (for testing).
    pub fn insert_batches(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::InsertMany(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Number of write calls made so far (for testing).
    pub fn write_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    StoreCall::InsertMany(_) | StoreCall::UpdateProfile(_) | StoreCall::UpdatePhoto(_)
                )
            })
            .count()
    }

    /// Highest number of profile updates that were in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Make every write for `mail` fail (for testing).
    pub fn fail_writes_for(&self, mail: &str) {
        self.failing_mails
            .write()
            .expect("lock poisoned")
            .insert(mail.to_string());
    }

    /// Make every `insert_many` call fail (for testing).
    pub fn fail_inserts(&self) {
        *self.fail_inserts.write().expect("lock poisoned") = true;
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().expect("lock poisoned").push(call);
    }

    fn check_writable(&self, mail: &str) -> Result<(), DbError> {
        if self.failing_mails.read().expect("lock poisoned").contains(mail) {
            return Err(DbError::QueryFailed(sqlx::Error::Protocol(format!(
                "write rejected for {mail}"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn find_by_mails(&self, mails: &[String]) -> Result<Vec<DirectoryUser>, DbError> {
        self.record(StoreCall::FindByMails(mails.len()));
        let wanted: HashSet<&str> = mails.iter().map(String::as_str).collect();

        Ok(self
            .users
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|u| u.mail.as_deref().is_some_and(|m| wanted.contains(m)))
            .cloned()
            .collect())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<DirectoryUser>, DbError> {
        self.record(StoreCall::FindByIds(ids.len()));

        Ok(self
            .users
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_without_photo(&self) -> Result<Vec<DirectoryUser>, DbError> {
        self.record(StoreCall::FindWithoutPhoto);

        Ok(self
            .users
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|u| u.photo.is_none())
            .cloned()
            .collect())
    }

    async fn insert_many(&self, users: &[NewDirectoryUser]) -> Result<u64, DbError> {
        self.record(StoreCall::InsertMany(users.len()));

        if *self.fail_inserts.read().expect("lock poisoned") {
            return Err(DbError::QueryFailed(sqlx::Error::PoolTimedOut));
        }

        let mut stored = self.users.write().expect("lock poisoned");
        let mut taken: HashSet<String> = stored.iter().filter_map(|u| u.mail.clone()).collect();
        for user in users {
            if let Some(mail) = &user.mail {
                if !taken.insert(mail.clone()) {
                    return Err(DbError::Conflict(format!("mail {mail} already exists")));
                }
            }
        }

        let now = Utc::now();
        stored.extend(users.iter().map(|user| DirectoryUser {
            id: Uuid::new_v4(),
            remote_id: user.remote_id.clone(),
            mail: user.mail.clone(),
            display_name: user.profile.display_name.clone(),
            given_name: user.profile.given_name.clone(),
            job_title: user.profile.job_title.clone(),
            mobile_phone: user.profile.mobile_phone.clone(),
            office_location: user.profile.office_location.clone(),
            preferred_language: user.profile.preferred_language.clone(),
            surname: user.profile.surname.clone(),
            user_principal_name: user.profile.user_principal_name.clone(),
            business_phones: user.profile.business_phones.clone(),
            photo: None,
            created_at: now,
            updated_at: now,
        }));

        Ok(users.len() as u64)
    }

    async fn update_profile_by_mail(
        &self,
        mail: &str,
        remote_id: &str,
        profile: &DirectoryProfile,
    ) -> Result<u64, DbError> {
        self.record(StoreCall::UpdateProfile(mail.to_string()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::task::yield_now().await;

        let result = self.check_writable(mail).map(|()| {
            let mut stored = self.users.write().expect("lock poisoned");
            let mut updated = 0;
            for user in stored.iter_mut().filter(|u| u.mail.as_deref() == Some(mail)) {
                user.remote_id = remote_id.to_string();
                user.display_name = profile.display_name.clone();
                user.given_name = profile.given_name.clone();
                user.job_title = profile.job_title.clone();
                user.mobile_phone = profile.mobile_phone.clone();
                user.office_location = profile.office_location.clone();
                user.preferred_language = profile.preferred_language.clone();
                user.surname = profile.surname.clone();
                user.user_principal_name = profile.user_principal_name.clone();
                user.business_phones = profile.business_phones.clone();
                user.updated_at = Utc::now();
                updated += 1;
            }
            updated
        });

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn update_photo_by_mail(&self, mail: &str, photo: &str) -> Result<u64, DbError> {
        self.record(StoreCall::UpdatePhoto(mail.to_string()));
        self.check_writable(mail)?;

        let mut stored = self.users.write().expect("lock poisoned");
        let mut updated = 0;
        for user in stored.iter_mut().filter(|u| u.mail.as_deref() == Some(mail)) {
            user.photo = Some(photo.to_string());
            user.updated_at = Utc::now();
            updated += 1;
        }
        Ok(updated)
    }
}
