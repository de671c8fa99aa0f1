//! Directory user entity model.
//!
//! A local mirror of one person from the organisation's remote directory,
//! joined to the remote record by `mail`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// A mirrored directory user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DirectoryUser {
    /// Store-assigned identifier.
    pub id: Uuid,

    /// Object ID in the remote directory.
    pub remote_id: String,

    /// Email address; unique, and the join key against the remote directory.
    pub mail: Option<String>,

    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub job_title: Option<String>,
    pub mobile_phone: Option<String>,
    pub office_location: Option<String>,
    pub preferred_language: Option<String>,
    pub surname: Option<String>,
    pub user_principal_name: Option<String>,

    /// Business phone numbers joined with ", ".
    pub business_phones: Option<String>,

    /// Base64-encoded avatar. Only written by the photo sync.
    pub photo: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile attributes mirrored from the remote directory.
///
/// These are exactly the columns the profile sync compares and rewrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryProfile {
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub job_title: Option<String>,
    pub mobile_phone: Option<String>,
    pub office_location: Option<String>,
    pub preferred_language: Option<String>,
    pub surname: Option<String>,
    pub user_principal_name: Option<String>,
    pub business_phones: Option<String>,
}

/// Input for inserting a new directory user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDirectoryUser {
    pub remote_id: String,
    pub mail: Option<String>,
    pub profile: DirectoryProfile,
}

impl DirectoryUser {
    /// Returns the profile columns of this row.
    #[must_use]
    pub fn profile(&self) -> DirectoryProfile {
        DirectoryProfile {
            display_name: self.display_name.clone(),
            given_name: self.given_name.clone(),
            job_title: self.job_title.clone(),
            mobile_phone: self.mobile_phone.clone(),
            office_location: self.office_location.clone(),
            preferred_language: self.preferred_language.clone(),
            surname: self.surname.clone(),
            user_principal_name: self.user_principal_name.clone(),
            business_phones: self.business_phones.clone(),
        }
    }

    /// Find all users whose mail is in `mails`, in one round trip.
    pub async fn find_by_mails(pool: &PgPool, mails: &[String]) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM directory_users
            WHERE mail = ANY($1)
            ",
        )
        .bind(mails)
        .fetch_all(pool)
        .await
    }

    /// Find users by identifier.
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM directory_users
            WHERE id = ANY($1)
            ORDER BY created_at, id
            ",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Find every user that has no avatar yet.
    pub async fn find_without_photo(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM directory_users
            WHERE photo IS NULL
            ORDER BY created_at, id
            ",
        )
        .fetch_all(pool)
        .await
    }

    /// Insert a batch of users with a single statement.
    ///
    /// Returns the number of inserted rows. The statement is atomic: a
    /// duplicate mail rejects the whole batch.
    pub async fn insert_many(pool: &PgPool, users: &[NewDirectoryUser]) -> Result<u64, sqlx::Error> {
        if users.is_empty() {
            return Ok(0);
        }

        let column = |f: &dyn Fn(&NewDirectoryUser) -> Option<String>| -> Vec<Option<String>> {
            users.iter().map(f).collect()
        };

        let remote_ids: Vec<String> = users.iter().map(|u| u.remote_id.clone()).collect();
        let mails = column(&|u| u.mail.clone());
        let display_names = column(&|u| u.profile.display_name.clone());
        let given_names = column(&|u| u.profile.given_name.clone());
        let job_titles = column(&|u| u.profile.job_title.clone());
        let mobile_phones = column(&|u| u.profile.mobile_phone.clone());
        let office_locations = column(&|u| u.profile.office_location.clone());
        let preferred_languages = column(&|u| u.profile.preferred_language.clone());
        let surnames = column(&|u| u.profile.surname.clone());
        let user_principal_names = column(&|u| u.profile.user_principal_name.clone());
        let business_phones = column(&|u| u.profile.business_phones.clone());

        let result = sqlx::query(
            r"
            INSERT INTO directory_users (
                remote_id, mail, display_name, given_name, job_title,
                mobile_phone, office_location, preferred_language, surname,
                user_principal_name, business_phones
            )
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::text[], $4::text[], $5::text[],
                $6::text[], $7::text[], $8::text[], $9::text[],
                $10::text[], $11::text[]
            )
            ",
        )
        .bind(&remote_ids)
        .bind(&mails)
        .bind(&display_names)
        .bind(&given_names)
        .bind(&job_titles)
        .bind(&mobile_phones)
        .bind(&office_locations)
        .bind(&preferred_languages)
        .bind(&surnames)
        .bind(&user_principal_names)
        .bind(&business_phones)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Overwrite the profile columns and remote id of the user with `mail`.
    ///
    /// `id`, `mail` and `photo` are never touched. Returns the number of
    /// updated rows.
    pub async fn update_profile_by_mail(
        pool: &PgPool,
        mail: &str,
        remote_id: &str,
        profile: &DirectoryProfile,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE directory_users
            SET remote_id = $2,
                display_name = $3,
                given_name = $4,
                job_title = $5,
                mobile_phone = $6,
                office_location = $7,
                preferred_language = $8,
                surname = $9,
                user_principal_name = $10,
                business_phones = $11,
                updated_at = NOW()
            WHERE mail = $1
            ",
        )
        .bind(mail)
        .bind(remote_id)
        .bind(&profile.display_name)
        .bind(&profile.given_name)
        .bind(&profile.job_title)
        .bind(&profile.mobile_phone)
        .bind(&profile.office_location)
        .bind(&profile.preferred_language)
        .bind(&profile.surname)
        .bind(&profile.user_principal_name)
        .bind(&profile.business_phones)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Store a base64 avatar for the user with `mail`.
    pub async fn update_photo_by_mail(
        pool: &PgPool,
        mail: &str,
        photo: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE directory_users
            SET photo = $2, updated_at = NOW()
            WHERE mail = $1
            ",
        )
        .bind(mail)
        .bind(photo)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
