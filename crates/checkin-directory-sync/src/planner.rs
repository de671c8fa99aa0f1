//! Reconciliation planner: classifies remote records against the local set.

use std::collections::HashMap;

use checkin_db::{DirectoryProfile, DirectoryUser};
use uuid::Uuid;

use crate::normalize::NormalizedUserRecord;

/// Text every falsy value compares as.
const FALSY_TEXT: &str = "null";

/// An update of an existing local record.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate {
    /// Local primary key of the matched record.
    pub local_id: Uuid,
    pub record: NormalizedUserRecord,
    /// Compared fields that differ, for logging.
    pub changed_fields: Vec<&'static str>,
}

/// Creates and updates derived from one remote snapshot.
///
/// Both lists keep the order of the remote input. Records equal to their
/// local counterpart appear in neither.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    pub creates: Vec<NormalizedUserRecord>,
    pub updates: Vec<PlannedUpdate>,
}

impl SyncPlan {
    /// True when nothing needs writing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty()
    }
}

/// Mails to look the local set up by: every present, non-empty mail.
#[must_use]
pub fn lookup_mails(remote: &[NormalizedUserRecord]) -> Vec<String> {
    remote
        .iter()
        .filter_map(NormalizedUserRecord::join_mail)
        .map(str::to_string)
        .collect()
}

/// Classify every remote record as create, update or no-op.
///
/// `local` must hold the records found for [`lookup_mails`]. A record without
/// a mail never matches and is always created.
#[must_use]
pub fn plan(remote: Vec<NormalizedUserRecord>, local: Vec<DirectoryUser>) -> SyncPlan {
    let local_by_mail: HashMap<String, DirectoryUser> = local
        .into_iter()
        .filter_map(|user| user.mail.clone().map(|mail| (mail, user)))
        .collect();

    let mut plan = SyncPlan::default();

    for record in remote {
        let existing = record.join_mail().and_then(|mail| local_by_mail.get(mail));

        match existing {
            None => plan.creates.push(record),
            Some(local) => {
                let changed_fields = changed_fields(&record.profile, &local.profile());
                if !changed_fields.is_empty() {
                    plan.updates.push(PlannedUpdate {
                        local_id: local.id,
                        record,
                        changed_fields,
                    });
                }
            }
        }
    }

    plan
}

/// Names of the compared fields whose loose text differs.
#[must_use]
pub fn changed_fields(remote: &DirectoryProfile, local: &DirectoryProfile) -> Vec<&'static str> {
    compared_fields(remote)
        .into_iter()
        .zip(compared_fields(local))
        .filter(|((_, theirs), (_, ours))| !loosely_equal(theirs.as_deref(), ours.as_deref()))
        .map(|((name, _), _)| name)
        .collect()
}

/// Loose comparison: absent, null and empty values are all equal.
#[must_use]
pub fn loosely_equal(a: Option<&str>, b: Option<&str>) -> bool {
    loose_text(a) == loose_text(b)
}

/// The text a value compares as. Falsy values become `"null"`.
#[must_use]
pub fn loose_text(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.is_empty() => text,
        _ => FALSY_TEXT,
    }
}

fn compared_fields(profile: &DirectoryProfile) -> [(&'static str, &Option<String>); 9] {
    [
        ("displayName", &profile.display_name),
        ("givenName", &profile.given_name),
        ("jobTitle", &profile.job_title),
        ("mobilePhone", &profile.mobile_phone),
        ("officeLocation", &profile.office_location),
        ("preferredLanguage", &profile.preferred_language),
        ("surname", &profile.surname),
        ("userPrincipalName", &profile.user_principal_name),
        ("businessPhones", &profile.business_phones),
    ]
}
