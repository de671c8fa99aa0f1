//! Maps raw directory records into the local record shape.

use checkin_db::{DirectoryProfile, NewDirectoryUser};
use checkin_graph::RemoteUserRecord;
use serde_json::{Map, Number, Value};

/// Separator used when flattening a list of business phones.
pub const PHONE_SEPARATOR: &str = ", ";

/// A remote record reshaped for the local store.
///
/// The remote object ID lives in `remote_id`, never in the local `id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedUserRecord {
    pub remote_id: String,
    pub mail: Option<String>,
    pub profile: DirectoryProfile,
    /// Attributes the store does not model, kept untouched.
    pub extra: Map<String, Value>,
}

impl NormalizedUserRecord {
    /// The join key, if present and non-empty.
    #[must_use]
    pub fn join_mail(&self) -> Option<&str> {
        self.mail.as_deref().filter(|mail| !mail.is_empty())
    }
}

impl From<NormalizedUserRecord> for NewDirectoryUser {
    fn from(record: NormalizedUserRecord) -> Self {
        NewDirectoryUser {
            remote_id: record.remote_id,
            mail: record.mail,
            profile: record.profile,
        }
    }
}

/// Normalize one remote record. Pure; performs no I/O.
#[must_use]
pub fn normalize(record: RemoteUserRecord) -> NormalizedUserRecord {
    let profile = DirectoryProfile {
        display_name: record.display_name.and_then(scalar_text),
        given_name: record.given_name.and_then(scalar_text),
        job_title: record.job_title.and_then(scalar_text),
        mobile_phone: record.mobile_phone.and_then(scalar_text),
        office_location: record.office_location.and_then(scalar_text),
        preferred_language: record.preferred_language.and_then(scalar_text),
        surname: record.surname.and_then(scalar_text),
        user_principal_name: record.user_principal_name.and_then(scalar_text),
        business_phones: record.business_phones.and_then(business_phones_text),
    };

    NormalizedUserRecord {
        remote_id: record.remote_id,
        mail: record.mail,
        profile,
        extra: record.extra,
    }
}

/// Normalize a whole page or collection, preserving order.
#[must_use]
pub fn normalize_all(records: Vec<RemoteUserRecord>) -> Vec<NormalizedUserRecord> {
    records.into_iter().map(normalize).collect()
}

/// Flatten `businessPhones`: lists are joined, scalars pass through.
fn business_phones_text(value: Value) -> Option<String> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| scalar_text(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(PHONE_SEPARATOR),
        ),
        other => scalar_text(other),
    }
}

/// Text form of a JSON value, formatted the way a browser would print it.
///
/// `null` has no text form. Nested lists join with `,`; objects are kept as
/// compact JSON.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_text(&n)),
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| scalar_text(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(map) => Some(Value::Object(map).to_string()),
    }
}

fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        // Integral floats print without a fractional part ("3", not "3.0").
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
