//! Raw user records as returned by the Graph `/users` collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user record exactly as the directory returned it.
///
/// Profile attributes are kept as raw JSON values so that the normalizer
/// decides how scalars are stringified. Attributes this type does not name
/// are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUserRecord {
    /// Entra object ID.
    #[serde(rename = "id", default)]
    pub remote_id: String,
    /// Primary email address, the natural key shared with the local store.
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub display_name: Option<Value>,
    #[serde(default)]
    pub given_name: Option<Value>,
    #[serde(default)]
    pub job_title: Option<Value>,
    #[serde(default)]
    pub mobile_phone: Option<Value>,
    #[serde(default)]
    pub office_location: Option<Value>,
    #[serde(default)]
    pub preferred_language: Option<Value>,
    #[serde(default)]
    pub surname: Option<Value>,
    #[serde(default)]
    pub user_principal_name: Option<Value>,
    /// Usually a list of strings; some tenants return a single scalar.
    #[serde(default)]
    pub business_phones: Option<Value>,
    /// Every other attribute returned by the API.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of the paginated `/users` collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPage {
    /// Records on this page, in server order.
    pub users: Vec<RemoteUserRecord>,
    /// Absolute URL of the next page, if any.
    pub next_link: Option<String>,
}
