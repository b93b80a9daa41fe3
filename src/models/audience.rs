// src/models/audience.rs

//! Audience payloads exchanged with the GA4 Admin API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GA4 audience, as sent to `create` and returned by `list`/`get`.
///
/// `filter_clauses` is kept as raw JSON: the clauses come from condition
/// templates and are passed through without interpreting GA4's grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceDefinition {
    /// Resource name (`properties/{p}/audiences/{a}`), assigned by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub display_name: String,

    #[serde(default)]
    pub description: String,

    pub membership_duration_days: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ads_personalization_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_duration_mode: Option<String>,

    #[serde(default)]
    pub filter_clauses: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

impl AudienceDefinition {
    /// Service-assigned audience id (last segment of the resource name).
    pub fn audience_id(&self) -> Option<&str> {
        self.name
            .as_deref()
            .and_then(|name| name.rsplit('/').next())
            .filter(|id| !id.is_empty())
    }
}
