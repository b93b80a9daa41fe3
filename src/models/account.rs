// src/models/account.rs

//! GA4 account and property listings.

use serde::{Deserialize, Serialize};

/// A GA4 account (`accounts/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub name: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
}

/// A GA4 property (`properties/{id}`) belonging to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,

    #[serde(default)]
    pub display_name: String,

    /// Owning account (`accounts/{id}`)
    #[serde(default)]
    pub parent: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}
