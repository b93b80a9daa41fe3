// src/models/preset.rs

//! Ready-made audience presets.

use serde::{Deserialize, Serialize};

/// A named audience recipe whose URL pattern is already compiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudiencePreset {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub membership_duration_days: u32,
    pub conditions: Vec<String>,
    pub url_pattern: String,
}

impl AudiencePreset {
    /// Presets shipped with the tool.
    pub fn builtin() -> Vec<Self> {
        vec![Self {
            id: "pageviews".to_string(),
            display_name: "Page Views (All Pages)".to_string(),
            description: "Users who viewed all pages but didn't make a purchase".to_string(),
            membership_duration_days: 60,
            conditions: vec!["QMF_BASELINE".to_string()],
            url_pattern: "^(/)$".to_string(),
        }]
    }

    /// Look up a built-in preset by id.
    pub fn find(id: &str) -> Option<Self> {
        Self::builtin().into_iter().find(|p| p.id == id)
    }
}
