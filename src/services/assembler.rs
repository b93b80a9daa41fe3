// src/services/assembler.rs

//! Audience filter assembly.
//!
//! Combines compiled URL patterns with the requested condition templates into
//! a complete `AudienceDefinition`. All input checks run before anything is
//! built, so a bad request never reaches the GA4 client.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{AudienceConfig, AudienceDefinition, AudiencePreset, CompactorConfig};
use crate::services::compactor;
use crate::services::conditions::ConditionStore;

/// Builds audience definitions from conditions and URL patterns.
#[derive(Debug, Clone)]
pub struct AudienceAssembler {
    store: Arc<ConditionStore>,
    audience: AudienceConfig,
    max_pattern_length: usize,
}

impl AudienceAssembler {
    pub fn new(
        store: Arc<ConditionStore>,
        audience: &AudienceConfig,
        compactor: &CompactorConfig,
    ) -> Self {
        Self {
            store,
            audience: audience.clone(),
            max_pattern_length: compactor.max_pattern_length,
        }
    }

    pub fn store(&self) -> &ConditionStore {
        &self.store
    }

    /// Duration used when a request names none.
    pub fn default_membership_days(&self) -> u32 {
        self.audience.default_membership_days
    }

    /// Wrap a compiled pattern as a case-insensitive full-regex page filter.
    pub fn url_pattern_expression(&self, pattern: &str) -> Value {
        json!({
            "dimensionOrMetricFilter": {
                "fieldName": self.audience.page_path_dimension,
                "atAnyPointInTime": true,
                "inAnyNDayPeriod": 0,
                "stringFilter": {
                    "matchType": "FULL_REGEXP",
                    "value": pattern,
                    "caseSensitive": false
                }
            }
        })
    }

    /// Assemble an audience from condition names and compiled URL patterns.
    ///
    /// Clauses follow the order the conditions were requested in.
    pub fn assemble(
        &self,
        condition_names: &[String],
        generated_patterns: &[String],
        display_name: &str,
        membership_duration_days: u32,
    ) -> Result<AudienceDefinition> {
        if condition_names.is_empty() {
            return Err(AppError::validation(
                "conditions",
                "at least one condition is required",
            ));
        }
        if let Some(name) = self.store.missing(condition_names).first() {
            return Err(AppError::UnknownCondition((*name).to_string()));
        }
        if generated_patterns.is_empty() {
            return Err(AppError::validation(
                "patterns",
                "no URL patterns were generated",
            ));
        }
        if display_name.trim().is_empty() {
            return Err(AppError::validation("displayName", "must not be empty"));
        }
        self.check_duration(membership_duration_days)?;

        let expressions: Vec<Value> = generated_patterns
            .iter()
            .map(|p| self.url_pattern_expression(p))
            .collect();

        let mut filter_clauses = Vec::new();
        for name in condition_names {
            let condition = self.store.get(name)?;
            filter_clauses.extend(condition.instantiate(&expressions));
        }

        Ok(AudienceDefinition {
            name: None,
            display_name: display_name.trim().to_string(),
            description: self.describe(condition_names),
            membership_duration_days,
            ads_personalization_enabled: None,
            exclusion_duration_mode: None,
            filter_clauses,
            create_time: None,
        })
    }

    /// Compact raw landing-page URLs and assemble the audience.
    pub fn build_filter(
        &self,
        condition_names: &[String],
        raw_urls: &[String],
        display_name: &str,
        membership_duration_days: u32,
    ) -> Result<AudienceDefinition> {
        if raw_urls.is_empty() {
            return Err(AppError::validation("urls", "at least one URL is required"));
        }

        let patterns = compactor::compact(raw_urls, self.max_pattern_length);
        if patterns.is_empty() {
            return Err(AppError::validation(
                "urls",
                format!("none of the {} URLs could be parsed", raw_urls.len()),
            ));
        }
        log::debug!(
            "Compacted {} URLs into {} patterns",
            raw_urls.len(),
            patterns.len()
        );

        self.assemble(
            condition_names,
            &patterns,
            display_name,
            membership_duration_days,
        )
    }

    /// Assemble a built-in preset, keeping its own description.
    pub fn from_preset(&self, preset: &AudiencePreset) -> Result<AudienceDefinition> {
        let mut audience = self.assemble(
            &preset.conditions,
            std::slice::from_ref(&preset.url_pattern),
            &preset.display_name,
            preset.membership_duration_days,
        )?;
        audience.description = preset.description.clone();
        Ok(audience)
    }

    fn check_duration(&self, days: u32) -> Result<()> {
        let max = self.audience.max_membership_days;
        if days == 0 || days > max {
            return Err(AppError::validation(
                "membershipDurationDays",
                format!("{days} is outside 1..={max}"),
            ));
        }
        Ok(())
    }

    fn describe(&self, condition_names: &[String]) -> String {
        format!(
            "{} (conditions: {})",
            self.audience.default_description,
            condition_names.join(", ")
        )
    }
}
