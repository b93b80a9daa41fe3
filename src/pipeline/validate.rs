// src/pipeline/validate.rs

use std::path::Path;

use serde::Serialize;

use crate::config::load_all;
use crate::error::Result;

/// What a successful validation found.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub conditions: Vec<String>,
    pub max_pattern_length: usize,
    pub max_concurrent: usize,
    pub call_timeout_secs: u64,
}

/// Validate configuration and the condition catalog.
pub fn run_validate(storage_dir: &Path) -> Result<ValidationSummary> {
    log::info!("Validating {}", storage_dir.display());

    match load_all(storage_dir) {
        Ok((config, conditions)) => {
            log::info!("Configuration OK");
            log::info!("  max_pattern_length: {}", config.compactor.max_pattern_length);
            log::info!("  max_concurrent: {}", config.orchestrator.max_concurrent);
            log::info!("  call_timeout_secs: {}", config.orchestrator.call_timeout_secs);
            log::info!("Condition catalog OK ({} conditions)", conditions.len());

            Ok(ValidationSummary {
                conditions: conditions.names().to_vec(),
                max_pattern_length: config.compactor.max_pattern_length,
                max_concurrent: config.orchestrator.max_concurrent,
                call_timeout_secs: config.orchestrator.call_timeout_secs,
            })
        }
        Err(e) => {
            log::error!("Validation failed: {}", e);
            Err(e)
        }
    }
}
