// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for loading configuration
//! and the condition catalog from the storage directory.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::ConditionStore;

/// Load configuration from a TOML file.
///
/// Falls back to defaults only if the file is missing.
pub fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_default(path)
}

/// Load the condition catalog. Any problem is fatal.
pub fn load_conditions(path: &Path) -> Result<ConditionStore> {
    let store = ConditionStore::load(path)?;
    if store.is_empty() {
        return Err(AppError::config_load(format!(
            "{} defines no conditions",
            path.display()
        )));
    }
    log::info!("Loaded {} conditions from {}", store.len(), path.display());
    Ok(store)
}

/// Load and validate both config and condition catalog.
pub fn load_all(storage_dir: &Path) -> Result<(Config, ConditionStore)> {
    let config = load_config(&storage_dir.join("config.toml"))?;
    config.validate()?;

    let conditions = load_conditions(&config.conditions_path(storage_dir))?;
    Ok((config, conditions))
}
