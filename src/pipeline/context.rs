// src/pipeline/context.rs

//! Shared wiring for pipeline entry points.

use std::path::Path;
use std::sync::Arc;

use crate::client::{Ga4Client, HttpGa4Client, MemoryGa4Client};
use crate::config::load_all;
use crate::error::Result;
use crate::models::Config;
use crate::services::{AudienceAssembler, ConditionStore, Orchestrator, PropertyCatalog};

/// Everything a command needs, built once per process.
pub struct AppContext {
    pub config: Arc<Config>,
    pub assembler: AudienceAssembler,
    pub orchestrator: Orchestrator,
    pub catalog: PropertyCatalog,
}

impl AppContext {
    pub fn new(config: Config, conditions: ConditionStore, client: Arc<dyn Ga4Client>) -> Self {
        let assembler = assembler_for(&config, conditions);
        let orchestrator = Orchestrator::new(Arc::clone(&client), &config.orchestrator);
        let catalog = PropertyCatalog::from_config(
            client,
            &config.catalog,
            config.orchestrator.max_concurrent,
        );

        Self {
            config: Arc::new(config),
            assembler,
            orchestrator,
            catalog,
        }
    }

    /// Load config and catalog from `storage_dir` and connect to GA4.
    ///
    /// With `dry_run`, an empty in-memory client stands in for the service.
    pub fn load(storage_dir: &Path, dry_run: bool) -> Result<Self> {
        let (config, conditions) = load_all(storage_dir)?;

        let client: Arc<dyn Ga4Client> = if dry_run {
            log::warn!("Dry run: GA4 calls go to an in-memory client");
            Arc::new(MemoryGa4Client::new().accept_any_property())
        } else {
            Arc::new(HttpGa4Client::from_env(&config.api)?)
        };

        Ok(Self::new(config, conditions, client))
    }
}

fn assembler_for(config: &Config, conditions: ConditionStore) -> AudienceAssembler {
    AudienceAssembler::new(Arc::new(conditions), &config.audience, &config.compactor)
}

/// Load only what building needs; no GA4 client or credentials involved.
pub fn load_assembler(storage_dir: &Path) -> Result<AudienceAssembler> {
    let (config, conditions) = load_all(storage_dir)?;
    Ok(assembler_for(&config, conditions))
}
