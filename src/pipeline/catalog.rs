// src/pipeline/catalog.rs

//! Account and property browsing.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Property;
use crate::pipeline::AppContext;
use crate::services::CatalogSnapshot;

/// Accounts with their properties, served from the catalog cache.
pub async fn run_accounts(ctx: &AppContext) -> Result<Arc<CatalogSnapshot>> {
    let snapshot = ctx.catalog.snapshot().await?;
    log::info!(
        "{} accounts, {} properties",
        snapshot.accounts.len(),
        snapshot.property_count()
    );
    for entry in snapshot.accounts.iter().filter(|a| a.error.is_some()) {
        log::warn!(
            "Properties of {} unavailable: {}",
            entry.account.name,
            entry.error.as_deref().unwrap_or_default()
        );
    }
    Ok(snapshot)
}

/// Properties of the given accounts.
pub async fn run_properties(ctx: &AppContext, accounts: &[String]) -> Result<Vec<Property>> {
    let properties = ctx.catalog.properties_for(accounts).await?;
    log::info!("{} properties in {} accounts", properties.len(), accounts.len());
    Ok(properties)
}
