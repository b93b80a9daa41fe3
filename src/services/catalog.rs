// src/services/catalog.rs

//! Account/property catalog with an explicit freshness policy.
//!
//! The catalog belongs to whoever presents accounts and properties (the CLI
//! here). Audience building and fan-out never read from it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::client::Ga4Client;
use crate::error::Result;
use crate::models::{Account, CatalogConfig, Property};
use crate::utils::account_name;

/// One account with its properties.
#[derive(Debug, Clone, Serialize)]
pub struct AccountProperties {
    pub account: Account,
    pub properties: Vec<Property>,
    /// Set when listing this account's properties failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Accounts and their properties, in the order the service listed them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSnapshot {
    pub accounts: Vec<AccountProperties>,
}

impl CatalogSnapshot {
    pub fn property_count(&self) -> usize {
        self.accounts.iter().map(|a| a.properties.len()).sum()
    }
}

struct Cached {
    loaded_at: Instant,
    snapshot: Arc<CatalogSnapshot>,
}

/// TTL cache over account and property listings.
pub struct PropertyCatalog {
    client: Arc<dyn Ga4Client>,
    ttl: Duration,
    max_concurrent: usize,
    cached: RwLock<Option<Cached>>,
}

impl PropertyCatalog {
    pub fn new(client: Arc<dyn Ga4Client>, ttl: Duration, max_concurrent: usize) -> Self {
        Self {
            client,
            ttl,
            max_concurrent: max_concurrent.max(1),
            cached: RwLock::new(None),
        }
    }

    pub fn from_config(
        client: Arc<dyn Ga4Client>,
        config: &CatalogConfig,
        max_concurrent: usize,
    ) -> Self {
        Self::new(client, Duration::from_secs(config.ttl_secs), max_concurrent)
    }

    /// Return the cached snapshot, loading it if missing or stale.
    pub async fn snapshot(&self) -> Result<Arc<CatalogSnapshot>> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.loaded_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&cached.snapshot));
            }
        }

        // Holding the write lock keeps concurrent callers from loading twice.
        let mut guard = self.cached.write().await;
        if let Some(cached) = guard.as_ref() {
            if cached.loaded_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&cached.snapshot));
            }
        }

        let snapshot = Arc::new(self.load().await?);
        *guard = Some(Cached {
            loaded_at: Instant::now(),
            snapshot: Arc::clone(&snapshot),
        });
        Ok(snapshot)
    }

    /// Drop the cached snapshot so the next read reloads.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    /// Properties of the given accounts (ids or `accounts/{id}` names).
    pub async fn properties_for(&self, accounts: &[String]) -> Result<Vec<Property>> {
        let wanted = accounts
            .iter()
            .map(|a| account_name(a))
            .collect::<Result<Vec<_>>>()?;
        let snapshot = self.snapshot().await?;

        Ok(snapshot
            .accounts
            .iter()
            .filter(|entry| wanted.contains(&entry.account.name))
            .flat_map(|entry| entry.properties.iter().cloned())
            .collect())
    }

    async fn load(&self) -> Result<CatalogSnapshot> {
        let accounts = self.client.list_accounts().await?;
        log::debug!("Loading properties for {} accounts", accounts.len());

        let client = &self.client;
        let entries = stream::iter(accounts)
            .map(|account| async move {
                match client.list_properties(&account.name).await {
                    Ok(properties) => AccountProperties {
                        account,
                        properties,
                        error: None,
                    },
                    Err(e) => {
                        log::warn!("Failed to list properties of {}: {}", account.name, e);
                        AccountProperties {
                            account,
                            properties: Vec::new(),
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .buffered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        Ok(CatalogSnapshot { accounts: entries })
    }
}
