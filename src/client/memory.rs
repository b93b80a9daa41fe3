// src/client/memory.rs

//! In-process [`Ga4Client`] backed by plain collections.
//!
//! Used by tests and by the CLI's `--dry-run` mode. Failures and latency can
//! be injected per property, and every call is counted so callers can assert
//! on how often the "remote" side was hit.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::client::Ga4Client;
use crate::error::{AppError, Result};
use crate::models::{
    Account, AudienceDefinition, CellValue, NamedField, Property, ReportRequest, ReportResponse,
    ReportRow,
};

#[derive(Debug, Default)]
struct State {
    accounts: Vec<Account>,
    properties: Vec<Property>,
    audiences: HashMap<String, Vec<AudienceDefinition>>,
    next_id: u64,
    /// Treat every `properties/{id}` as existing
    open: bool,
}

impl State {
    fn audiences_of(&mut self, property: &str) -> Result<&mut Vec<AudienceDefinition>> {
        if self.open {
            return Ok(self.audiences.entry(property.to_string()).or_default());
        }
        self.audiences
            .get_mut(property)
            .ok_or_else(|| AppError::NotFound(property.to_string()))
    }
}

/// In-memory GA4 stand-in.
#[derive(Debug, Default)]
pub struct MemoryGa4Client {
    state: Mutex<State>,
    failures: Mutex<HashMap<String, String>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl MemoryGa4Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account (`accounts/{id}`).
    pub fn with_account(self, id: &str, display_name: &str) -> Self {
        self.lock_state().accounts.push(Account {
            name: format!("accounts/{id}"),
            display_name: display_name.to_string(),
            region_code: None,
        });
        self
    }

    /// Register a property under an account.
    pub fn with_property(self, account_id: &str, id: &str, display_name: &str) -> Self {
        {
            let mut state = self.lock_state();
            let name = format!("properties/{id}");
            state.audiences.entry(name.clone()).or_default();
            state.properties.push(Property {
                name,
                display_name: display_name.to_string(),
                parent: format!("accounts/{account_id}"),
                time_zone: None,
                currency_code: None,
            });
        }
        self
    }

    /// Accept calls for properties that were never registered.
    pub fn accept_any_property(self) -> Self {
        self.lock_state().open = true;
        self
    }

    /// Make every call scoped to `property` fail with a 503.
    pub fn fail_for(self, property: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(property.to_string(), message.to_string());
        self
    }

    /// Delay every call scoped to `property`.
    pub fn delay_for(self, property: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(property.to_string(), delay);
        self
    }

    /// Number of calls made to an operation (e.g. `"create_audience"`).
    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Audiences currently stored for a property.
    pub fn audiences(&self, property: &str) -> Vec<AudienceDefinition> {
        self.lock_state()
            .audiences
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, operation: &'static str) {
        *self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(operation)
            .or_insert(0) += 1;
    }

    /// Count the call, apply injected latency, then injected failure.
    async fn enter(&self, operation: &'static str, scope: &str) -> Result<()> {
        self.record(operation);
        let property = property_of(scope);

        let delay = self
            .delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(property)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(property)
            .cloned();
        match failure {
            Some(message) => Err(AppError::Api {
                status: 503,
                message,
            }),
            None => Ok(()),
        }
    }
}

/// `properties/{p}` prefix of a property-scoped resource name.
fn property_of(name: &str) -> &str {
    match name.match_indices('/').nth(1) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

#[async_trait]
impl Ga4Client for MemoryGa4Client {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.record("list_accounts");
        Ok(self.lock_state().accounts.clone())
    }

    async fn list_properties(&self, account: &str) -> Result<Vec<Property>> {
        self.enter("list_properties", account).await?;
        let state = self.lock_state();
        if !state.accounts.iter().any(|a| a.name == account) {
            return Err(AppError::NotFound(account.to_string()));
        }
        Ok(state
            .properties
            .iter()
            .filter(|p| p.parent == account)
            .cloned()
            .collect())
    }

    async fn list_audiences(&self, property: &str) -> Result<Vec<AudienceDefinition>> {
        self.enter("list_audiences", property).await?;
        Ok(self.lock_state().audiences_of(property)?.clone())
    }

    async fn get_audience(&self, name: &str) -> Result<AudienceDefinition> {
        self.enter("get_audience", name).await?;
        self.lock_state()
            .audiences
            .get(property_of(name))
            .and_then(|list| list.iter().find(|a| a.name.as_deref() == Some(name)))
            .cloned()
            .ok_or_else(|| AppError::NotFound(name.to_string()))
    }

    async fn create_audience(
        &self,
        property: &str,
        audience: &AudienceDefinition,
    ) -> Result<AudienceDefinition> {
        self.enter("create_audience", property).await?;
        let mut state = self.lock_state();
        state.audiences_of(property)?;

        state.next_id += 1;
        let mut created = audience.clone();
        created.name = Some(format!("{property}/audiences/{}", state.next_id));
        created.ads_personalization_enabled = Some(true);

        state.audiences_of(property)?.push(created.clone());
        Ok(created)
    }

    async fn update_audience(
        &self,
        audience: &AudienceDefinition,
        update_mask: &[String],
    ) -> Result<AudienceDefinition> {
        let name = audience
            .name
            .clone()
            .ok_or_else(|| AppError::validation("name", "update requires a resource name"))?;
        self.enter("update_audience", &name).await?;

        let mut state = self.lock_state();
        let stored = state
            .audiences
            .get_mut(property_of(&name))
            .and_then(|list| list.iter_mut().find(|a| a.name.as_deref() == Some(name.as_str())))
            .ok_or_else(|| AppError::NotFound(name.clone()))?;

        for field in update_mask {
            match field.as_str() {
                "displayName" => stored.display_name = audience.display_name.clone(),
                "description" => stored.description = audience.description.clone(),
                other => {
                    return Err(AppError::Api {
                        status: 400,
                        message: format!("field '{other}' is immutable"),
                    });
                }
            }
        }
        Ok(stored.clone())
    }

    async fn archive_audience(&self, name: &str) -> Result<()> {
        self.enter("archive_audience", name).await?;
        let mut state = self.lock_state();
        let list = state
            .audiences
            .get_mut(property_of(name))
            .ok_or_else(|| AppError::NotFound(name.to_string()))?;

        let before = list.len();
        list.retain(|a| a.name.as_deref() != Some(name));
        if list.len() == before {
            return Err(AppError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn run_report(&self, property: &str, request: &ReportRequest) -> Result<ReportResponse> {
        self.enter("run_report", property).await?;
        let mut state = self.lock_state();
        let audiences = state.audiences_of(property)?;

        let rows: Vec<ReportRow> = audiences
            .iter()
            .map(|a| ReportRow {
                dimension_values: vec![CellValue {
                    value: a.display_name.clone(),
                }],
                metric_values: request
                    .metrics
                    .iter()
                    .map(|_| CellValue {
                        value: "0".to_string(),
                    })
                    .collect(),
            })
            .collect();

        Ok(ReportResponse {
            dimension_headers: request.dimensions.clone(),
            metric_headers: request
                .metrics
                .iter()
                .map(|m| NamedField::new(&m.name))
                .collect(),
            row_count: rows.len() as u64,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audience(name: &str) -> AudienceDefinition {
        AudienceDefinition {
            name: None,
            display_name: name.to_string(),
            description: String::new(),
            membership_duration_days: 30,
            ads_personalization_enabled: None,
            exclusion_duration_mode: None,
            filter_clauses: Vec::new(),
            create_time: None,
        }
    }

    #[test]
    fn test_property_of() {
        assert_eq!(property_of("properties/1/audiences/2"), "properties/1");
        assert_eq!(property_of("properties/1"), "properties/1");
    }

    #[tokio::test]
    async fn test_create_list_archive() {
        let client = MemoryGa4Client::new()
            .with_account("9", "Acme")
            .with_property("9", "1", "Site");

        let created = client
            .create_audience("properties/1", &audience("Buyers"))
            .await
            .unwrap();
        let name = created.name.clone().unwrap();
        assert!(name.starts_with("properties/1/audiences/"));
        assert_eq!(client.list_audiences("properties/1").await.unwrap().len(), 1);

        client.archive_audience(&name).await.unwrap();
        assert!(client.list_audiences("properties/1").await.unwrap().is_empty());
        assert!(client.archive_audience(&name).await.unwrap_err().is_not_found());
        assert_eq!(client.calls("archive_audience"), 2);
    }

    #[tokio::test]
    async fn test_unknown_property_is_not_found() {
        let client = MemoryGa4Client::new();
        let err = client.list_audiences("properties/404").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_accept_any_property() {
        let client = MemoryGa4Client::new().accept_any_property();
        client
            .create_audience("properties/77", &audience("Dry"))
            .await
            .unwrap();
        assert_eq!(client.list_audiences("properties/77").await.unwrap().len(), 1);
        assert!(client.list_audiences("properties/78").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let client = MemoryGa4Client::new()
            .with_account("9", "Acme")
            .with_property("9", "1", "Site")
            .fail_for("properties/1", "quota exhausted");

        let err = client
            .create_audience("properties/1", &audience("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Api { status: 503, .. }));
        assert!(client.audiences("properties/1").is_empty());
    }

    #[tokio::test]
    async fn test_update_display_name() {
        let client = MemoryGa4Client::new()
            .with_account("9", "Acme")
            .with_property("9", "1", "Site");
        let mut created = client
            .create_audience("properties/1", &audience("Old"))
            .await
            .unwrap();

        created.display_name = "New".into();
        let updated = client
            .update_audience(&created, &["displayName".to_string()])
            .await
            .unwrap();
        assert_eq!(updated.display_name, "New");

        let err = client
            .update_audience(&created, &["membershipDurationDays".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Api { status: 400, .. }));
    }
}
