// src/pipeline/batch.rs

//! Batch reads, archives and reports across properties.

use crate::error::Result;
use crate::models::{AudienceDefinition, BatchOperationResult, ReportRequest, ReportResponse};
use crate::pipeline::AppContext;
use crate::utils::full_audience_name;

/// Log a one-line outcome plus each failed property.
pub fn log_summary<T>(result: &BatchOperationResult<T>) {
    if result.all_failed() {
        log::error!(
            "{:?}: all {} properties failed",
            result.operation,
            result.total()
        );
    } else if result.is_partial() {
        log::warn!(
            "{:?}: {} succeeded, {} failed ({})",
            result.operation,
            result.succeeded.len(),
            result.failed.len(),
            result.failed_properties().join(", ")
        );
    } else {
        log::info!(
            "{:?}: {} properties succeeded",
            result.operation,
            result.succeeded.len()
        );
    }
}

/// List the audiences of every property.
pub async fn run_list(
    ctx: &AppContext,
    properties: &[String],
) -> Result<BatchOperationResult<Vec<AudienceDefinition>>> {
    let result = ctx.orchestrator.list_across_properties(properties).await?;
    log_summary(&result);
    Ok(result)
}

/// Fetch a single audience by resource name.
pub async fn run_get(ctx: &AppContext, name: &str) -> Result<AudienceDefinition> {
    let name = full_audience_name(name)?;
    ctx.orchestrator.client().get_audience(&name).await
}

/// Archive an audience on every property.
pub async fn run_delete(
    ctx: &AppContext,
    properties: &[String],
    audience: &str,
) -> Result<BatchOperationResult<String>> {
    let result = ctx
        .orchestrator
        .delete_for_properties(properties, audience)
        .await?;
    log_summary(&result);
    Ok(result)
}

/// Active users per audience over a date range, for every property.
pub async fn run_report(
    ctx: &AppContext,
    properties: &[String],
    start_date: &str,
    end_date: &str,
) -> Result<BatchOperationResult<ReportResponse>> {
    let request = ReportRequest::audience_users(start_date, end_date);
    let result = ctx
        .orchestrator
        .report_across_properties(properties, &request)
        .await?;
    log_summary(&result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::client::{Ga4Client, MemoryGa4Client};
    use crate::error::AppError;
    use crate::models::{Config, FailureKind};
    use crate::services::ConditionStore;

    const CATALOG: &str = r#"[
        { "name": "QMF_BASELINE", "template": { "filterExpressions": ["{{URL_PATTERNS}}"] } }
    ]"#;

    fn setup() -> (Arc<MemoryGa4Client>, AppContext) {
        let client = Arc::new(
            MemoryGa4Client::new()
                .with_account("9", "Acme")
                .with_property("9", "1", "One")
                .with_property("9", "2", "Two"),
        );
        let ctx = AppContext::new(
            Config::default(),
            ConditionStore::from_json(CATALOG).unwrap(),
            client.clone(),
        );
        (client, ctx)
    }

    fn audience(name: &str) -> AudienceDefinition {
        AudienceDefinition {
            name: None,
            display_name: name.into(),
            description: String::new(),
            membership_duration_days: 30,
            ads_personalization_enabled: None,
            exclusion_duration_mode: None,
            filter_clauses: Vec::new(),
            create_time: None,
        }
    }

    #[tokio::test]
    async fn test_list_reports_unknown_property() {
        let (client, ctx) = setup();
        client
            .create_audience("properties/1", &audience("A"))
            .await
            .unwrap();

        let result = run_list(&ctx, &["1".into(), "404".into()]).await.unwrap();
        assert_eq!(result.succeeded[0].result.len(), 1);
        assert_eq!(result.failed[0].property, "properties/404");
        assert_eq!(result.failed[0].kind, FailureKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_rejects_property_name() {
        let (client, ctx) = setup();
        for name in ["properties/1/audiences", "properties/1", "77"] {
            assert!(matches!(
                run_get(&ctx, name).await,
                Err(AppError::Validation { .. })
            ));
        }
        assert_eq!(client.calls("get_audience"), 0);
    }

    #[tokio::test]
    async fn test_delete_by_bare_id() {
        let (client, ctx) = setup();
        let created = client
            .create_audience("properties/1", &audience("A"))
            .await
            .unwrap();
        let id = created.audience_id().unwrap().to_string();

        let result = run_delete(&ctx, &["1".into(), "2".into()], &id).await.unwrap();
        assert_eq!(result.succeeded_properties(), ["properties/1"]);
        assert_eq!(result.failed[0].kind, FailureKind::NotFound);
        assert!(client.audiences("properties/1").is_empty());
    }

    #[tokio::test]
    async fn test_delete_rejects_property_name_as_audience() {
        let (client, ctx) = setup();
        client
            .create_audience("properties/1", &audience("A"))
            .await
            .unwrap();

        let err = run_delete(&ctx, &["1".into()], "properties/1").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "audience"));
        assert_eq!(client.calls("archive_audience"), 0);
        assert_eq!(client.audiences("properties/1").len(), 1);
    }

    #[tokio::test]
    async fn test_report_per_property() {
        let (client, ctx) = setup();
        client
            .create_audience("properties/2", &audience("B"))
            .await
            .unwrap();

        let result = run_report(&ctx, &["2".into()], "7daysAgo", "today")
            .await
            .unwrap();
        assert_eq!(result.succeeded.len(), 1);
        assert_eq!(result.succeeded[0].result.rows.len(), 1);
    }
}
