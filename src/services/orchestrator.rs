// src/services/orchestrator.rs

//! Multi-property fan-out.
//!
//! Issues one independent GA4 call per property, all driven concurrently on
//! the caller's task, and folds the outcomes into a `BatchOperationResult`.
//! A failing property never cancels its siblings; the batch only returns once
//! every call has settled. Dropping the returned future cancels whatever is
//! still in flight.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::client::Ga4Client;
use crate::error::{AppError, Result};
use crate::models::{
    AudienceDefinition, BatchOperation, BatchOperationResult, OrchestratorConfig, PropertyFailure,
    PropertySuccess, ReportRequest, ReportResponse,
};
use crate::utils::{audience_id, audience_name, property_name};

/// Fans audience operations out across GA4 properties.
#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<dyn Ga4Client>,
    max_concurrent: usize,
    call_timeout: Duration,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn Ga4Client>, config: &OrchestratorConfig) -> Self {
        Self::with_limits(client, config.max_concurrent, config.call_timeout())
    }

    pub fn with_limits(
        client: Arc<dyn Ga4Client>,
        max_concurrent: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            client,
            max_concurrent: max_concurrent.max(1),
            call_timeout,
        }
    }

    pub fn client(&self) -> &Arc<dyn Ga4Client> {
        &self.client
    }

    /// Normalize every property reference before anything is sent.
    fn normalize(property_ids: &[String]) -> Result<Vec<String>> {
        if property_ids.is_empty() {
            return Err(AppError::validation(
                "properties",
                "at least one property is required",
            ));
        }
        property_ids.iter().map(|id| property_name(id)).collect()
    }

    /// Run `call` once per property and collect every outcome.
    ///
    /// Results are reported in request order regardless of completion order.
    /// Only pre-flight validation errors are returned as `Err`.
    pub async fn fan_out<T, F, Fut>(
        &self,
        operation: BatchOperation,
        property_ids: &[String],
        call: F,
    ) -> Result<BatchOperationResult<T>>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let properties = Self::normalize(property_ids)?;
        let started_at = Utc::now();
        let call = &call;
        let call_timeout = self.call_timeout;

        log::info!(
            "Starting {:?} across {} properties",
            operation,
            properties.len()
        );

        let mut outcomes: Vec<(usize, String, Result<T>)> = stream::iter(
            properties.into_iter().enumerate(),
        )
        .map(|(index, property)| async move {
            let outcome = match tokio::time::timeout(call_timeout, call(property.clone())).await {
                Ok(result) => result,
                Err(_) => Err(AppError::Timeout(call_timeout)),
            };
            (index, property, outcome)
        })
        .buffer_unordered(self.max_concurrent)
        .collect()
        .await;

        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut result = BatchOperationResult::new(operation, started_at);
        for (_, property, outcome) in outcomes {
            match outcome {
                Ok(value) => result.succeeded.push(PropertySuccess {
                    property,
                    result: value,
                }),
                Err(error) => {
                    let failure = PropertyFailure::from_error(property, &error);
                    log::warn!("{}", failure.to_error());
                    result.failed.push(failure);
                }
            }
        }
        result.finished_at = Utc::now();

        log::info!(
            "{:?} finished: {} succeeded, {} failed",
            operation,
            result.succeeded.len(),
            result.failed.len()
        );
        Ok(result)
    }

    /// Create an audience on every property, building a fresh definition per call.
    pub async fn create_across_properties<F>(
        &self,
        property_ids: &[String],
        definition_factory: F,
    ) -> Result<BatchOperationResult<AudienceDefinition>>
    where
        F: Fn() -> AudienceDefinition,
    {
        let client = &self.client;
        let factory = &definition_factory;
        self.fan_out(BatchOperation::Create, property_ids, move |property| {
            let definition = factory();
            async move { client.create_audience(&property, &definition).await }
        })
        .await
    }

    /// Create the same audience on every property.
    pub async fn create_for_properties(
        &self,
        property_ids: &[String],
        definition: &AudienceDefinition,
    ) -> Result<BatchOperationResult<AudienceDefinition>> {
        self.create_across_properties(property_ids, || definition.clone())
            .await
    }

    /// Archive an audience (bare id or resource name) on every property.
    ///
    /// Each success carries the archived resource name.
    pub async fn delete_across_properties(
        &self,
        property_ids: &[String],
        audience: &str,
    ) -> Result<BatchOperationResult<String>> {
        let id = audience_id(audience)?;
        let client = &self.client;
        let id = &id;
        self.fan_out(BatchOperation::Delete, property_ids, move |property| async move {
            let name = audience_name(&property, id);
            client.archive_audience(&name).await?;
            Ok::<_, AppError>(name)
        })
        .await
    }

    /// Alias matching the presentation-layer naming.
    pub async fn delete_for_properties(
        &self,
        property_ids: &[String],
        audience: &str,
    ) -> Result<BatchOperationResult<String>> {
        self.delete_across_properties(property_ids, audience).await
    }

    /// List audiences on every property. Unknown properties are recorded as
    /// not-found failures.
    pub async fn list_across_properties(
        &self,
        property_ids: &[String],
    ) -> Result<BatchOperationResult<Vec<AudienceDefinition>>> {
        let client = &self.client;
        self.fan_out(BatchOperation::List, property_ids, move |property| async move {
            client.list_audiences(&property).await
        })
        .await
    }

    /// Run the same report on every property.
    pub async fn report_across_properties(
        &self,
        property_ids: &[String],
        request: &ReportRequest,
    ) -> Result<BatchOperationResult<ReportResponse>> {
        let client = &self.client;
        self.fan_out(BatchOperation::Report, property_ids, move |property| async move {
            client.run_report(&property, request).await
        })
        .await
    }
}
