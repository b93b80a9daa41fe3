// src/pipeline/build.rs

//! Audience building and creation.

use crate::error::{AppError, Result};
use crate::models::{AudienceDefinition, AudiencePreset, BatchOperationResult};
use crate::pipeline::{AppContext, log_summary};
use crate::services::AudienceAssembler;

/// Inputs of a build, as collected by the CLI.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    pub conditions: Vec<String>,
    pub urls: Vec<String>,
    pub display_name: String,
    pub membership_days: Option<u32>,
    /// Use a built-in preset instead of conditions and URLs
    pub preset: Option<String>,
}

/// Build an audience definition without contacting GA4.
pub fn run_build(
    assembler: &AudienceAssembler,
    request: &BuildRequest,
) -> Result<AudienceDefinition> {
    if let Some(id) = &request.preset {
        let preset = AudiencePreset::find(id)
            .ok_or_else(|| AppError::validation("preset", format!("unknown preset '{id}'")))?;
        log::info!("Building from preset '{}'", preset.id);
        return assembler.from_preset(&preset);
    }

    let days = request
        .membership_days
        .unwrap_or_else(|| assembler.default_membership_days());

    let audience = assembler.build_filter(
        &request.conditions,
        &request.urls,
        &request.display_name,
        days,
    )?;
    log::info!(
        "Built '{}' with {} filter clauses",
        audience.display_name,
        audience.filter_clauses.len()
    );
    Ok(audience)
}

/// Build an audience and create it on every property.
///
/// Building is finished before the first create call goes out.
pub async fn run_create(
    ctx: &AppContext,
    request: &BuildRequest,
    properties: &[String],
) -> Result<BatchOperationResult<AudienceDefinition>> {
    let audience = run_build(&ctx.assembler, request)?;
    let result = ctx
        .orchestrator
        .create_for_properties(properties, &audience)
        .await?;
    log_summary(&result);
    Ok(result)
}
