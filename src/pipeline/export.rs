// src/pipeline/export.rs

//! Export of listed audiences to a JSON file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{AudienceDefinition, PropertyFailure};
use crate::pipeline::{AppContext, run_list};

/// Audiences of one property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedProperty {
    pub property: String,
    pub audiences: Vec<AudienceDefinition>,
}

/// On-disk export format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub exported_at: DateTime<Utc>,
    pub properties: Vec<ExportedProperty>,
    /// Properties that could not be listed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<PropertyFailure>,
}

impl ExportFile {
    pub fn audience_count(&self) -> usize {
        self.properties.iter().map(|p| p.audiences.len()).sum()
    }
}

/// List audiences on every property and write them to `output`.
///
/// The file is written even when some properties fail; those are recorded
/// in `failed`.
pub async fn run_export(
    ctx: &AppContext,
    properties: &[String],
    output: &Path,
) -> Result<ExportFile> {
    let result = run_list(ctx, properties).await?;

    let export = ExportFile {
        exported_at: Utc::now(),
        properties: result
            .succeeded
            .into_iter()
            .map(|s| ExportedProperty {
                property: s.property,
                audiences: s.result,
            })
            .collect(),
        failed: result.failed,
    };

    write_json(output, &export).await?;
    log::info!(
        "Exported {} audiences from {} properties to {}",
        export.audience_count(),
        export.properties.len(),
        output.display()
    );
    Ok(export)
}

/// Write pretty JSON atomically (temp file, then rename).
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = temp_path(path);
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// `{path}.tmp`, keeping the full file name.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
