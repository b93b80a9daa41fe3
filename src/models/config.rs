//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// GA4 Admin/Data API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// URL pattern compaction settings
    #[serde(default)]
    pub compactor: CompactorConfig,

    /// Audience assembly defaults and limits
    #[serde(default)]
    pub audience: AudienceConfig,

    /// Fan-out behavior
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Account/property catalog cache
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, using defaults only when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("No config at {:?}. Using defaults.", path);
            return Ok(Self::default());
        }
        Self::load(path)
            .map_err(|e| AppError::config(format!("cannot load {}: {e}", path.display())))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.admin_base_url.trim().is_empty() {
            return Err(AppError::config("api.admin_base_url is empty"));
        }
        if self.api.data_base_url.trim().is_empty() {
            return Err(AppError::config("api.data_base_url is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::config("api.timeout_secs must be > 0"));
        }
        if self.compactor.max_pattern_length == 0 {
            return Err(AppError::config("compactor.max_pattern_length must be > 0"));
        }
        if self.orchestrator.max_concurrent == 0 {
            return Err(AppError::config("orchestrator.max_concurrent must be > 0"));
        }
        if self.orchestrator.call_timeout_secs == 0 {
            return Err(AppError::config(
                "orchestrator.call_timeout_secs must be > 0",
            ));
        }
        let days = self.audience.default_membership_days;
        if days == 0 || days > self.audience.max_membership_days {
            return Err(AppError::config(format!(
                "audience.default_membership_days must be within 1..={}",
                self.audience.max_membership_days
            )));
        }
        Ok(())
    }

    /// Resolve the condition catalog path against the storage directory.
    pub fn conditions_path(&self, storage_dir: &Path) -> PathBuf {
        storage_dir.join(&self.paths.conditions_file)
    }
}

/// GA4 API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Admin API root (accounts, properties, audiences)
    #[serde(default = "defaults::admin_base_url")]
    pub admin_base_url: String,

    /// Data API root (reports)
    #[serde(default = "defaults::data_base_url")]
    pub data_base_url: String,

    /// Environment variable holding the OAuth access token
    #[serde(default = "defaults::access_token_env")]
    pub access_token_env: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Page size for list calls
    #[serde(default = "defaults::page_size")]
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admin_base_url: defaults::admin_base_url(),
            data_base_url: defaults::data_base_url(),
            access_token_env: defaults::access_token_env(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_size: defaults::page_size(),
        }
    }
}

/// URL pattern compaction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactorConfig {
    /// Character budget for the paths folded into one pattern
    #[serde(default = "defaults::max_pattern_length")]
    pub max_pattern_length: usize,
}

impl Default for CompactorConfig {
    fn default() -> Self {
        Self {
            max_pattern_length: defaults::max_pattern_length(),
        }
    }
}

/// Audience assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceConfig {
    /// Dimension the URL patterns are matched against
    #[serde(default = "defaults::page_path_dimension")]
    pub page_path_dimension: String,

    /// Prefix of generated audience descriptions
    #[serde(default = "defaults::default_description")]
    pub default_description: String,

    /// Membership duration used when none is given
    #[serde(default = "defaults::default_membership_days")]
    pub default_membership_days: u32,

    /// Largest membership duration accepted locally
    #[serde(default = "defaults::max_membership_days")]
    pub max_membership_days: u32,
}

impl Default for AudienceConfig {
    fn default() -> Self {
        Self {
            page_path_dimension: defaults::page_path_dimension(),
            default_description: defaults::default_description(),
            default_membership_days: defaults::default_membership_days(),
            max_membership_days: defaults::max_membership_days(),
        }
    }
}

/// Fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum per-property calls in flight
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Deadline for a single property's call in seconds
    #[serde(default = "defaults::call_timeout")]
    pub call_timeout_secs: u64,
}

impl OrchestratorConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
            call_timeout_secs: defaults::call_timeout(),
        }
    }
}

/// Account/property catalog cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Seconds a loaded catalog stays fresh
    #[serde(default = "defaults::catalog_ttl")]
    pub ttl_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::catalog_ttl(),
        }
    }
}

/// File locations, relative to the storage directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::conditions_file")]
    pub conditions_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            conditions_file: defaults::conditions_file(),
        }
    }
}

mod defaults {
    // Api defaults
    pub fn admin_base_url() -> String {
        "https://analyticsadmin.googleapis.com/v1alpha".into()
    }
    pub fn data_base_url() -> String {
        "https://analyticsdata.googleapis.com/v1beta".into()
    }
    pub fn access_token_env() -> String {
        "GA4_ACCESS_TOKEN".into()
    }
    pub fn user_agent() -> String {
        "audiencer/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn page_size() -> u32 {
        200
    }

    // Compactor defaults
    pub fn max_pattern_length() -> usize {
        450
    }

    // Audience defaults
    pub fn page_path_dimension() -> String {
        "landingPagePlusQueryString".into()
    }
    pub fn default_description() -> String {
        "Audience created by the Audience Builder".into()
    }
    pub fn default_membership_days() -> u32 {
        60
    }
    pub fn max_membership_days() -> u32 {
        540
    }

    // Orchestrator defaults
    pub fn max_concurrent() -> usize {
        8
    }
    pub fn call_timeout() -> u64 {
        60
    }

    // Catalog defaults
    pub fn catalog_ttl() -> u64 {
        300
    }

    // Path defaults
    pub fn conditions_file() -> String {
        "conditions.json".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.orchestrator.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_default_days_over_ceiling() {
        let mut config = Config::default();
        config.audience.default_membership_days = 600;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.audience.max_membership_days, 540);
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[audience]\nmax_membership_days = \"lots\"\n").unwrap();
        assert!(matches!(
            Config::load_or_default(&path),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [compactor]
            max_pattern_length = 120

            [orchestrator]
            max_concurrent = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.compactor.max_pattern_length, 120);
        assert_eq!(config.orchestrator.max_concurrent, 2);
        assert_eq!(config.orchestrator.call_timeout_secs, 60);
        assert_eq!(config.audience.max_membership_days, 540);
        assert_eq!(config.paths.conditions_file, "conditions.json");
    }
}
