//! GA4 Admin/Data API access.
//!
//! The rest of the crate talks to GA4 only through [`Ga4Client`]:
//!
//! - [`HttpGa4Client`]: REST implementation over `reqwest`
//! - [`MemoryGa4Client`]: in-process implementation for tests and dry runs
//!
//! All resource arguments are already-normalized names
//! (`accounts/{id}`, `properties/{id}`, `properties/{p}/audiences/{a}`).

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Account, AudienceDefinition, Property, ReportRequest, ReportResponse};

pub use http::HttpGa4Client;
pub use memory::MemoryGa4Client;

/// Capability surface of the GA4 Admin and Data APIs.
///
/// Implementations are shared by every call of a fan-out and must be safe
/// for concurrent use.
#[async_trait]
pub trait Ga4Client: Send + Sync {
    /// List every account visible to the caller.
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// List the properties of an account.
    async fn list_properties(&self, account: &str) -> Result<Vec<Property>>;

    /// List the audiences of a property.
    async fn list_audiences(&self, property: &str) -> Result<Vec<AudienceDefinition>>;

    /// Fetch one audience by resource name.
    async fn get_audience(&self, name: &str) -> Result<AudienceDefinition>;

    /// Create an audience; the returned copy carries the service-assigned name.
    async fn create_audience(
        &self,
        property: &str,
        audience: &AudienceDefinition,
    ) -> Result<AudienceDefinition>;

    /// Patch the fields named in `update_mask` (camelCase field paths).
    async fn update_audience(
        &self,
        audience: &AudienceDefinition,
        update_mask: &[String],
    ) -> Result<AudienceDefinition>;

    /// Archive an audience. GA4 has no hard delete for audiences.
    async fn archive_audience(&self, name: &str) -> Result<()>;

    /// Run a Data API report against a property.
    async fn run_report(&self, property: &str, request: &ReportRequest) -> Result<ReportResponse>;
}
