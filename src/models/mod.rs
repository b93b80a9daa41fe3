// src/models/mod.rs

//! Domain models for the audience tooling.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod account;
mod audience;
mod batch;
mod config;
mod preset;
mod report;

// Re-export all public types
pub use account::{Account, Property};
pub use audience::AudienceDefinition;
pub use batch::{BatchOperation, BatchOperationResult, FailureKind, PropertyFailure, PropertySuccess};
pub use config::{
    ApiConfig, AudienceConfig, CatalogConfig, CompactorConfig, Config, OrchestratorConfig,
    PathsConfig,
};
pub use preset::AudiencePreset;
pub use report::{CellValue, DateRange, NamedField, ReportRequest, ReportResponse, ReportRow};
