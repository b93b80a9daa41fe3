//! Audience building and fan-out services.
//!
//! - `compactor`: landing-page URLs to anchored regex patterns
//! - `conditions`: validated condition template catalog
//! - `assembler`: conditions + patterns to an `AudienceDefinition`
//! - `orchestrator`: per-property fan-out with partial-failure tracking
//! - `catalog`: cached account/property listings

pub mod assembler;
pub mod catalog;
pub mod compactor;
pub mod conditions;
pub mod orchestrator;

pub use assembler::AudienceAssembler;
pub use catalog::{AccountProperties, CatalogSnapshot, PropertyCatalog};
pub use compactor::{compact, compile_regex_groups, split_into_groups};
pub use conditions::{Condition, ConditionStore, URL_PATTERNS_PLACEHOLDER};
pub use orchestrator::Orchestrator;
