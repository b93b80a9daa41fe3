//! Pipeline entry points for audience operations.
//!
//! - `AppContext`: wiring of config, condition catalog and GA4 client
//! - `run_build` / `run_create`: assemble an audience and fan it out
//! - `run_list` / `run_get` / `run_delete` / `run_report`: batch reads and archives
//! - `run_export`: write listed audiences to a JSON file
//! - `run_accounts` / `run_properties`: cached catalog browsing
//! - `run_validate`: check config and condition catalog

pub mod batch;
pub mod build;
pub mod catalog;
pub mod context;
pub mod export;
pub mod validate;

pub use batch::{log_summary, run_delete, run_get, run_list, run_report};
pub use build::{BuildRequest, run_build, run_create};
pub use catalog::{run_accounts, run_properties};
pub use context::{AppContext, load_assembler};
pub use export::{ExportFile, run_export};
pub use validate::{ValidationSummary, run_validate};
