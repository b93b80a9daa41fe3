// src/models/batch.rs

//! Aggregated outcome of a per-property fan-out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Operation a batch fanned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOperation {
    Create,
    Delete,
    List,
    Report,
}

/// Classification of a per-property failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Timeout,
    Api,
    Transport,
}

impl From<&AppError> for FailureKind {
    fn from(error: &AppError) -> Self {
        match error {
            e if e.is_not_found() => FailureKind::NotFound,
            AppError::Timeout(_) => FailureKind::Timeout,
            AppError::Api { .. } => FailureKind::Api,
            _ => FailureKind::Transport,
        }
    }
}

/// A property whose call succeeded, with the call's payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySuccess<T> {
    pub property: String,
    pub result: T,
}

/// A property whose call failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyFailure {
    pub property: String,
    pub kind: FailureKind,
    pub error: String,
}

impl PropertyFailure {
    pub fn from_error(property: impl Into<String>, error: &AppError) -> Self {
        Self {
            property: property.into(),
            kind: FailureKind::from(error),
            error: error.to_string(),
        }
    }

    /// Re-raise the failure as an error naming the property.
    pub fn to_error(&self) -> AppError {
        AppError::property(&self.property, &self.error)
    }
}

/// Per-property breakdown of a fan-out.
///
/// Every requested property appears exactly once, in `succeeded` or `failed`,
/// and both lists follow the order the properties were requested in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOperationResult<T> {
    pub operation: BatchOperation,
    pub succeeded: Vec<PropertySuccess<T>>,
    pub failed: Vec<PropertyFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl<T> BatchOperationResult<T> {
    pub fn new(operation: BatchOperation, started_at: DateTime<Utc>) -> Self {
        Self {
            operation,
            succeeded: Vec::new(),
            failed: Vec::new(),
            started_at,
            finished_at: started_at,
        }
    }

    /// Number of properties the batch covered.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Whether every property failed (and there was at least one).
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }

    /// Whether some but not all properties failed.
    pub fn is_partial(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }

    /// Property names that succeeded, in request order.
    pub fn succeeded_properties(&self) -> Vec<&str> {
        self.succeeded.iter().map(|s| s.property.as_str()).collect()
    }

    /// Property names that failed, in request order.
    pub fn failed_properties(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.property.as_str()).collect()
    }
}
