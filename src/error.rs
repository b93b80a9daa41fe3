// src/error.rs

//! Unified error handling for the audience tooling.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for audience operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A landing-page URL could not be reduced to a path
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Requested condition is not in the template catalog
    #[error("Unknown condition: {0}")]
    UnknownCondition(String),

    /// Condition catalog failed validation at load time
    #[error("Condition catalog error: {0}")]
    ConfigLoad(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or invalid field in a build request
    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    /// Remote service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Remote resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Per-call deadline expired
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// A single property's operation failed
    #[error("Operation failed for {property}: {message}")]
    PropertyOperation { property: String, message: String },
}

impl AppError {
    /// Create an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a condition catalog load error.
    pub fn config_load(message: impl Into<String>) -> Self {
        Self::ConfigLoad(message.into())
    }

    /// Create a validation error naming the offending field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a per-property operation error.
    pub fn property(property: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::PropertyOperation {
            property: property.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error stands for a missing remote resource.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api { status, .. } => *status == 404,
            _ => false,
        }
    }
}
