// src/models/report.rs

//! Data API report request/response shapes.

use serde::{Deserialize, Serialize};

/// A `runReport` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub dimensions: Vec<NamedField>,
    pub metrics: Vec<NamedField>,
    pub date_ranges: Vec<DateRange>,
}

impl ReportRequest {
    /// Active users per audience name over a date range.
    pub fn audience_users(start_date: &str, end_date: &str) -> Self {
        Self {
            dimensions: vec![NamedField::new("audienceName")],
            metrics: vec![NamedField::new("activeUsers")],
            date_ranges: vec![DateRange {
                start_date: start_date.to_string(),
                end_date: end_date.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedField {
    pub name: String,
}

impl NamedField {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

/// A `runReport` response, reduced to headers and rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(default)]
    pub dimension_headers: Vec<NamedField>,

    #[serde(default)]
    pub metric_headers: Vec<NamedField>,

    #[serde(default)]
    pub rows: Vec<ReportRow>,

    #[serde(default)]
    pub row_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(default)]
    pub dimension_values: Vec<CellValue>,

    #[serde(default)]
    pub metric_values: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellValue {
    #[serde(default)]
    pub value: String,
}
