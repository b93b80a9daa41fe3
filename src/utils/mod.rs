//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::{AppError, Result};

const PROPERTIES: &str = "properties";
const ACCOUNTS: &str = "accounts";
const AUDIENCES: &str = "audiences";

/// Extract the path component of an absolute URL (scheme, host and query dropped).
pub fn landing_path(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw.trim()).map_err(|e| AppError::invalid_url(raw, e))?;
    if parsed.cannot_be_a_base() {
        return Err(AppError::invalid_url(raw, "URL has no hierarchical path"));
    }
    Ok(parsed.path().to_string())
}

/// Normalize a property reference to `properties/{id}`.
///
/// Accepts a bare id, `properties/{id}` or `accounts/{a}/properties/{id}`.
pub fn property_name(raw: &str) -> Result<String> {
    let segments: Vec<&str> = raw.trim().split('/').collect();

    let id = match segments.as_slice() {
        [id] if !is_collection(id) => *id,
        [PROPERTIES, id] => *id,
        [ACCOUNTS, account, PROPERTIES, id] if !account.is_empty() => *id,
        _ => "",
    };

    if id.is_empty() {
        return Err(AppError::validation(
            "properties",
            format!("'{raw}' is not a property id or property resource name"),
        ));
    }
    Ok(format!("{PROPERTIES}/{id}"))
}

/// Normalize an account reference to `accounts/{id}`.
pub fn account_name(raw: &str) -> Result<String> {
    let segments: Vec<&str> = raw.trim().split('/').collect();

    let id = match segments.as_slice() {
        [id] if !is_collection(id) => *id,
        [ACCOUNTS, id] => *id,
        _ => "",
    };

    if id.is_empty() {
        return Err(AppError::validation(
            "account",
            format!("'{raw}' is not an account id or account resource name"),
        ));
    }
    Ok(format!("{ACCOUNTS}/{id}"))
}

/// Reduce an audience reference (bare id or full resource name) to its id.
pub fn audience_id(raw: &str) -> Result<String> {
    let segments: Vec<&str> = raw.trim().split('/').collect();

    match segments.as_slice() {
        [id] if !id.is_empty() && !is_collection(id) => Ok(id.to_string()),
        [_, _, _, id] => full_audience_name(raw).map(|_| id.to_string()),
        _ => Err(AppError::validation(
            "audience",
            format!("'{raw}' is not an audience id or audience resource name"),
        )),
    }
}

/// Check a full `properties/{p}/audiences/{a}` name and return it trimmed.
pub fn full_audience_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let segments: Vec<&str> = trimmed.split('/').collect();

    match segments.as_slice() {
        [PROPERTIES, property, AUDIENCES, id] if !property.is_empty() && !id.is_empty() => {
            Ok(trimmed.to_string())
        }
        _ => Err(AppError::validation(
            "audience",
            format!("'{raw}' is not of the form properties/{{p}}/audiences/{{a}}"),
        )),
    }
}

/// Collection names are never ids.
fn is_collection(segment: &str) -> bool {
    matches!(segment, PROPERTIES | ACCOUNTS | AUDIENCES)
}

/// Full resource name of an audience under a property.
pub fn audience_name(property: &str, audience_id: &str) -> String {
    format!("{property}/{AUDIENCES}/{audience_id}")
}
