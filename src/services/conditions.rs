// src/services/conditions.rs

//! Condition template catalog.
//!
//! A condition is a named list of GA4 filter clauses with exactly one
//! `"{{URL_PATTERNS}}"` placeholder node marking where the URL-pattern
//! expressions go. The catalog is validated as a whole when loaded and is
//! read-only afterwards, so it can be shared behind an `Arc` without locks.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Placeholder node replaced by the URL-pattern expressions.
pub const URL_PATTERNS_PLACEHOLDER: &str = "{{URL_PATTERNS}}";

/// One entry of `conditions.json`.
#[derive(Debug, Clone, Deserialize)]
struct ConditionEntry {
    name: String,
    #[serde(default)]
    description: String,
    template: Value,
}

/// A named, validated filter-clause template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub name: String,
    pub description: String,
    /// Filter clauses, still holding the placeholder
    pub clauses: Vec<Value>,
}

impl Condition {
    /// Copy the clauses with the placeholder replaced by `expressions`.
    ///
    /// The stored template is never touched.
    pub fn instantiate(&self, expressions: &[Value]) -> Vec<Value> {
        self.clauses
            .iter()
            .map(|clause| substitute(clause, expressions))
            .collect()
    }
}

/// Immutable catalog of conditions, keeping file order.
#[derive(Debug, Clone, Default)]
pub struct ConditionStore {
    order: Vec<String>,
    conditions: HashMap<String, Condition>,
}

impl ConditionStore {
    /// Load and validate a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config_load(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let entries: Vec<ConditionEntry> = serde_json::from_str(content)
            .map_err(|e| AppError::config_load(format!("malformed catalog: {e}")))?;

        let mut store = Self::default();
        for entry in entries {
            let condition = Self::validate_entry(entry)?;
            if store.conditions.contains_key(&condition.name) {
                return Err(AppError::config_load(format!(
                    "duplicate condition '{}'",
                    condition.name
                )));
            }
            store.order.push(condition.name.clone());
            store.conditions.insert(condition.name.clone(), condition);
        }

        Ok(store)
    }

    fn validate_entry(entry: ConditionEntry) -> Result<Condition> {
        let name = entry.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::config_load("condition with empty name"));
        }

        let clauses = match entry.template {
            Value::Array(items) => items,
            obj @ Value::Object(_) => vec![obj],
            _ => {
                return Err(AppError::config_load(format!(
                    "condition '{name}': template must be an object or a list of objects"
                )));
            }
        };
        if clauses.is_empty() || clauses.iter().any(|c| !c.is_object()) {
            return Err(AppError::config_load(format!(
                "condition '{name}': template must hold at least one clause object"
            )));
        }

        let placeholders: usize = clauses.iter().map(count_placeholders).sum();
        if placeholders != 1 {
            return Err(AppError::config_load(format!(
                "condition '{name}': expected exactly one {URL_PATTERNS_PLACEHOLDER} placeholder, found {placeholders}"
            )));
        }

        Ok(Condition {
            name,
            description: entry.description,
            clauses,
        })
    }

    /// Look up a condition by name.
    pub fn get(&self, name: &str) -> Result<&Condition> {
        self.conditions
            .get(name)
            .ok_or_else(|| AppError::UnknownCondition(name.to_string()))
    }

    /// Condition names in catalog order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Conditions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.order.iter().filter_map(|name| self.conditions.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Names that are not in the catalog, deduplicated, in request order.
    pub fn missing<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        names
            .iter()
            .map(String::as_str)
            .filter(|name| !self.conditions.contains_key(*name) && seen.insert(*name))
            .collect()
    }
}

fn is_placeholder(value: &Value) -> bool {
    value.as_str() == Some(URL_PATTERNS_PLACEHOLDER)
}

fn count_placeholders(value: &Value) -> usize {
    match value {
        v if is_placeholder(v) => 1,
        Value::Array(items) => items.iter().map(count_placeholders).sum(),
        Value::Object(map) => map.values().map(count_placeholders).sum(),
        _ => 0,
    }
}

/// Build a substituted copy of `value`.
///
/// Inside an array the placeholder is spliced out into the expressions;
/// anywhere else it becomes an array of them.
fn substitute(value: &Value, expressions: &[Value]) -> Value {
    match value {
        v if is_placeholder(v) => Value::Array(expressions.to_vec()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len() + expressions.len());
            for item in items {
                if is_placeholder(item) {
                    out.extend(expressions.iter().cloned());
                } else {
                    out.push(substitute(item, expressions));
                }
            }
            Value::Array(out)
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute(v, expressions)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn catalog() -> String {
        json!([
            {
                "name": "QMF_BASELINE",
                "description": "Landing page visitors",
                "template": [{
                    "clauseType": "INCLUDE",
                    "simpleFilter": {
                        "scope": "AUDIENCE_FILTER_SCOPE_WITHIN_SAME_SESSION",
                        "filterExpression": {
                            "andGroup": {
                                "filterExpressions": [
                                    { "orGroup": { "filterExpressions": ["{{URL_PATTERNS}}"] } }
                                ]
                            }
                        }
                    }
                }]
            },
            {
                "name": "PURCHASERS",
                "template": {
                    "clauseType": "INCLUDE",
                    "simpleFilter": {
                        "filterExpression": {
                            "andGroup": {
                                "filterExpressions": [
                                    { "orGroup": { "filterExpressions": "{{URL_PATTERNS}}" } },
                                    { "eventFilter": { "eventName": "purchase" } }
                                ]
                            }
                        }
                    }
                }
            }
        ])
        .to_string()
    }

    #[test]
    fn test_load_keeps_file_order() {
        let store = ConditionStore::from_json(&catalog()).unwrap();
        assert_eq!(store.names(), ["QMF_BASELINE", "PURCHASERS"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("PURCHASERS").unwrap().clauses.len(), 1);
    }

    #[test]
    fn test_unknown_condition() {
        let store = ConditionStore::from_json(&catalog()).unwrap();
        assert!(matches!(
            store.get("NOPE"),
            Err(AppError::UnknownCondition(name)) if name == "NOPE"
        ));
    }

    #[test]
    fn test_missing_placeholder_fails_load() {
        let content = json!([{ "name": "A", "template": { "clauseType": "INCLUDE" } }]).to_string();
        assert!(matches!(
            ConditionStore::from_json(&content),
            Err(AppError::ConfigLoad(_))
        ));
    }

    #[test]
    fn test_repeated_placeholder_fails_load() {
        let content = json!([{
            "name": "A",
            "template": { "a": "{{URL_PATTERNS}}", "b": ["{{URL_PATTERNS}}"] }
        }])
        .to_string();
        assert!(ConditionStore::from_json(&content).is_err());
    }

    #[test]
    fn test_one_bad_entry_rejects_whole_catalog() {
        let content = json!([
            { "name": "GOOD", "template": { "x": "{{URL_PATTERNS}}" } },
            { "name": "BAD", "template": "{{URL_PATTERNS}}" }
        ])
        .to_string();
        assert!(ConditionStore::from_json(&content).is_err());
    }

    #[test]
    fn test_duplicate_name_fails_load() {
        let content = json!([
            { "name": "A", "template": { "x": "{{URL_PATTERNS}}" } },
            { "name": "A", "template": { "y": "{{URL_PATTERNS}}" } }
        ])
        .to_string();
        assert!(ConditionStore::from_json(&content).is_err());
    }

    #[test]
    fn test_substring_is_not_a_placeholder() {
        let content = json!([{
            "name": "A",
            "template": { "note": "see {{URL_PATTERNS}} docs", "x": "{{URL_PATTERNS}}" }
        }])
        .to_string();
        let store = ConditionStore::from_json(&content).unwrap();
        let clauses = store.get("A").unwrap().instantiate(&[json!(1)]);
        assert_eq!(clauses[0]["note"], "see {{URL_PATTERNS}} docs");
        assert_eq!(clauses[0]["x"], json!([1]));
    }

    #[test]
    fn test_instantiate_splices_into_array() {
        let store = ConditionStore::from_json(&catalog()).unwrap();
        let exprs = vec![json!({ "p": 1 }), json!({ "p": 2 })];
        let clauses = store.get("QMF_BASELINE").unwrap().instantiate(&exprs);

        let inner = &clauses[0]["simpleFilter"]["filterExpression"]["andGroup"]
            ["filterExpressions"][0]["orGroup"]["filterExpressions"];
        assert_eq!(inner, &json!([{ "p": 1 }, { "p": 2 }]));
    }

    #[test]
    fn test_instantiate_leaves_template_untouched() {
        let store = ConditionStore::from_json(&catalog()).unwrap();
        let condition = store.get("PURCHASERS").unwrap();
        let before = condition.clone();

        let _ = condition.instantiate(&[json!({ "p": 1 })]);
        let _ = condition.instantiate(&[json!({ "p": 2 }), json!({ "p": 3 })]);

        assert_eq!(condition, &before);
    }

    #[test]
    fn test_missing_names() {
        let store = ConditionStore::from_json(&catalog()).unwrap();
        let names = vec!["QMF_BASELINE".to_string(), "X".to_string(), "X".to_string()];
        assert_eq!(store.missing(&names), vec!["X"]);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("conditions.json");
        std::fs::write(&path, catalog()).unwrap();

        let store = ConditionStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);

        assert!(matches!(
            ConditionStore::load(tmp.path().join("absent.json")),
            Err(AppError::ConfigLoad(_))
        ));
    }
}
