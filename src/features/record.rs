//! Single-row feature record with named columns

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::PredictorError;

/// Scalar value stored in a feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl FeatureValue {
    /// Numeric view of the value; `None` for text
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Integer(v) => Some(*v as f64),
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Integer(value)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

/// Feature name to value, one row.
///
/// Columns are keyed by name so the record is independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    columns: BTreeMap<String, FeatureValue>,
}

impl FeatureRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FeatureValue>) {
        self.columns.insert(name.to_string(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Fail unless the record has exactly the `expected` columns
    pub fn ensure_columns(&self, expected: &[&str]) -> crate::Result<()> {
        let missing: Vec<&str> = expected
            .iter()
            .copied()
            .filter(|name| !self.columns.contains_key(*name))
            .collect();
        let unexpected: Vec<&str> = self
            .names()
            .filter(|name| !expected.contains(name))
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            return Ok(());
        }

        let mut parts = Vec::new();
        if !missing.is_empty() {
            parts.push(format!("missing columns [{}]", missing.join(", ")));
        }
        if !unexpected.is_empty() {
            parts.push(format!("unexpected columns [{}]", unexpected.join(", ")));
        }
        Err(PredictorError::schema_mismatch(parts.join("; ")))
    }
}
