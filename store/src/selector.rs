//! Rich-query selectors: field-equality conjunctions over JSON records.
//!
//! The textual form is the CouchDB-style expression the ledger understands,
//! `{"selector":{"State":"made","PayBillID":"acmid"}}`.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::StoreError;

/// A conjunction of `field == value` predicates over a JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    fields: BTreeMap<String, String>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `field == value` conjunct, replacing any earlier one on `field`.
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reject selectors no store can evaluate.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.fields.is_empty() {
            return Err(StoreError::InvalidQuery(
                "selector must contain at least one field".into(),
            ));
        }
        if self.fields.keys().any(|f| f.is_empty()) {
            return Err(StoreError::InvalidQuery("selector field name is empty".into()));
        }
        Ok(())
    }

    /// Whether a JSON document satisfies every conjunct.
    ///
    /// Non-object documents and non-string field values never match.
    pub fn matches(&self, document: &Value) -> bool {
        let Some(object) = document.as_object() else {
            return false;
        };
        self.fields
            .iter()
            .all(|(field, expected)| object.get(field).and_then(Value::as_str) == Some(expected))
    }

    /// Decode raw stored bytes and test them.
    pub fn matches_bytes(&self, value: &[u8]) -> bool {
        serde_json::from_slice::<Value>(value)
            .map(|doc| self.matches(&doc))
            .unwrap_or(false)
    }

    /// Render as a `{"selector":{...}}` query expression.
    pub fn to_query_string(&self) -> String {
        let inner: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let mut outer = Map::new();
        outer.insert("selector".into(), Value::Object(inner));
        Value::Object(outer).to_string()
    }

    /// Parse a `{"selector":{...}}` query expression.
    pub fn parse(query: &str) -> Result<Self, StoreError> {
        let value: Value =
            serde_json::from_str(query).map_err(|e| StoreError::InvalidQuery(e.to_string()))?;
        let inner = value
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| StoreError::InvalidQuery("missing \"selector\" object".into()))?;
        let mut selector = Self::new();
        for (field, expected) in inner {
            let expected = expected.as_str().ok_or_else(|| {
                StoreError::InvalidQuery(format!(
                    "field {field:?} must compare against a string"
                ))
            })?;
            selector = selector.field_eq(field.clone(), expected);
        }
        selector.validate()?;
        Ok(selector)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}
