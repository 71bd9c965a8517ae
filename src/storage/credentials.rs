//! Credential records and the per-backend schemas they are checked against.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared type of a credential field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Boolean,
}

impl FieldType {
    /// Whether `value` satisfies this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}

/// One required field of a backend's credential schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialField {
    pub name: &'static str,
    pub kind: FieldType,
}

impl CredentialField {
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldType::String,
        }
    }
}

/// Unordered mapping of credential field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(BTreeMap<String, Value>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String value of a field, if present and a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Check a record against a schema.
///
/// Every schema field must be present with a matching type. Fields the schema
/// does not mention are ignored.
pub fn validate(schema: &[CredentialField], record: &Credentials) -> bool {
    schema.iter().all(|field| match record.get(field.name) {
        Some(value) => field.kind.matches(value),
        None => false,
    })
}

/// Human-readable reasons a record fails [`validate`]; empty when valid.
pub fn problems(schema: &[CredentialField], record: &Credentials) -> Vec<String> {
    schema
        .iter()
        .filter_map(|field| match record.get(field.name) {
            None => Some(format!("missing field '{}'", field.name)),
            Some(value) if !field.kind.matches(value) => Some(format!(
                "field '{}' should be {:?}",
                field.name, field.kind
            )),
            Some(_) => None,
        })
        .collect()
}
