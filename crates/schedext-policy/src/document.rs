//! Typed policy document schema
//!
//! Wire format is the scheduler's `Policy` JSON. Fields our template does not
//! own are optional and round-trip untouched, so foreign extender entries on
//! disk survive a rewrite with everything except their URL host intact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "Policy".to_string()
}

/// The scheduler policy document: a list of extender registrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub extenders: Vec<ExtenderEntry>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            extenders: Vec::new(),
        }
    }
}

/// A single extender registration record.
///
/// Every scalar is optional on the wire: entries written by other operators
/// may omit verbs or flags, and omitted fields must not be invented on
/// rewrite. Unrecognized keys are preserved through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtenderEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_verb: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_verb: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioritize_verb: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_https: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignorable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_cache_capable: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_resources: Vec<ManagedResource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExtenderEntry {
    /// Name of the first managed resource, the merge identity of an entry.
    pub fn resource_name(&self) -> Option<&str> {
        self.managed_resources.first().map(|r| r.name.as_str())
    }
}

/// A resource managed by an extender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedResource {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_by_scheduler: Option<bool>,
}

impl PolicyDocument {
    /// Parse a policy document from JSON.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| Error::malformed(e.to_string()))
    }

    /// Serialize with sorted keys and four-space indentation.
    ///
    /// Output is byte-for-byte deterministic for a given document, so two
    /// rewrites of unchanged state compare equal under fingerprinting.
    pub fn to_pretty_json(&self) -> Result<String> {
        let value = sort_value(&serde_json::to_value(self)?);
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        value.serialize(&mut ser)?;
        // Vec was produced by serde_json, always valid UTF-8
        Ok(String::from_utf8(out).unwrap_or_default())
    }
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = Map::new();
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.clone(), sort_value(v));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}
