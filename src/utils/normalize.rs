// src/utils/normalize.rs

//! Shape reconciliation for the catalogue's JSONB columns.
//!
//! Problem rows were imported across several catalogue revisions, so a
//! column may hold a native JSON array, a JSON-encoded string, or (for
//! use cases) an array of bare strings instead of structured objects.
//! Everything is decoded here, once, at the storage boundary; display
//! code only ever sees the canonical types. Malformed data degrades to
//! the fallback value. None of these functions can fail.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::BTreeMap;

/// A real-world application of a problem.
///
/// Older catalogue rows spell the fields `Field`/`Description`; the serde
/// aliases fold those into the canonical spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCase {
    #[serde(alias = "Field", alias = "field", alias = "Name")]
    pub name: String,
    #[serde(alias = "Description")]
    pub description: String,
}

/// One entry of a solution's `approaches` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approach {
    pub title: Option<String>,
    pub description: String,
}

/// Value of one `key_insights` section: either a list of named items or a
/// single prose description. Renderers branch on this per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsightValue {
    Items(Vec<UseCase>),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUseCase {
    Structured(UseCase),
    Plain(String),
}

/// Decodes a stored JSONB value that may be the canonical shape or a
/// JSON-encoded string of it. `None`, JSON null, and anything that fails
/// to decode all collapse to `fallback`.
pub fn decode_lenient<T: DeserializeOwned>(raw: Option<&Value>, fallback: T) -> T {
    let Some(value) = raw else {
        return fallback;
    };
    match value {
        Value::Null => fallback,
        Value::String(text) => serde_json::from_str(text).unwrap_or(fallback),
        other => serde_json::from_value(other.clone()).unwrap_or(fallback),
    }
}

/// Canonical form of `category` and `supported_languages`.
pub fn string_list(raw: Option<&Value>) -> Vec<String> {
    decode_lenient(raw, Vec::new())
}

/// Canonical form of `use_cases`.
///
/// Bare strings ("Financial matching") are wrapped as
/// `{name: "Use Case", description: <string>}`.
pub fn use_case_list(raw: Option<&Value>) -> Vec<UseCase> {
    let entries: Vec<RawUseCase> = decode_lenient(raw, Vec::new());
    entries
        .into_iter()
        .map(|entry| match entry {
            RawUseCase::Structured(use_case) => use_case,
            RawUseCase::Plain(description) => UseCase {
                name: "Use Case".to_string(),
                description,
            },
        })
        .collect()
}

/// Canonical form of `key_insights`: section name to items-or-prose.
pub fn key_insights(raw: Option<&Value>) -> BTreeMap<String, InsightValue> {
    decode_lenient(raw, BTreeMap::new())
}

/// Canonical form of a solution's `approaches`.
pub fn approach_list(raw: Option<&Value>) -> Vec<Approach> {
    decode_lenient(raw, Vec::new())
}
