//! Records carried by MDN sections.

use crate::common::config::ContextConfig;
use crate::common::errors::MdnError;
use crate::sheet::cell_ref::CellRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;

pub const UNKNOWN_SOURCE: &str = "unknown.xlsx";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderRecord {
    pub source: String,
    pub version: String,
    pub created: String,
    pub sheets: Vec<String>,
}

/// Informational block written after the header; never validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRecord {
    pub purpose: String,
    pub key_metrics: Vec<String>,
    pub business_rules: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<u32>,
}

/// Formulas by fully-qualified cell key, in first-seen order.
///
/// Re-inserting a key keeps its position and the last write wins.
pub type FormulaMap = IndexMap<String, String>;
pub type FormatMap = IndexMap<String, FormatRecord>;

impl HeaderRecord {
    pub fn fallback() -> Self {
        Self {
            source: UNKNOWN_SOURCE.to_string(),
            version: String::new(),
            created: String::new(),
            sheets: Vec::new(),
        }
    }

    /// Lenient read of a parsed header mapping; absent keys keep fallbacks.
    pub fn from_yaml(value: &YamlValue) -> Result<Self, MdnError> {
        let map = value
            .as_mapping()
            .ok_or_else(|| MdnError::malformed("HEADER", "expected a mapping"))?;
        let text = |key: &str| map.get(key).and_then(scalar_text);

        let sheets = match map.get("sheets") {
            Some(YamlValue::Sequence(items)) => items.iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        };
        Ok(Self {
            source: text("source").unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            version: text("version").unwrap_or_default(),
            created: text("created").unwrap_or_default(),
            sheets,
        })
    }
}

impl From<&ContextConfig> for ContextRecord {
    fn from(config: &ContextConfig) -> Self {
        Self {
            purpose: config.purpose.clone(),
            key_metrics: config.key_metrics.clone(),
            business_rules: config.business_rules.clone(),
        }
    }
}

impl FormatRecord {
    pub fn is_empty(&self) -> bool {
        self.number_format.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.color.is_none()
            && self.theme.is_none()
    }
}

/// `"<sheet>!<CellRef>"`.
pub fn qualified_key(sheet: &str, cell: &CellRef) -> String {
    format!("{sheet}!{cell}")
}

/// Splits a fully-qualified key on its first `!`.
pub fn split_qualified_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('!')
}

pub fn scalar_text(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
