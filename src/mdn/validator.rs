//! Structural conformance check of MDN text.
//!
//! The validator reads only the document text. Every finding is collected;
//! a document is valid when no errors were recorded.

use crate::common::config::ValidateConfig;
use crate::common::json::JsonUtil;
use crate::mdn::document::{scalar_text, split_qualified_key};
use crate::mdn::grammar::{self, RawSection, ScannedDocument, SectionKind, END_MARKER};
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::collections::HashSet;

const HEADER_KEYS: [&str; 4] = ["source", "version", "created", "sheets"];

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").expect("valid version regex"));
static FORMULA_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^!]+![A-Z]+\d+$").expect("valid formula key regex"));

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub sections_found: Vec<SectionKind>,
    pub sheet_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Validator {
    ai_prompt_soft_limit: usize,
}

#[derive(Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::with_config(&ValidateConfig::default())
    }
}

impl Validator {
    pub fn with_config(config: &ValidateConfig) -> Self {
        Self {
            ai_prompt_soft_limit: config.ai_prompt_soft_limit,
        }
    }

    pub fn validate(&self, text: &str) -> ValidationReport {
        let doc = grammar::scan(text);
        let mut found = Findings::default();

        if !doc.has_end_marker {
            found.error(format!("missing '{END_MARKER}' marker"));
        }

        let sections_found = sections_found(&doc);
        for kind in SectionKind::ORDERED {
            if kind.is_required() && !sections_found.contains(&kind) {
                found.error(format!("missing required section: {kind}"));
            }
        }
        check_duplicates(&doc, &mut found);
        check_terminated(&doc, &mut found);

        let header_sheets = first_of(&doc, SectionKind::Header)
            .map(|section| check_header(section, &mut found))
            .unwrap_or_default();
        let sheet_names = check_sheets(&doc, &mut found);
        check_sheet_divergence(&header_sheets, &sheet_names, &mut found);

        if let Some(section) = first_of(&doc, SectionKind::Formulas) {
            check_formulas(section, &sheet_names, &mut found);
        }
        if let Some(section) = first_of(&doc, SectionKind::Format) {
            check_format(section, &mut found);
        }
        if let Some(section) = first_of(&doc, SectionKind::AiPrompt) {
            self.check_ai_prompt(section, &mut found);
        }
        check_order(&doc, &mut found);

        ValidationReport {
            is_valid: found.errors.is_empty(),
            errors: found.errors,
            warnings: found.warnings,
            sections_found,
            sheet_names,
        }
    }

    fn check_ai_prompt(&self, section: &RawSection<'_>, found: &mut Findings) {
        let text = section.payload_text();
        let prompt = text.trim();
        if prompt.is_empty() {
            found.warn("AI_PROMPT section is empty");
        } else if prompt.chars().count() > self.ai_prompt_soft_limit {
            found.warn(format!(
                "AI_PROMPT section exceeds {} characters",
                self.ai_prompt_soft_limit
            ));
        }
    }
}

impl Findings {
    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

fn sections_found(doc: &ScannedDocument<'_>) -> Vec<SectionKind> {
    let mut kinds = Vec::new();
    for section in &doc.sections {
        if section.kind != SectionKind::Unknown && !kinds.contains(&section.kind) {
            kinds.push(section.kind);
        }
    }
    kinds
}

fn first_of<'d, 'a>(
    doc: &'d ScannedDocument<'a>,
    kind: SectionKind,
) -> Option<&'d RawSection<'a>> {
    doc.sections.iter().find(|section| section.kind == kind)
}

fn check_duplicates(doc: &ScannedDocument<'_>, found: &mut Findings) {
    for kind in SectionKind::ORDERED {
        if kind == SectionKind::Sheet {
            continue;
        }
        let count = doc.sections.iter().filter(|s| s.kind == kind).count();
        if count > 1 {
            found.error(format!("{kind} section appears {count} times"));
        }
    }
}

fn check_terminated(doc: &ScannedDocument<'_>, found: &mut Findings) {
    for section in doc.sections.iter().filter(|s| s.kind != SectionKind::Unknown) {
        if !section.terminated {
            found.warn(format!(
                "{} section on line {} is not closed by '{}'",
                section.kind,
                section.line + 1,
                grammar::DELIMITER
            ));
        }
    }
}

/// Returns the header's sheet list when it is readable.
fn check_header(section: &RawSection<'_>, found: &mut Findings) -> Vec<String> {
    let text = section.payload_text();
    if text.trim().is_empty() {
        found.error("HEADER section is empty");
        return Vec::new();
    }
    let value = match serde_yaml::from_str::<YamlValue>(&text) {
        Ok(value) => value,
        Err(e) => {
            found.error(format!("invalid YAML in HEADER section: {e}"));
            return Vec::new();
        }
    };
    let Some(map) = value.as_mapping() else {
        found.error("HEADER section must be a YAML mapping");
        return Vec::new();
    };

    for key in HEADER_KEYS {
        if !map.contains_key(key) {
            found.error(format!("missing required HEADER field: {key}"));
        }
    }

    let mut sheets = Vec::new();
    match map.get("sheets") {
        Some(YamlValue::Sequence(items)) if items.is_empty() => {
            found.error("HEADER 'sheets' list cannot be empty")
        }
        Some(YamlValue::Sequence(items)) => {
            sheets = items
                .iter()
                .filter_map(scalar_text)
                .collect();
            let unique: HashSet<&String> = sheets.iter().collect();
            if unique.len() != sheets.len() {
                found.warn("duplicate sheet names in HEADER 'sheets'");
            }
        }
        Some(_) => found.error("HEADER 'sheets' field must be a list"),
        None => {}
    }

    if let Some(version) = map.get("version") {
        let text = scalar_text(version).unwrap_or_default();
        if !VERSION_RE.is_match(&text) {
            found.warn(format!(
                "HEADER version '{text}' is not a semantic version (e.g. 1.0.0)"
            ));
        }
    }
    if let Some(created) = map.get("created") {
        let text = scalar_text(created).unwrap_or_default();
        if DateTime::parse_from_rfc3339(&text).is_err() {
            found.warn(format!("HEADER created '{text}' is not an ISO-8601 timestamp"));
        }
    }
    sheets
}

/// Returns sheet names in document order, each once.
fn check_sheets(doc: &ScannedDocument<'_>, found: &mut Findings) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for section in doc.sections.iter().filter(|s| s.kind == SectionKind::Sheet) {
        let Some(name) = section.sheet_name() else {
            found.error(format!(
                "missing sheet name in SHEET section at line {}",
                section.line + 1
            ));
            continue;
        };
        if names.contains(&name) {
            found.warn(format!("sheet '{name}' appears in more than one SHEET section"));
        } else {
            names.push(name.clone());
        }

        if section.payload.is_empty() {
            found.error(format!("SHEET section for '{name}' is empty"));
            continue;
        }
        let rows: Vec<&str> = section
            .payload
            .iter()
            .copied()
            .filter(|line| !line.trim().is_empty())
            .collect();
        if grammar::ends_inside_quotes(&section.payload) {
            found.error(format!("sheet '{name}' ends inside a quoted field"));
        }
        if rows.len() < 2 {
            found.warn(format!("sheet '{name}' has fewer than 2 rows"));
        }
        let widths: HashSet<usize> = rows.iter().map(|line| line.split(',').count()).collect();
        if widths.len() > 1 {
            found.warn(format!("sheet '{name}' has inconsistent column counts"));
        }
    }
    names
}

fn check_sheet_divergence(header: &[String], sections: &[String], found: &mut Findings) {
    if header.is_empty() {
        return;
    }
    for name in sections.iter().filter(|name| !header.contains(name)) {
        found.warn(format!("SHEET section '{name}' is not listed in HEADER 'sheets'"));
    }
    for name in header.iter().filter(|name| !sections.contains(name)) {
        found.warn(format!("HEADER sheet '{name}' has no SHEET section"));
    }
}

fn check_formulas(section: &RawSection<'_>, sheets: &[String], found: &mut Findings) {
    let text = section.payload_text();
    if text.trim().is_empty() {
        found.error("FORMULAS section is empty");
        return;
    }
    let value = match JsonUtil::parse_strict("FORMULAS", &text) {
        Ok(value) => value,
        Err(e) => {
            found.error(e.to_string());
            return;
        }
    };
    let JsonValue::Object(entries) = value else {
        found.error(format!(
            "FORMULAS section must contain a JSON object, found {}",
            JsonUtil::type_name(&value)
        ));
        return;
    };

    for (key, formula) in &entries {
        let JsonValue::String(formula) = formula else {
            found.error(format!(
                "formula for {key} must be a string, found {}",
                JsonUtil::type_name(formula)
            ));
            continue;
        };
        if !FORMULA_KEY_RE.is_match(key) {
            found.warn(format!("formula key may be invalid: {key}"));
        } else if let Some((sheet, _)) = split_qualified_key(key) {
            if !sheets.iter().any(|name| name == sheet) {
                found.warn(format!("formula key {key} names a sheet without a SHEET section"));
            }
        }
        if !formula.starts_with('=') {
            found.warn(format!("formula for {key} should start with '=': {formula}"));
        }
    }
}

fn check_format(section: &RawSection<'_>, found: &mut Findings) {
    let text = section.payload_text();
    if text.trim().is_empty() {
        found.error("FORMAT section is empty");
        return;
    }
    let value = match JsonUtil::parse_strict("FORMAT", &text) {
        Ok(value) => value,
        Err(e) => {
            found.error(e.to_string());
            return;
        }
    };
    let JsonValue::Object(entries) = value else {
        found.error(format!(
            "FORMAT section must contain a JSON object, found {}",
            JsonUtil::type_name(&value)
        ));
        return;
    };
    for (key, record) in &entries {
        if !record.is_object() {
            found.error(format!(
                "format entry for {key} must be an object, found {}",
                JsonUtil::type_name(record)
            ));
        }
    }
}

/// Present kinds, at their earliest position, must follow the canonical order.
fn check_order(doc: &ScannedDocument<'_>, found: &mut Findings) {
    let present: Vec<(SectionKind, usize)> = SectionKind::ORDERED
        .into_iter()
        .filter_map(|kind| first_of(doc, kind).map(|section| (kind, section.line)))
        .collect();
    for pair in present.windows(2) {
        let ((before, before_line), (after, after_line)) = (pair[0], pair[1]);
        if before_line > after_line {
            found.error(format!(
                "section order violation: {before} appears after {after}"
            ));
        }
    }
}
