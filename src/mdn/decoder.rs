//! MDN text to workbook construction plan.
//!
//! Decoding is tolerant: a malformed section degrades to its default and a
//! key that cannot be resolved skips that one write. Both leave a warning
//! behind and the rest of the document is still applied.

use crate::common::config::ReferenceConfig;
use crate::common::errors::MdnError;
use crate::mdn::document::{
    split_qualified_key, FormatMap, FormatRecord, FormulaMap, HeaderRecord,
};
use crate::mdn::grammar::{self, RawSection, SectionKind, CONTEXT_MARKER};
use crate::sheet::cell_ref::{parse_cell_ref, parse_range_ref, CellRef};
use crate::sheet::sheet_model::{CellValue, FontColor, StylePatch, Workbook};
use csv::{ReaderBuilder, StringRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value as YamlValue};
use tracing::{debug, warn};

static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("valid integer regex"));
static REAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+\.[0-9]+$").expect("valid real regex"));
static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9A-Fa-f]{6})$").expect("valid color regex"));

/// One workbook write. Rows and columns are zero-based.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOp {
    CreateSheet {
        name: String,
    },
    SetValue {
        sheet: String,
        row: usize,
        col: usize,
        value: CellValue,
    },
    SetFormula {
        sheet: String,
        row: usize,
        col: usize,
        formula: String,
    },
    SetFormat {
        sheet: String,
        row: usize,
        col: usize,
        patch: StylePatch,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildPlan {
    pub ops: Vec<BuildOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub header: HeaderRecord,
    pub plan: BuildPlan,
    pub ai_prompt: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Decoder {
    column_range_rows: u32,
}

#[derive(Default)]
struct Sections {
    header: Option<HeaderRecord>,
    sheets: Vec<(String, Vec<StringRecord>)>,
    formulas: FormulaMap,
    formats: FormatMap,
    ai_prompt: Option<String>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(&ReferenceConfig::default())
    }
}

impl Decoder {
    pub fn new(references: &ReferenceConfig) -> Self {
        Self {
            column_range_rows: references.column_range_rows,
        }
    }

    pub fn decode(&self, text: &str) -> Decoded {
        let mut warnings = Vec::new();
        let sections = Self::collect_sections(text, &mut warnings);

        let mut plan = BuildPlan::default();
        for (name, _) in &sections.sheets {
            plan.ops.push(BuildOp::CreateSheet { name: name.clone() });
        }
        for (name, rows) in &sections.sheets {
            Self::plan_sheet_values(&mut plan, name, rows);
        }
        let known: Vec<&str> = sections.sheets.iter().map(|(n, _)| n.as_str()).collect();
        Self::plan_formulas(&mut plan, &known, &sections.formulas, &mut warnings);
        self.plan_formats(&mut plan, &known, &sections.formats, &mut warnings);

        let header = sections.header.unwrap_or_else(|| {
            record(
                &mut warnings,
                MdnError::malformed("HEADER", "section is missing"),
            );
            HeaderRecord::fallback()
        });
        Decoded {
            header,
            plan,
            ai_prompt: sections.ai_prompt,
            warnings,
        }
    }

    fn collect_sections(text: &str, warnings: &mut Vec<String>) -> Sections {
        let scanned = grammar::scan(text);
        let mut out = Sections::default();

        for section in &scanned.sections {
            match section.kind {
                SectionKind::Header => {
                    if out.header.is_some() {
                        record(
                            warnings,
                            MdnError::malformed("HEADER", "duplicate section ignored"),
                        );
                        continue;
                    }
                    out.header = Some(Self::parse_header(section, warnings));
                }
                SectionKind::Sheet => Self::collect_sheet(section, &mut out.sheets, warnings),
                SectionKind::Formulas => {
                    for (key, value) in parse_mapping("FORMULAS", section, warnings) {
                        match (key, value) {
                            (YamlValue::String(key), YamlValue::String(formula)) => {
                                out.formulas.insert(key, formula);
                            }
                            (key, _) => record(
                                warnings,
                                MdnError::malformed(
                                    "FORMULAS",
                                    format!("entry {key:?} is not a string pair"),
                                ),
                            ),
                        }
                    }
                }
                SectionKind::Format => {
                    for (key, value) in parse_mapping("FORMAT", section, warnings) {
                        let YamlValue::String(key) = key else {
                            record(
                                warnings,
                                MdnError::malformed("FORMAT", format!("key {key:?} is not a string")),
                            );
                            continue;
                        };
                        match serde_yaml::from_value::<FormatRecord>(value) {
                            Ok(rule) => {
                                out.formats.insert(key, rule);
                            }
                            Err(e) => record(
                                warnings,
                                MdnError::malformed("FORMAT", format!("entry {key}: {e}")),
                            ),
                        }
                    }
                }
                SectionKind::AiPrompt => {
                    out.ai_prompt = Some(section.payload_text().trim().to_string());
                }
                SectionKind::Unknown => {
                    debug!(line = section.line + 1, "skipping unmarked segment");
                }
            }
        }
        out
    }

    fn parse_header(section: &RawSection<'_>, warnings: &mut Vec<String>) -> HeaderRecord {
        let lines: Vec<&str> = section
            .payload
            .iter()
            .copied()
            .take_while(|line| line.trim() != CONTEXT_MARKER)
            .collect();
        let parsed = serde_yaml::from_str::<YamlValue>(&lines.join("\n"))
            .map_err(|e| MdnError::malformed("HEADER", e))
            .and_then(|value| HeaderRecord::from_yaml(&value));
        match parsed {
            Ok(header) => header,
            Err(err) => {
                record(warnings, err);
                HeaderRecord::fallback()
            }
        }
    }

    fn collect_sheet(
        section: &RawSection<'_>,
        sheets: &mut Vec<(String, Vec<StringRecord>)>,
        warnings: &mut Vec<String>,
    ) {
        let Some(name) = section.sheet_name() else {
            record(
                warnings,
                MdnError::malformed(
                    "SHEET",
                    format!("no sheet name on line {}", section.line + 1),
                ),
            );
            return;
        };
        if grammar::ends_inside_quotes(&section.payload) {
            record(
                warnings,
                MdnError::malformed(
                    "SHEET",
                    format!("sheet '{name}' ends inside a quoted field"),
                ),
            );
        }
        // Blank lines outside quotes are skipped by the reader; inside a
        // quoted field they belong to the cell.
        let rows = Self::read_rows(&name, &section.payload_text(), warnings);
        if rows.is_empty() {
            record(
                warnings,
                MdnError::malformed("SHEET", format!("sheet '{name}' has no rows, dropped")),
            );
            return;
        }
        match sheets.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => {
                record(
                    warnings,
                    MdnError::malformed(
                        "SHEET",
                        format!("duplicate sheet '{name}', later payload wins"),
                    ),
                );
                entry.1 = rows;
            }
            None => sheets.push((name, rows)),
        }
    }

    fn read_rows(sheet: &str, payload: &str, warnings: &mut Vec<String>) -> Vec<StringRecord> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(payload.as_bytes());

        let mut rows = Vec::new();
        for result in reader.records() {
            match result {
                Ok(fields) => rows.push(fields),
                Err(e) => {
                    record(
                        warnings,
                        MdnError::malformed("SHEET", format!("sheet '{sheet}': {e}")),
                    );
                    break;
                }
            }
        }
        rows
    }

    fn plan_sheet_values(plan: &mut BuildPlan, sheet: &str, rows: &[StringRecord]) {
        for (row, fields) in rows.iter().enumerate() {
            for (col, field) in fields.iter().enumerate() {
                plan.ops.push(BuildOp::SetValue {
                    sheet: sheet.to_string(),
                    row,
                    col,
                    value: coerce_field(field),
                });
            }
        }
    }

    fn plan_formulas(
        plan: &mut BuildPlan,
        known: &[&str],
        formulas: &FormulaMap,
        warnings: &mut Vec<String>,
    ) {
        for (key, formula) in formulas.iter() {
            let (sheet, cell) = match resolve_key(key, known) {
                Ok(resolved) => resolved,
                Err(err) => {
                    record(warnings, err);
                    continue;
                }
            };
            let cell = match parse_cell_ref(cell) {
                Ok(cell) => cell,
                Err(err) => {
                    record(warnings, err);
                    continue;
                }
            };
            if !formula.starts_with('=') {
                record(
                    warnings,
                    MdnError::malformed(
                        "FORMULAS",
                        format!("{key} does not start with '=', kept as text"),
                    ),
                );
            }
            let (row, col) = cell.zero_based();
            plan.ops.push(BuildOp::SetFormula {
                sheet: sheet.to_string(),
                row,
                col,
                formula: formula.clone(),
            });
        }
    }

    fn plan_formats(
        &self,
        plan: &mut BuildPlan,
        known: &[&str],
        formats: &FormatMap,
        warnings: &mut Vec<String>,
    ) {
        for (key, rule) in formats.iter() {
            let (sheet, target) = match resolve_key(key, known) {
                Ok(resolved) => resolved,
                Err(err) => {
                    record(warnings, err);
                    continue;
                }
            };
            let expanded = if target.contains([':', ',']) {
                parse_range_ref(target, self.column_range_rows)
            } else {
                parse_cell_ref(target).map(|cell| vec![cell])
            };
            let cells: Vec<CellRef> = match expanded {
                Ok(cells) if !cells.is_empty() => cells,
                Ok(_) => continue,
                Err(err) => {
                    record(warnings, err);
                    continue;
                }
            };

            let patch = style_patch(key, rule, warnings);
            for cell in cells {
                let (row, col) = cell.zero_based();
                plan.ops.push(BuildOp::SetFormat {
                    sheet: sheet.to_string(),
                    row,
                    col,
                    patch: patch.clone(),
                });
            }
        }
    }
}

impl BuildPlan {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BuildOp::CreateSheet { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn formula_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, BuildOp::SetFormula { .. }))
            .count()
    }

    pub fn format_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, BuildOp::SetFormat { .. }))
            .count()
    }

    /// Replays the plan against a workbook, in order.
    pub fn apply(&self, workbook: &mut Workbook) {
        for op in &self.ops {
            match op {
                BuildOp::CreateSheet { name } => {
                    workbook.create_sheet(name);
                }
                BuildOp::SetValue {
                    sheet,
                    row,
                    col,
                    value,
                } => {
                    if let Some(target) = workbook.sheet_mut(sheet) {
                        target.set_value(*row, *col, value.clone());
                    }
                }
                BuildOp::SetFormula {
                    sheet,
                    row,
                    col,
                    formula,
                } => {
                    if let Some(target) = workbook.sheet_mut(sheet) {
                        let value = if formula.starts_with('=') {
                            CellValue::Formula(formula.clone())
                        } else {
                            CellValue::String(formula.clone())
                        };
                        target.set_value(*row, *col, value);
                    }
                }
                BuildOp::SetFormat {
                    sheet,
                    row,
                    col,
                    patch,
                } => {
                    if let Some(target) = workbook.sheet_mut(sheet) {
                        target.apply_style(*row, *col, patch);
                    }
                }
            }
        }
    }

    pub fn build(&self) -> Workbook {
        let mut workbook = Workbook::new();
        self.apply(&mut workbook);
        workbook
    }
}

/// Decode-time scalar coercion: integer, then real, then text.
pub fn coerce_field(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    if INTEGER_RE.is_match(field) {
        if let Ok(n) = field.parse::<i64>() {
            return CellValue::Integer(n);
        }
        // Too wide for i64; keep the magnitude as a real.
        if let Ok(n) = field.parse::<f64>() {
            return CellValue::Real(n);
        }
    }
    if REAL_RE.is_match(field) {
        if let Ok(n) = field.parse::<f64>() {
            return CellValue::Real(n);
        }
    }
    CellValue::String(field.to_string())
}

/// `#RRGGBB` to the package's `FFRRGGBB`.
pub fn argb_from_hex(color: &str) -> Option<String> {
    HEX_COLOR_RE
        .captures(color)
        .map(|caps| format!("FF{}", caps[1].to_ascii_uppercase()))
}

fn style_patch(key: &str, rule: &FormatRecord, warnings: &mut Vec<String>) -> StylePatch {
    let color = match (&rule.color, rule.theme) {
        (Some(hex), _) => match argb_from_hex(hex) {
            Some(argb) => Some(FontColor::Rgb(argb)),
            None => {
                record(
                    warnings,
                    MdnError::malformed("FORMAT", format!("{key}: bad color {hex}")),
                );
                None
            }
        },
        (None, Some(theme)) => Some(FontColor::Theme(theme)),
        (None, None) => None,
    };
    StylePatch {
        number_format: rule.number_format.clone(),
        bold: rule.bold,
        italic: rule.italic,
        color,
    }
}

fn resolve_key<'k>(key: &'k str, known: &[&str]) -> Result<(&'k str, &'k str), MdnError> {
    let (sheet, cell) = split_qualified_key(key)
        .ok_or_else(|| MdnError::UnresolvableCellRef(format!("{key}: missing '!'")))?;
    if !known.contains(&sheet) {
        return Err(MdnError::UnresolvableCellRef(format!(
            "{key}: unknown sheet '{sheet}'"
        )));
    }
    Ok((sheet, cell))
}

fn parse_mapping(
    section_name: &str,
    section: &RawSection<'_>,
    warnings: &mut Vec<String>,
) -> Mapping {
    let text = section.payload_text();
    if text.trim().is_empty() {
        return Mapping::new();
    }
    match serde_yaml::from_str::<YamlValue>(&text) {
        Ok(YamlValue::Mapping(map)) => map,
        Ok(YamlValue::Null) => Mapping::new(),
        Ok(_) => {
            record(
                warnings,
                MdnError::malformed(section_name, "expected a mapping"),
            );
            Mapping::new()
        }
        Err(e) => {
            record(warnings, MdnError::malformed(section_name, e));
            Mapping::new()
        }
    }
}

fn record(warnings: &mut Vec<String>, err: MdnError) {
    warn!("{err}");
    warnings.push(err.to_string());
}
