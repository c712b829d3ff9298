//! Workbook to MDN text.

use crate::common::config::EncodeConfig;
use crate::common::errors::MdnError;
use crate::common::json::JsonUtil;
use crate::mdn::document::{qualified_key, ContextRecord, FormatMap, FormulaMap, HeaderRecord};
use crate::mdn::grammar::{self, SectionKind, CONTEXT_MARKER, DELIMITER, END_MARKER};
use crate::sheet::cell_ref::CellRef;
use crate::sheet::sheet_model::{FontColor, Sheet, Workbook};
use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use tracing::debug;

/// Theme index of the default (black) text colour.
const DEFAULT_TEXT_THEME: u32 = 1;
const GENERAL_FORMAT: &str = "General";

#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncodeConfig,
}

impl Encoder {
    pub fn new(config: EncodeConfig) -> Self {
        Self { config }
    }

    /// Encodes with the current UTC time as the `created` stamp.
    pub fn encode(&self, workbook: &Workbook, source: &str) -> Result<String, MdnError> {
        self.encode_at(workbook, source, Utc::now())
    }

    pub fn encode_at(
        &self,
        workbook: &Workbook,
        source: &str,
        created: DateTime<Utc>,
    ) -> Result<String, MdnError> {
        let mut out: Vec<String> = Vec::new();

        let header = HeaderRecord {
            source: source.to_string(),
            version: self.config.version.clone(),
            created: format_timestamp(created),
            sheets: workbook.sheet_names(),
        };
        out.push(SectionKind::Header.marker_line());
        out.push(to_yaml(&header)?);
        out.push(DELIMITER.to_string());
        if self.config.include_context {
            out.push(CONTEXT_MARKER.to_string());
            out.push(to_yaml(&ContextRecord::from(&self.config.context))?);
            out.push(DELIMITER.to_string());
        }

        for sheet in &workbook.sheets {
            out.push(grammar::sheet_marker_line(&sheet.name));
            out.push(sheet_to_csv(sheet)?);
            out.push(DELIMITER.to_string());
        }

        let formulas = collect_formulas(workbook)?;
        debug!(count = formulas.len(), "collected formulas");
        out.push(SectionKind::Formulas.marker_line());
        out.push(JsonUtil::to_pretty(&formulas)?);
        out.push(DELIMITER.to_string());

        let formats = collect_formats(workbook)?;
        debug!(count = formats.len(), "collected format rules");
        if !formats.is_empty() {
            out.push(SectionKind::Format.marker_line());
            out.push(JsonUtil::to_pretty(&formats)?);
            out.push(DELIMITER.to_string());
        }

        let prompt = self.config.ai_prompt.trim();
        if !prompt.is_empty() {
            out.push(SectionKind::AiPrompt.marker_line());
            out.push(prompt.to_string());
            out.push(DELIMITER.to_string());
        }

        out.push(END_MARKER.to_string());
        Ok(out.join("\n"))
    }
}

/// ISO-8601 UTC stamp with second precision.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String, MdnError> {
    let text =
        serde_yaml::to_string(value).map_err(|e| MdnError::InvalidArgument(e.to_string()))?;
    Ok(text.trim_end().to_string())
}

/// Renders the used rectangle of a sheet as CSV rows.
pub fn sheet_to_csv(sheet: &Sheet) -> Result<String, MdnError> {
    let (max_row, max_col) = sheet.dimensions();
    let mut lines = Vec::with_capacity(max_row);
    for row in 0..max_row {
        let fields: Vec<String> = (0..max_col)
            .map(|col| {
                sheet
                    .get_cell(row, col)
                    .and_then(|c| c.value.raw_text())
                    .unwrap_or_default()
            })
            .collect();

        let mut line = csv_record(&fields, QuoteStyle::Necessary)?;
        // Only a record's first physical line starts outside quotes; it must
        // never read back as section structure or as a blank line.
        let first = line.lines().next().unwrap_or_default();
        if first.trim().is_empty() || grammar::is_boundary_line(first) {
            line = csv_record(&fields, QuoteStyle::Always)?;
        }
        lines.push(line);
    }
    let block = lines.join("\n");
    Ok(block.trim_end_matches(['\r', '\n']).to_string())
}

fn csv_record(fields: &[String], style: QuoteStyle) -> Result<String, MdnError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .quote_style(style)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| MdnError::CsvError(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| MdnError::CsvError(e.to_string()))?;
    Ok(text.strip_suffix('\n').unwrap_or(&text).to_string())
}

fn collect_formulas(workbook: &Workbook) -> Result<FormulaMap, MdnError> {
    let mut formulas = FormulaMap::new();
    for sheet in &workbook.sheets {
        let (max_row, max_col) = sheet.dimensions();
        for row in 0..max_row {
            for col in 0..max_col {
                let Some(formula) = sheet
                    .get_cell(row, col)
                    .and_then(|c| c.value.formula_text())
                else {
                    continue;
                };
                let cell = CellRef::from_zero_based(row, col)?;
                formulas.insert(qualified_key(&sheet.name, &cell), formula.to_string());
            }
        }
    }
    Ok(formulas)
}

fn collect_formats(workbook: &Workbook) -> Result<FormatMap, MdnError> {
    let mut formats = FormatMap::new();
    for sheet in &workbook.sheets {
        let (max_row, max_col) = sheet.dimensions();
        for row in 0..max_row {
            for col in 0..max_col {
                let Some(cell) = sheet.get_cell(row, col) else {
                    continue;
                };
                let style = &cell.style;
                let key = qualified_key(&sheet.name, &CellRef::from_zero_based(row, col)?);
                let record = formats.entry(key).or_default();

                if let Some(format) = style
                    .number_format
                    .as_deref()
                    .filter(|f| !f.is_empty() && *f != GENERAL_FORMAT)
                {
                    record.number_format = Some(format.to_string());
                }
                if style.font.bold {
                    record.bold = Some(true);
                }
                if style.font.italic {
                    record.italic = Some(true);
                }
                match &style.font.color {
                    Some(FontColor::Rgb(argb)) => record.color = Some(hex_color(argb)),
                    Some(FontColor::Theme(theme)) if *theme != DEFAULT_TEXT_THEME => {
                        record.theme = Some(*theme);
                    }
                    _ => {}
                }
            }
        }
    }
    formats.retain(|_, record| !record.is_empty());
    Ok(formats)
}

// AARRGGBB (or RRGGBB) to #RRGGBB.
fn hex_color(argb: &str) -> String {
    let rgb = if argb.len() == 8 && argb.is_ascii() {
        &argb[2..]
    } else {
        argb
    };
    format!("#{}", rgb.to_ascii_uppercase())
}
