//! Worksheet parts (`xl/worksheets/sheetN.xml`).

use crate::common::errors::MdnError;
use crate::sheet::cell_ref::{parse_cell_ref, CellRef};
use crate::sheet::sheet_model::{Cell, CellStyle, CellValue, Sheet};
use crate::xlsx::styles_xml::{StyleRegistry, StyleSheet};
use crate::xlsx::xml_util::{XmlUtil, XmlWriter, MAIN_NS, REL_NS};
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Reader;

/// Cell being read; text is accumulated until `</c>`.
#[derive(Debug, Default)]
struct PendingCell {
    row: usize,
    col: usize,
    kind: Option<String>,
    style: usize,
    value: String,
    formula: String,
    inline: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TextTarget {
    None,
    Value,
    Formula,
    Inline,
}

pub struct WorksheetXml;

impl WorksheetXml {
    pub fn parse(
        content: &str,
        name: &str,
        shared_strings: &[String],
        styles: &StyleSheet,
    ) -> Result<Sheet, MdnError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);
        let mut sheet = Sheet::new(name.to_string());

        let mut next_row = 0usize;
        let mut current_row = 0usize;
        let mut next_col = 0usize;
        let mut cell: Option<PendingCell> = None;
        let mut target = TextTarget::None;
        let mut in_inline = false;
        let mut phonetic_depth = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| MdnError::XmlParseError(e.to_string()))?;
            let decoder = reader.decoder();
            match event {
                Event::Start(e) | Event::Empty(e)
                    if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"row") =>
                {
                    current_row = XmlUtil::attr_value(&e, b"r", decoder)?
                        .and_then(|r| r.parse::<usize>().ok())
                        .filter(|r| *r > 0)
                        .map(|r| r - 1)
                        .unwrap_or(next_row);
                    next_row = current_row + 1;
                    next_col = 0;
                }
                Event::Start(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"c") => {
                    cell = Some(Self::open_cell(&e, decoder, current_row, next_col)?);
                }
                Event::Empty(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"c") => {
                    let pending = Self::open_cell(&e, decoder, current_row, next_col)?;
                    next_col = pending.col + 1;
                    Self::store_cell(&mut sheet, pending, shared_strings, styles);
                }
                Event::End(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"c") => {
                    if let Some(pending) = cell.take() {
                        next_col = pending.col + 1;
                        Self::store_cell(&mut sheet, pending, shared_strings, styles);
                    }
                    target = TextTarget::None;
                    in_inline = false;
                }
                Event::Start(e) if cell.is_some() => {
                    let name = e.name();
                    if XmlUtil::is_local_name_bytes(name.as_ref(), b"v") {
                        target = TextTarget::Value;
                    } else if XmlUtil::is_local_name_bytes(name.as_ref(), b"f") {
                        target = TextTarget::Formula;
                    } else if XmlUtil::is_local_name_bytes(name.as_ref(), b"is") {
                        in_inline = true;
                    } else if XmlUtil::is_local_name_bytes(name.as_ref(), b"rPh") {
                        phonetic_depth += 1;
                    } else if in_inline
                        && phonetic_depth == 0
                        && XmlUtil::is_local_name_bytes(name.as_ref(), b"t")
                    {
                        target = TextTarget::Inline;
                    }
                }
                Event::End(e) if cell.is_some() => {
                    let name = e.name();
                    if XmlUtil::is_local_name_bytes(name.as_ref(), b"is") {
                        in_inline = false;
                    } else if XmlUtil::is_local_name_bytes(name.as_ref(), b"rPh") {
                        phonetic_depth = phonetic_depth.saturating_sub(1);
                    } else {
                        target = TextTarget::None;
                    }
                }
                Event::Text(text) if target != TextTarget::None => {
                    let t = text
                        .unescape()
                        .map_err(|x| MdnError::XmlParseError(x.to_string()))?;
                    if let Some(pending) = cell.as_mut() {
                        match target {
                            TextTarget::Value => pending.value.push_str(&t),
                            TextTarget::Formula => pending.formula.push_str(&t),
                            TextTarget::Inline => pending.inline.push_str(&t),
                            TextTarget::None => {}
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(sheet)
    }

    fn open_cell(
        e: &BytesStart<'_>,
        decoder: Decoder,
        current_row: usize,
        next_col: usize,
    ) -> Result<PendingCell, MdnError> {
        let (row, col) = match XmlUtil::attr_value(e, b"r", decoder)? {
            Some(reference) => parse_cell_ref(&reference)?.zero_based(),
            None => (current_row, next_col),
        };
        let style = XmlUtil::attr_value(e, b"s", decoder)?
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        Ok(PendingCell {
            row,
            col,
            kind: XmlUtil::attr_value(e, b"t", decoder)?,
            style,
            ..PendingCell::default()
        })
    }

    fn store_cell(
        sheet: &mut Sheet,
        pending: PendingCell,
        shared_strings: &[String],
        styles: &StyleSheet,
    ) {
        let style = if pending.style == 0 {
            CellStyle::default()
        } else {
            styles.cell_style(pending.style)
        };
        let value = Self::cell_value(&pending, shared_strings);
        if value == CellValue::Empty && style == CellStyle::default() {
            return;
        }
        *sheet.ensure_cell_mut(pending.row, pending.col) = Cell { value, style };
    }

    fn cell_value(pending: &PendingCell, shared_strings: &[String]) -> CellValue {
        // Shared-formula followers carry no text and fall back to the cached value.
        if !pending.formula.is_empty() {
            return CellValue::Formula(format!("={}", pending.formula));
        }
        let raw = pending.value.as_str();
        match pending.kind.as_deref() {
            Some("s") => raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|index| shared_strings.get(index))
                .map(|text| CellValue::String(text.clone()))
                .unwrap_or(CellValue::Empty),
            Some("inlineStr") => CellValue::String(pending.inline.clone()),
            Some("b") => match raw.trim() {
                "1" | "true" => CellValue::String("TRUE".to_string()),
                "0" | "false" => CellValue::String("FALSE".to_string()),
                _ => CellValue::Empty,
            },
            Some("str") | Some("e") => {
                if raw.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::String(raw.to_string())
                }
            }
            _ => Self::numeric_value(raw.trim()),
        }
    }

    fn numeric_value(raw: &str) -> CellValue {
        if raw.is_empty() {
            return CellValue::Empty;
        }
        if !raw.contains(['.', 'e', 'E']) {
            if let Ok(n) = raw.parse::<i64>() {
                return CellValue::Integer(n);
            }
        }
        match raw.parse::<f64>() {
            Ok(n) => CellValue::Real(n),
            Err(_) => CellValue::String(raw.to_string()),
        }
    }

    pub fn render(sheet: &Sheet, registry: &mut StyleRegistry) -> Result<String, MdnError> {
        let mut writer = XmlUtil::writer_with_decl()?;
        let mut root = BytesStart::new("worksheet");
        root.push_attribute(("xmlns", MAIN_NS));
        root.push_attribute(("xmlns:r", REL_NS));
        writer.write_event(Event::Start(root))?;

        let (rows, cols) = sheet.dimensions();
        let extent = if rows == 0 {
            "A1".to_string()
        } else {
            format!("A1:{}", CellRef::from_zero_based(rows - 1, cols - 1)?)
        };
        let mut dimension = BytesStart::new("dimension");
        dimension.push_attribute(("ref", extent.as_str()));
        writer.write_event(Event::Empty(dimension))?;

        writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
        for (row_index, row) in sheet.rows.iter().enumerate() {
            if row.iter().all(Cell::is_blank) {
                continue;
            }
            let row_number = (row_index + 1).to_string();
            let mut row_tag = BytesStart::new("row");
            row_tag.push_attribute(("r", row_number.as_str()));
            writer.write_event(Event::Start(row_tag))?;
            for (col_index, cell) in row.iter().enumerate() {
                if cell.is_blank() {
                    continue;
                }
                let reference = CellRef::from_zero_based(row_index, col_index)?.to_string();
                let style = registry.index_of(&cell.style);
                Self::write_cell(&mut writer, &reference, style, &cell.value)?;
            }
            writer.write_event(Event::End(BytesEnd::new("row")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("sheetData")))?;

        writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
        XmlUtil::finish(writer)
    }

    fn write_cell(
        writer: &mut XmlWriter,
        reference: &str,
        style: u32,
        value: &CellValue,
    ) -> Result<(), MdnError> {
        let style = style.to_string();
        let mut tag = BytesStart::new("c");
        tag.push_attribute(("r", reference));
        if style != "0" {
            tag.push_attribute(("s", style.as_str()));
        }

        match value {
            CellValue::Empty => {
                writer.write_event(Event::Empty(tag))?;
            }
            CellValue::String(text) => {
                tag.push_attribute(("t", "inlineStr"));
                writer.write_event(Event::Start(tag))?;
                writer.write_event(Event::Start(BytesStart::new("is")))?;
                let mut t = BytesStart::new("t");
                t.push_attribute(("xml:space", "preserve"));
                writer.write_event(Event::Start(t))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("t")))?;
                writer.write_event(Event::End(BytesEnd::new("is")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
            CellValue::Formula(formula) => {
                let body = formula.strip_prefix('=').unwrap_or(formula);
                writer.write_event(Event::Start(tag))?;
                writer.write_event(Event::Start(BytesStart::new("f")))?;
                writer.write_event(Event::Text(BytesText::new(body)))?;
                writer.write_event(Event::End(BytesEnd::new("f")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
            CellValue::Integer(_) | CellValue::Real(_) => {
                let number = value.raw_text().unwrap_or_default();
                writer.write_event(Event::Start(tag))?;
                writer.write_event(Event::Start(BytesStart::new("v")))?;
                writer.write_event(Event::Text(BytesText::new(&number)))?;
                writer.write_event(Event::End(BytesEnd::new("v")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
        }
        Ok(())
    }
}
