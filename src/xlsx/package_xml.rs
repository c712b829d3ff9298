//! Package-level parts: content types, relationships and `xl/workbook.xml`.

use crate::common::errors::MdnError;
use crate::xlsx::xml_util::{XmlUtil, MAIN_NS, REL_NS};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const ROOT_RELS_PART: &str = "_rels/.rels";
pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub const STYLES_PART: &str = "xl/styles.xml";
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

const WORKSHEET_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const STYLES_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// A `<sheet>` entry of the workbook part.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetEntry {
    pub name: String,
    pub rel_id: String,
}

pub struct PackageXml;

impl PackageXml {
    pub fn worksheet_part(index: usize) -> String {
        format!("xl/worksheets/sheet{}.xml", index + 1)
    }

    pub fn content_types_xml(sheet_count: usize) -> String {
        let mut overrides = String::new();
        for index in 0..sheet_count {
            overrides.push_str(&format!(
                r#"<Override PartName="/{}" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                Self::worksheet_part(index)
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>{overrides}</Types>"#
        )
    }

    pub fn root_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    }

    /// Worksheets take `rId1..=rIdN`; styles follow them.
    pub fn workbook_rels_xml(sheet_count: usize) -> String {
        let mut rels = String::new();
        for index in 0..sheet_count {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{WORKSHEET_TYPE}" Target="worksheets/sheet{}.xml"/>"#,
                index + 1,
                index + 1
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}<Relationship Id="rId{}" Type="{STYLES_TYPE}" Target="styles.xml"/></Relationships>"#,
            sheet_count + 1
        )
    }

    pub fn render_workbook_xml(sheet_names: &[String]) -> Result<String, MdnError> {
        let mut writer = XmlUtil::writer_with_decl()?;
        let mut root = BytesStart::new("workbook");
        root.push_attribute(("xmlns", MAIN_NS));
        root.push_attribute(("xmlns:r", REL_NS));
        writer.write_event(Event::Start(root))?;

        writer.write_event(Event::Start(BytesStart::new("sheets")))?;
        for (index, name) in sheet_names.iter().enumerate() {
            let sheet_id = (index + 1).to_string();
            let rel_id = format!("rId{}", index + 1);
            let mut sheet = BytesStart::new("sheet");
            sheet.push_attribute(("name", name.as_str()));
            sheet.push_attribute(("sheetId", sheet_id.as_str()));
            sheet.push_attribute(("r:id", rel_id.as_str()));
            writer.write_event(Event::Empty(sheet))?;
        }
        writer.write_event(Event::End(BytesEnd::new("sheets")))?;

        // Formulas are written without cached values.
        let mut calc = BytesStart::new("calcPr");
        calc.push_attribute(("calcId", "191029"));
        calc.push_attribute(("fullCalcOnLoad", "1"));
        writer.write_event(Event::Empty(calc))?;

        writer.write_event(Event::End(BytesEnd::new("workbook")))?;
        XmlUtil::finish(writer)
    }

    /// Sheet entries in workbook order.
    pub fn parse_workbook_xml(content: &str) -> Result<Vec<SheetEntry>, MdnError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);
        let mut entries = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"sheet") =>
                {
                    let name = XmlUtil::attr_value(&e, b"name", reader.decoder())?;
                    let rel_id = XmlUtil::attr_value(&e, b"id", reader.decoder())?;
                    match (name, rel_id) {
                        (Some(name), Some(rel_id)) => entries.push(SheetEntry { name, rel_id }),
                        _ => {
                            return Err(MdnError::InvalidXlsxFormat(
                                "sheet entry without name or relationship id".to_string(),
                            ))
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(MdnError::XmlParseError(e.to_string())),
            }
        }
        Ok(entries)
    }

    /// Relationship id to package part path.
    pub fn parse_rels(content: &str) -> Result<HashMap<String, String>, MdnError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);
        let mut targets = HashMap::new();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"Relationship") =>
                {
                    let id = XmlUtil::attr_value(&e, b"Id", reader.decoder())?;
                    let target = XmlUtil::attr_value(&e, b"Target", reader.decoder())?;
                    if let (Some(id), Some(target)) = (id, target) {
                        targets.insert(id, Self::resolve_target(&target));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(MdnError::XmlParseError(e.to_string())),
            }
        }
        Ok(targets)
    }

    // Targets are relative to `xl/` unless absolute within the package.
    fn resolve_target(target: &str) -> String {
        match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{target}"),
        }
    }
}
