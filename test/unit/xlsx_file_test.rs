use crate::budget_workbook;
use mdn_converter::common::errors::MdnError;
use mdn_converter::sheet::sheet_model::{CellValue, FontColor, StylePatch, Workbook};
use mdn_converter::xlsx::package_xml::PackageXml;
use mdn_converter::xlsx::shared_strings::SharedStrings;
use mdn_converter::xlsx::styles_xml::{StyleRegistry, StyleSheet};
use mdn_converter::xlsx::worksheet_xml::WorksheetXml;
use mdn_converter::xlsx::xlsx_file::XlsxFile;
use std::fs;
use tempfile::tempdir;

#[test]
fn write_then_read_preserves_values_and_styles() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("budget.xlsx");
    let mut workbook = budget_workbook();
    let sheet = workbook.sheet_mut("Budget").expect("sheet");
    sheet.set_value(2, 0, CellValue::String("a < b & \"c\"".to_string()));
    sheet.set_value(2, 1, CellValue::Real(2.5));
    sheet.apply_style(
        2,
        1,
        &StylePatch {
            number_format: Some("0.000".to_string()),
            italic: Some(true),
            color: Some(FontColor::Rgb("FF336699".to_string())),
            ..StylePatch::default()
        },
    );
    sheet.apply_style(
        3,
        2,
        &StylePatch {
            number_format: Some("0.00%".to_string()),
            ..StylePatch::default()
        },
    );

    XlsxFile::write_workbook(&path, &workbook).expect("write");
    let read = XlsxFile::read_workbook(&path).expect("read");

    assert_eq!(read.sheet_names(), ["Budget"]);
    let sheet = read.sheet("Budget").expect("sheet");
    let cell = |row, col| sheet.get_cell(row, col).expect("cell");
    assert_eq!(cell(0, 0).value, CellValue::String("Category".to_string()));
    assert!(cell(0, 0).style.font.bold);
    assert_eq!(cell(0, 1).value, CellValue::Integer(100));
    assert_eq!(cell(1, 1).value, CellValue::Formula("=SUM(B1:B1)".to_string()));
    assert_eq!(cell(2, 0).value, CellValue::String("a < b & \"c\"".to_string()));
    assert_eq!(cell(2, 1).value, CellValue::Real(2.5));
    assert_eq!(cell(2, 1).style.number_format.as_deref(), Some("0.000"));
    assert!(cell(2, 1).style.font.italic);
    assert_eq!(
        cell(2, 1).style.font.color,
        Some(FontColor::Rgb("FF336699".to_string()))
    );
    assert_eq!(cell(3, 2).value, CellValue::Empty);
    assert_eq!(cell(3, 2).style.number_format.as_deref(), Some("0.00%"));
}

#[test]
fn workbook_without_sheets_gets_placeholder() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("empty.xlsx");
    XlsxFile::write_workbook(&path, &Workbook::new()).expect("write");
    let read = XlsxFile::read_workbook(&path).expect("read");
    assert_eq!(read.sheet_names(), ["Sheet1"]);
}

#[test]
fn non_zip_input_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("fake.xlsx");
    fs::write(&path, "not a zip").expect("write");
    let err = XlsxFile::read_workbook(&path).expect_err("not a package");
    assert!(matches!(err, MdnError::InvalidXlsxFormat(_)));
}

#[test]
fn workbook_xml_lists_sheets_with_relationships() {
    let xml = PackageXml::render_workbook_xml(&["A & B".to_string(), "Two".to_string()])
        .expect("render");
    assert!(xml.contains("fullCalcOnLoad=\"1\""));
    let entries = PackageXml::parse_workbook_xml(&xml).expect("parse");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "A & B");
    assert_eq!(entries[1].rel_id, "rId2");

    let rels = PackageXml::parse_rels(&PackageXml::workbook_rels_xml(2)).expect("rels");
    assert_eq!(rels.get("rId2").map(String::as_str), Some("xl/worksheets/sheet2.xml"));
    assert_eq!(rels.get("rId3").map(String::as_str), Some("xl/styles.xml"));
}

#[test]
fn shared_strings_join_rich_runs_and_skip_phonetics() {
    let xml = r#"<?xml version="1.0"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
  <si><t>plain</t></si>
  <si><r><rPr><b/></rPr><t>rich </t></r><r><t xml:space="preserve">text</t></r><rPh sb="0" eb="1"><t>ignored</t></rPh></si>
  <si/>
  <si><t>a &amp; b</t></si>
</sst>"#;
    let items = SharedStrings::parse(xml).expect("parse");
    assert_eq!(items, ["plain", "rich text", "", "a & b"]);
}

#[test]
fn worksheet_reads_foreign_cell_types() {
    let styles = StyleSheet::parse(
        r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="170" formatCode="0.0"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><color theme="1"/><name val="Calibri"/></font>
    <font><b/><i val="0"/><color theme="4"/></font>
  </fonts>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0"/></cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0"/>
    <xf numFmtId="170" fontId="1" applyFont="1"/>
    <xf numFmtId="10" fontId="0"/>
  </cellXfs>
</styleSheet>"#,
    )
    .expect("styles");
    let shared = vec!["zero".to_string(), "one".to_string()];
    let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1">
      <c r="A1" t="s"><v>1</v></c>
      <c r="B1" t="b"><v>1</v></c>
      <c r="C1" t="e"><v>#DIV/0!</v></c>
      <c r="D1" s="1"><v>1.5E3</v></c>
    </row>
    <row r="3">
      <c r="A3" t="str"><f>CONCAT("a","b")</f><v>ab</v></c>
      <c r="B3"><f t="shared" si="0"/><v>7</v></c>
      <c r="C3" t="inlineStr"><is><t>inline</t></is></c>
      <c r="D3" s="2"/>
    </row>
  </sheetData>
</worksheet>"#;
    let sheet = WorksheetXml::parse(xml, "Foreign", &shared, &styles).expect("parse");

    let value = |row, col| sheet.get_cell(row, col).expect("cell").value.clone();
    assert_eq!(value(0, 0), CellValue::String("one".to_string()));
    assert_eq!(value(0, 1), CellValue::String("TRUE".to_string()));
    assert_eq!(value(0, 2), CellValue::String("#DIV/0!".to_string()));
    assert_eq!(value(0, 3), CellValue::Real(1500.0));
    assert_eq!(value(2, 0), CellValue::Formula("=CONCAT(\"a\",\"b\")".to_string()));
    assert_eq!(value(2, 1), CellValue::Integer(7));
    assert_eq!(value(2, 2), CellValue::String("inline".to_string()));
    assert!(sheet.rows[1].is_empty());

    let d1 = sheet.get_cell(0, 3).expect("d1");
    assert_eq!(d1.style.number_format.as_deref(), Some("0.0"));
    assert!(d1.style.font.bold);
    assert!(!d1.style.font.italic);
    assert_eq!(d1.style.font.color, Some(FontColor::Theme(4)));
    let d3 = sheet.get_cell(2, 3).expect("d3");
    assert_eq!(d3.style.number_format.as_deref(), Some("0.00%"));
}

#[test]
fn style_registry_dedupes_styles() {
    let mut registry = StyleRegistry::new();
    let workbook = budget_workbook();
    let sheet = workbook.sheet("Budget").expect("sheet");
    let bold = &sheet.get_cell(0, 0).expect("a1").style;
    assert_eq!(registry.index_of(bold), 1);
    assert_eq!(registry.index_of(bold), 1);
    assert_eq!(registry.index_of(&sheet.get_cell(0, 1).expect("b1").style), 0);
    assert_eq!(registry.len(), 2);
    let xml = registry.render().expect("render");
    assert!(xml.contains("<cellXfs count=\"2\">"));
    assert!(xml.contains("<b/>"));
}
