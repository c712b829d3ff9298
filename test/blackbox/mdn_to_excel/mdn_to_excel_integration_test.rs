use crate::common::{mdn_in, new_path, write_text, VALID_DOC};
use mdn_converter::sheet::sheet_model::{CellValue, FontColor};
use mdn_converter::xlsx::xlsx_file::XlsxFile;
use predicates::prelude::*;

#[test]
fn builds_workbook_with_formulas_and_formats() {
    let (dir, mdn) = new_path("sales.mdn");
    write_text(&mdn, VALID_DOC);
    let out = dir.path().join("built/sales.xlsx");

    mdn_in(dir.path())
        .arg("mdn2excel")
        .arg(&mdn)
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 sheets, 2 formulas, 5 formats)"));

    let workbook = XlsxFile::read_workbook(&out).expect("read built");
    assert_eq!(workbook.sheet_names(), ["Sales"]);
    let sheet = workbook.sheet("Sales").expect("sheet");
    let cell = |row, col| sheet.get_cell(row, col).expect("cell");

    assert_eq!(cell(0, 0).value, CellValue::String("Region".to_string()));
    assert!(cell(0, 3).style.font.bold);
    assert_eq!(cell(1, 1).value, CellValue::Integer(10));
    assert_eq!(cell(2, 1).value, CellValue::Real(1.5));
    assert_eq!(cell(2, 1).style.number_format.as_deref(), Some("0.00"));
    assert_eq!(
        cell(2, 1).style.font.color,
        Some(FontColor::Rgb("FF336699".to_string()))
    );
    assert_eq!(cell(1, 3).value, CellValue::Formula("=B2+C2".to_string()));
}

#[test]
fn lenient_mode_builds_documents_with_problems() {
    let (dir, mdn) = new_path("loose.mdn");
    write_text(&mdn, &VALID_DOC.replace("\nEND DOCUMENT", ""));
    let out = dir.path().join("loose.xlsx");

    mdn_in(dir.path())
        .arg("mdn2excel")
        .arg(&mdn)
        .arg(&out)
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn strict_mode_refuses_invalid_documents() {
    let (dir, mdn) = new_path("loose.mdn");
    write_text(&mdn, &VALID_DOC.replace("\nEND DOCUMENT", ""));
    let out = dir.path().join("loose.xlsx");

    mdn_in(dir.path())
        .arg("mdn2excel")
        .arg(&mdn)
        .arg(&out)
        .arg("--strict")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "invalid MDN document: missing 'END DOCUMENT' marker",
        ));
    assert!(!out.exists());
}

#[test]
fn output_must_be_xlsx() {
    let (dir, mdn) = new_path("sales.mdn");
    write_text(&mdn, VALID_DOC);

    mdn_in(dir.path())
        .arg("mdn2excel")
        .arg(&mdn)
        .arg(dir.path().join("sales.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected .xlsx extension"));
}
