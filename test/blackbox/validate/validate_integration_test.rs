use crate::common::{mdn_in, new_path, write_text, VALID_DOC};
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn valid_document_reports_sections_and_sheets() {
    let (dir, mdn) = new_path("sales.mdn");
    write_text(&mdn, VALID_DOC);

    mdn_in(dir.path())
        .arg("validate")
        .arg(&mdn)
        .assert()
        .success()
        .stdout(predicate::str::contains("sales.mdn: valid"))
        .stdout(predicate::str::contains(
            "sections: MDN:HEADER YAML, MDN:SHEET CSV, MDN:FORMULAS JSON, MDN:FORMAT JSON",
        ))
        .stdout(predicate::str::contains("sheets: Sales"));
}

#[test]
fn invalid_document_exits_with_failure() {
    let (dir, mdn) = new_path("broken.mdn");
    let broken = VALID_DOC.replace(
        "\"Sales!D3\": \"=B3+C3\"",
        "\"Sales!D3\": 7",
    );
    write_text(&mdn, &broken);

    mdn_in(dir.path())
        .arg("validate")
        .arg(&mdn)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("broken.mdn: invalid"))
        .stdout(predicate::str::contains(
            "error: formula for Sales!D3 must be a string, found number",
        ));
}

#[test]
fn json_report_uses_camel_case_keys() {
    let (dir, mdn) = new_path("sales.mdn");
    write_text(&mdn, &VALID_DOC.replace("version: \"1.0\"", "version: draft"));

    let output = mdn_in(dir.path())
        .arg("validate")
        .arg(&mdn)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&output).expect("json report");

    assert_eq!(report["isValid"], true);
    assert_eq!(report["sheetNames"][0], "Sales");
    assert_eq!(report["sectionsFound"].as_array().map(Vec::len), Some(4));
    assert!(report["file"].as_str().expect("file").ends_with("sales.mdn"));
    assert_eq!(
        report["warnings"][0],
        "HEADER version 'draft' is not a semantic version (e.g. 1.0.0)"
    );
}

#[test]
fn missing_file_is_an_error() {
    let (dir, mdn) = new_path("absent.mdn");

    mdn_in(dir.path())
        .arg("validate")
        .arg(&mdn)
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}
