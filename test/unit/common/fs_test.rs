use mdn_converter::common::errors::MdnError;
use mdn_converter::common::fs::FsUtil;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn resolve_xlsx_path_requires_xlsx_extension() {
    let err = FsUtil::resolve_xlsx_path("demo.ods").expect_err("should fail");
    assert!(matches!(err, MdnError::InvalidPath(_)));
}

#[test]
fn resolve_xlsx_path_accepts_any_case() {
    let path = FsUtil::resolve_xlsx_path("Demo.XLSX").expect("should work");
    assert!(path.is_absolute());
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("Demo.XLSX"));
}

#[test]
fn resolve_path_rejects_empty_path() {
    let err = FsUtil::resolve_path("   ").expect_err("should fail");
    assert!(matches!(err, MdnError::InvalidPath(_)));
}

#[test]
fn read_text_reports_missing_files() {
    let dir = tempdir().expect("tempdir");
    let err = FsUtil::read_text(&dir.path().join("absent.mdn")).expect_err("missing");
    assert!(matches!(err, MdnError::FileNotFound(_)));
}

#[test]
fn write_text_creates_parent_directories() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested/out/doc.mdn");
    FsUtil::write_text(&path, "END DOCUMENT").expect("write");
    assert_eq!(FsUtil::read_text(&path).expect("read"), "END DOCUMENT");
}

#[test]
fn name_helpers() {
    let path = Path::new("/tmp/reports/q3.budget.xlsx");
    assert_eq!(FsUtil::file_name(path), "q3.budget.xlsx");
    assert_eq!(FsUtil::file_stem(path), "q3.budget");
}
