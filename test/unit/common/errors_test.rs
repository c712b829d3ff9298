use mdn_converter::common::errors::MdnError;

#[test]
fn malformed_section_message() {
    let err = MdnError::malformed("HEADER", "section is missing");
    assert_eq!(err.to_string(), "malformed HEADER section: section is missing");
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: MdnError = io.into();
    assert!(matches!(err, MdnError::IoError(ref m) if m == "denied"));
}

#[test]
fn zip_errors_convert() {
    let err: MdnError = zip::result::ZipError::FileNotFound.into();
    assert!(matches!(err, MdnError::ZipError(_)));
}
