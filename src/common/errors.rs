use thiserror::Error;

#[derive(Debug, Error)]
pub enum MdnError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid cell reference: {0}")]
    InvalidReference(String),
    #[error("malformed {section} section: {reason}")]
    MalformedSection { section: String, reason: String },
    #[error("unresolvable cell reference: {0}")]
    UnresolvableCellRef(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("invalid xlsx format: {0}")]
    InvalidXlsxFormat(String),
    #[error("xml parse error: {0}")]
    XmlParseError(String),
    #[error("zip error: {0}")]
    ZipError(String),
    #[error("csv error: {0}")]
    CsvError(String),
    #[error("io error: {0}")]
    IoError(String),
    #[error("config error: {0}")]
    ConfigError(String),
    #[error("invalid MDN document: {0}")]
    InvalidDocument(String),
    #[error("round trip failed: {0}")]
    RoundTripFailed(String),
}

impl MdnError {
    pub fn malformed(section: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedSection {
            section: section.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for MdnError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value.to_string())
    }
}

impl From<zip::result::ZipError> for MdnError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::ZipError(value.to_string())
    }
}

impl From<quick_xml::Error> for MdnError {
    fn from(value: quick_xml::Error) -> Self {
        Self::XmlParseError(value.to_string())
    }
}

impl From<csv::Error> for MdnError {
    fn from(value: csv::Error) -> Self {
        Self::CsvError(value.to_string())
    }
}

impl From<config::ConfigError> for MdnError {
    fn from(value: config::ConfigError) -> Self {
        Self::ConfigError(value.to_string())
    }
}
