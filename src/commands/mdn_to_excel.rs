use crate::common::config::MdnConfig;
use crate::common::errors::MdnError;
use crate::common::fs::FsUtil;
use crate::mdn::decoder::Decoder;
use crate::mdn::validator::Validator;
use crate::xlsx::xlsx_file::XlsxFile;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone)]
pub struct MdnToExcelInput {
    pub input: String,
    pub output: String,
    /// Refuse documents the validator rejects.
    pub strict: bool,
}

#[derive(Debug, Serialize)]
pub struct MdnToExcelOutput {
    pub source: String,
    pub output: String,
    pub sheets: Vec<String>,
    pub formulas: usize,
    pub formats: usize,
    pub warnings: Vec<String>,
}

pub fn handle(input: &MdnToExcelInput, config: &MdnConfig) -> Result<MdnToExcelOutput, MdnError> {
    let path = FsUtil::resolve_path(&input.input)?;
    let out_path = FsUtil::resolve_xlsx_path(&input.output)?;
    let text = FsUtil::read_text(&path)?;

    if input.strict {
        let report = Validator::with_config(&config.validate).validate(&text);
        if !report.is_valid {
            return Err(MdnError::InvalidDocument(report.errors.join("; ")));
        }
    }

    let decoded = Decoder::new(&config.references).decode(&text);
    let workbook = decoded.plan.build();
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    XlsxFile::write_workbook(&out_path, &workbook)?;
    info!(
        input = %path.display(),
        output = %out_path.display(),
        warnings = decoded.warnings.len(),
        "wrote workbook"
    );

    Ok(MdnToExcelOutput {
        source: decoded.header.source,
        output: out_path.display().to_string(),
        sheets: workbook.sheet_names(),
        formulas: decoded.plan.formula_count(),
        formats: decoded.plan.format_count(),
        warnings: decoded.warnings,
    })
}
