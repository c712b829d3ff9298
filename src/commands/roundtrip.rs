use crate::commands::excel_to_mdn::{self, ExcelToMdnInput};
use crate::commands::mdn_to_excel::{self, MdnToExcelInput};
use crate::common::config::MdnConfig;
use crate::common::errors::MdnError;
use crate::common::fs::FsUtil;
use crate::mdn::validator::{ValidationReport, Validator};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct RoundTripInput {
    pub input: String,
    /// Defaults to the input's directory.
    pub output_dir: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoundTripOutput {
    pub intermediate: String,
    pub rebuilt: String,
    pub rebuilt_bytes: u64,
    pub sheets_before: Vec<String>,
    pub sheets_after: Vec<String>,
    pub decode_warnings: Vec<String>,
    pub validation: ValidationReport,
}

/// xlsx -> MDN -> xlsx, validating the intermediate document on the way.
pub fn handle(input: &RoundTripInput, config: &MdnConfig) -> Result<RoundTripOutput, MdnError> {
    let path = FsUtil::resolve_xlsx_path(&input.input)?;
    FsUtil::require_existing(&path)?;
    let dir = match &input.output_dir {
        Some(dir) => FsUtil::resolve_path(dir)?,
        None => path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&dir)?;

    let stem = FsUtil::file_stem(&path);
    let intermediate = dir.join(format!("{stem}_intermediate.mdn"));
    let rebuilt = dir.join(format!("{stem}_roundtrip.xlsx"));

    let encoded = excel_to_mdn::handle(
        &ExcelToMdnInput {
            input: path.display().to_string(),
            output: Some(intermediate.display().to_string()),
        },
        config,
    )?;

    let validation = Validator::with_config(&config.validate).validate(&encoded.document);
    if !validation.is_valid {
        return Err(MdnError::RoundTripFailed(format!(
            "intermediate document is invalid: {}",
            validation.errors.join("; ")
        )));
    }

    let decoded = mdn_to_excel::handle(
        &MdnToExcelInput {
            input: intermediate.display().to_string(),
            output: rebuilt.display().to_string(),
            strict: false,
        },
        config,
    )?;

    let rebuilt_bytes = std::fs::metadata(&rebuilt)?.len();
    if rebuilt_bytes == 0 {
        return Err(MdnError::RoundTripFailed(format!(
            "rebuilt workbook is empty: {}",
            rebuilt.display()
        )));
    }
    info!(
        intermediate = %intermediate.display(),
        rebuilt = %rebuilt.display(),
        bytes = rebuilt_bytes,
        "round trip complete"
    );

    Ok(RoundTripOutput {
        intermediate: intermediate.display().to_string(),
        rebuilt: decoded.output,
        rebuilt_bytes,
        sheets_before: encoded.sheets,
        sheets_after: decoded.sheets,
        decode_warnings: decoded.warnings,
        validation,
    })
}
