use crate::common::config::MdnConfig;
use crate::common::errors::MdnError;
use crate::common::fs::FsUtil;
use crate::mdn::validator::{ValidationReport, Validator};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ValidateInput {
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub file: String,
    #[serde(flatten)]
    pub report: ValidationReport,
}

pub fn handle(input: &ValidateInput, config: &MdnConfig) -> Result<ValidateOutput, MdnError> {
    let path = FsUtil::resolve_path(&input.input)?;
    let text = FsUtil::read_text(&path)?;
    let report = Validator::with_config(&config.validate).validate(&text);
    Ok(ValidateOutput {
        file: path.display().to_string(),
        report,
    })
}
