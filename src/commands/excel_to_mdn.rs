use crate::common::config::MdnConfig;
use crate::common::errors::MdnError;
use crate::common::fs::FsUtil;
use crate::mdn::encoder::Encoder;
use crate::xlsx::xlsx_file::XlsxFile;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ExcelToMdnInput {
    pub input: String,
    /// Without an output path the document is only returned.
    pub output: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExcelToMdnOutput {
    pub source: String,
    pub output: Option<String>,
    pub sheets: Vec<String>,
    #[serde(skip)]
    pub document: String,
}

pub fn handle(input: &ExcelToMdnInput, config: &MdnConfig) -> Result<ExcelToMdnOutput, MdnError> {
    let path = FsUtil::resolve_xlsx_path(&input.input)?;
    FsUtil::require_existing(&path)?;

    let workbook = XlsxFile::read_workbook(&path)?;
    let source = FsUtil::file_name(&path);
    let document = Encoder::new(config.encode.clone()).encode(&workbook, &source)?;

    let output = match &input.output {
        Some(out) => {
            let out_path = FsUtil::resolve_path(out)?;
            FsUtil::write_text(&out_path, &document)?;
            info!(input = %path.display(), output = %out_path.display(), "wrote MDN document");
            Some(out_path.display().to_string())
        }
        None => None,
    };

    Ok(ExcelToMdnOutput {
        source,
        output,
        sheets: workbook.sheet_names(),
        document,
    })
}
