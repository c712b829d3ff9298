use crate::cli::args::{Cli, Command};
use crate::commands::{excel_to_mdn, mdn_to_excel, roundtrip, validate};
use crate::common::config::{Loader, MdnConfig, LOCAL_CONFIG_FILE};
use crate::common::errors::MdnError;
use crate::common::json::JsonUtil;
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub struct Dispatcher;

impl Dispatcher {
    /// Runs one command. `Ok(false)` means it completed but reported failure.
    pub fn run(cli: Cli) -> Result<bool, MdnError> {
        let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
        if let Some(path) = &cli.config {
            loader = loader.with_file(path);
        }
        if let Command::ExcelToMdn {
            ai_prompt,
            no_context,
            ..
        } = &cli.command
        {
            if let Some(prompt) = ai_prompt {
                loader = loader.set_override("encode.ai_prompt", prompt.as_str())?;
            }
            if *no_context {
                loader = loader.set_override("encode.include_context", false)?;
            }
        }
        let config = loader.build()?;
        debug!(?config, "configuration loaded");

        match cli.command {
            Command::ExcelToMdn { input, output, .. } => Self::excel_to_mdn(input, output, &config),
            Command::MdnToExcel {
                input,
                output,
                strict,
            } => Self::mdn_to_excel(input, output, strict, &config),
            Command::Validate { input, json } => Self::validate(input, json, &config),
            Command::Roundtrip { input, output_dir } => {
                Self::roundtrip(input, output_dir, &config)
            }
        }
    }

    fn excel_to_mdn(
        input: String,
        output: Option<String>,
        config: &MdnConfig,
    ) -> Result<bool, MdnError> {
        let result = excel_to_mdn::handle(&excel_to_mdn::ExcelToMdnInput { input, output }, config)?;
        let mut stdout = std::io::stdout().lock();
        match &result.output {
            Some(path) => writeln!(
                stdout,
                "converted {} ({} sheets) -> {path}",
                result.source,
                result.sheets.len()
            )?,
            None => writeln!(stdout, "{}", result.document)?,
        }
        Ok(true)
    }

    fn mdn_to_excel(
        input: String,
        output: String,
        strict: bool,
        config: &MdnConfig,
    ) -> Result<bool, MdnError> {
        let result = mdn_to_excel::handle(
            &mdn_to_excel::MdnToExcelInput {
                input,
                output,
                strict,
            },
            config,
        )?;
        let mut stdout = std::io::stdout().lock();
        writeln!(
            stdout,
            "built {} ({} sheets, {} formulas, {} formats)",
            result.output,
            result.sheets.len(),
            result.formulas,
            result.formats
        )?;
        for warning in &result.warnings {
            writeln!(stdout, "warning: {warning}")?;
        }
        Ok(true)
    }

    fn validate(input: String, json: bool, config: &MdnConfig) -> Result<bool, MdnError> {
        let result = validate::handle(&validate::ValidateInput { input }, config)?;
        let mut stdout = std::io::stdout().lock();
        if json {
            writeln!(stdout, "{}", JsonUtil::to_pretty(&result)?)?;
            return Ok(result.report.is_valid);
        }

        let report = &result.report;
        let status = if report.is_valid { "valid" } else { "invalid" };
        writeln!(stdout, "{}: {status}", Self::display_name(&result.file))?;
        let sections: Vec<String> = report.sections_found.iter().map(|k| k.to_string()).collect();
        writeln!(stdout, "sections: {}", sections.join(", "))?;
        writeln!(stdout, "sheets: {}", report.sheet_names.join(", "))?;
        for error in &report.errors {
            writeln!(stdout, "error: {error}")?;
        }
        for warning in &report.warnings {
            writeln!(stdout, "warning: {warning}")?;
        }
        Ok(report.is_valid)
    }

    fn roundtrip(
        input: String,
        output_dir: Option<String>,
        config: &MdnConfig,
    ) -> Result<bool, MdnError> {
        let result =
            roundtrip::handle(&roundtrip::RoundTripInput { input, output_dir }, config)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "intermediate: {}", result.intermediate)?;
        writeln!(stdout, "rebuilt: {} ({} bytes)", result.rebuilt, result.rebuilt_bytes)?;
        if result.sheets_before != result.sheets_after {
            writeln!(
                stdout,
                "warning: sheets changed from [{}] to [{}]",
                result.sheets_before.join(", "),
                result.sheets_after.join(", ")
            )?;
        }
        for warning in result
            .validation
            .warnings
            .iter()
            .chain(&result.decode_warnings)
        {
            writeln!(stdout, "warning: {warning}")?;
        }
        Ok(true)
    }

    fn display_name(file: &str) -> String {
        Path::new(file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string())
    }
}
