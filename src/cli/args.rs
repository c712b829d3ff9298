use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mdn",
    version,
    about = "Convert spreadsheets to and from MDN text documents."
)]
pub struct Cli {
    /// Configuration file layered over the defaults and ./mdn.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encode an .xlsx workbook as an MDN document.
    #[command(name = "excel2mdn")]
    ExcelToMdn {
        input: String,
        /// Output file; the document is printed to stdout when omitted.
        output: Option<String>,
        /// Append an AI_PROMPT section with this text.
        #[arg(long, value_name = "TEXT")]
        ai_prompt: Option<String>,
        /// Leave out the informational context block.
        #[arg(long)]
        no_context: bool,
    },

    /// Build an .xlsx workbook from an MDN document.
    #[command(name = "mdn2excel")]
    MdnToExcel {
        input: String,
        output: String,
        /// Validate first and refuse invalid documents.
        #[arg(long)]
        strict: bool,
    },

    /// Check an MDN document's structure.
    Validate {
        input: String,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Convert xlsx -> MDN -> xlsx and check the intermediate document.
    Roundtrip {
        input: String,
        #[arg(long, value_name = "DIR")]
        output_dir: Option<String>,
    },
}
