//! Layered configuration for the mdn toolchain.
//!
//! `defaults/mdn.default.toml` is embedded into the binary; [`Loader`] layers
//! user files and single-key overrides on top before deserializing into
//! [`MdnConfig`]. The `Default` impls mirror the embedded file.

use crate::common::errors::MdnError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/mdn.default.toml");

/// File name picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "mdn.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MdnConfig {
    pub encode: EncodeConfig,
    pub validate: ValidateConfig,
    pub references: ReferenceConfig,
}

/// Knobs consumed by the encoder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EncodeConfig {
    pub version: String,
    pub include_context: bool,
    #[serde(default)]
    pub ai_prompt: String,
    pub context: ContextConfig,
}

/// Content of the informational context block that follows the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    pub purpose: String,
    pub key_metrics: Vec<String>,
    pub business_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidateConfig {
    pub ai_prompt_soft_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReferenceConfig {
    pub column_range_rows: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            include_context: true,
            ai_prompt: String::new(),
            context: ContextConfig::default(),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            purpose: "excel_to_mdn_conversion".to_string(),
            key_metrics: vec![
                "data_integrity".to_string(),
                "formula_preservation".to_string(),
            ],
            business_rules: vec![
                "All formulas must be preserved".to_string(),
                "Data types maintained through formatting".to_string(),
                "Sheet structure preserved".to_string(),
            ],
        }
    }
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            ai_prompt_soft_limit: 500,
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            column_range_rows: 1000,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, MdnError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<MdnConfig, MdnError> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<MdnConfig, MdnError> {
    Loader::new().build()
}
