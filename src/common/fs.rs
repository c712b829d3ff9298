use crate::common::errors::MdnError;
use std::path::{Path, PathBuf};

pub struct FsUtil;

impl FsUtil {
    // Normalizes relative paths and enforces the .xlsx extension contract.
    pub fn resolve_xlsx_path(path: &str) -> Result<PathBuf, MdnError> {
        let abs = Self::resolve_path(path)?;
        let ext = abs
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if ext != "xlsx" {
            return Err(MdnError::InvalidPath(format!(
                "expected .xlsx extension: {}",
                abs.display()
            )));
        }
        Ok(abs)
    }

    pub fn resolve_path(path: &str) -> Result<PathBuf, MdnError> {
        if path.trim().is_empty() {
            return Err(MdnError::InvalidPath("path is empty".to_string()));
        }
        let input = Path::new(path);
        if input.is_absolute() {
            Ok(input.to_path_buf())
        } else {
            Ok(std::env::current_dir()?.join(input))
        }
    }

    pub fn require_existing(path: &Path) -> Result<(), MdnError> {
        if !path.exists() {
            return Err(MdnError::FileNotFound(path.display().to_string()));
        }
        Ok(())
    }

    pub fn read_text(path: &Path) -> Result<String, MdnError> {
        Self::require_existing(path)?;
        Ok(std::fs::read_to_string(path)?)
    }

    pub fn write_text(path: &Path, content: &str) -> Result<(), MdnError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// File name component used as the header `source`.
    pub fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    pub fn file_stem(path: &Path) -> String {
        path.file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workbook".to_string())
    }
}
