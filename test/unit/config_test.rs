use mdn_converter::common::config::{load_defaults, Loader, MdnConfig};
use mdn_converter::common::errors::MdnError;
use std::fs;
use tempfile::tempdir;

#[test]
fn embedded_defaults_match_default_impls() {
    let config = load_defaults().expect("defaults");
    assert_eq!(config, MdnConfig::default());
    assert_eq!(config.encode.version, "1.0");
    assert!(config.encode.include_context);
    assert_eq!(config.validate.ai_prompt_soft_limit, 500);
    assert_eq!(config.references.column_range_rows, 1000);
}

#[test]
fn user_file_overrides_selected_keys() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("mdn.toml");
    fs::write(
        &path,
        "[validate]\nai_prompt_soft_limit = 42\n\n[encode.context]\npurpose = \"audit\"\n",
    )
    .expect("write config");

    let config = Loader::new().with_file(&path).build().expect("config");
    assert_eq!(config.validate.ai_prompt_soft_limit, 42);
    assert_eq!(config.encode.context.purpose, "audit");
    assert_eq!(config.encode.context.key_metrics.len(), 2);
    assert_eq!(config.references.column_range_rows, 1000);
}

#[test]
fn missing_optional_file_is_ignored() {
    let dir = tempdir().expect("tempdir");
    let config = Loader::new()
        .with_optional_file(dir.path().join("absent.toml"))
        .build()
        .expect("config");
    assert_eq!(config, MdnConfig::default());
}

#[test]
fn missing_required_file_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let err = Loader::new()
        .with_file(dir.path().join("absent.toml"))
        .build()
        .expect_err("required file");
    assert!(matches!(err, MdnError::ConfigError(_)));
}

#[test]
fn overrides_win_over_files() {
    let config = Loader::new()
        .set_override("encode.ai_prompt", "Explain")
        .expect("override prompt")
        .set_override("encode.include_context", false)
        .expect("override context")
        .build()
        .expect("config");
    assert_eq!(config.encode.ai_prompt, "Explain");
    assert!(!config.encode.include_context);
}
