use crate::budget_workbook;
use chrono::{DateTime, TimeZone, Utc};
use mdn_converter::common::config::EncodeConfig;
use mdn_converter::mdn::encoder::{format_timestamp, sheet_to_csv, Encoder};
use mdn_converter::mdn::grammar::CONTEXT_MARKER;
use mdn_converter::sheet::sheet_model::{CellValue, FontColor, Sheet, StylePatch, Workbook};

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .expect("valid time")
}

fn encode(workbook: &Workbook, config: EncodeConfig) -> String {
    Encoder::new(config)
        .encode_at(workbook, "budget.xlsx", fixed_time())
        .expect("encode")
}

#[test]
fn timestamp_is_utc_with_second_precision() {
    assert_eq!(format_timestamp(fixed_time()), "2024-01-02T03:04:05Z");
}

#[test]
fn budget_document_has_sections_in_order() {
    let doc = encode(&budget_workbook(), EncodeConfig::default());

    assert!(doc.starts_with("--- MDN:HEADER YAML\nsource: budget.xlsx\n"));
    assert!(doc.contains("2024-01-02T03:04:05Z"));
    assert!(doc.contains("sheets:\n- Budget\n---\n"));
    assert!(doc.contains(CONTEXT_MARKER));
    assert!(doc.contains("keyMetrics:\n- data_integrity\n- formula_preservation"));
    assert!(doc.contains("--- MDN:SHEET CSV name=Budget\nCategory,100\nRent,=SUM(B1:B1)\n---"));
    assert!(doc.contains("\"Budget!B2\": \"=SUM(B1:B1)\""));
    assert!(doc.contains("\"Budget!A1\": {\n    \"bold\": true\n  }"));
    assert!(doc.ends_with("---\nEND DOCUMENT"));

    let positions: Vec<usize> = [
        "--- MDN:HEADER YAML",
        "--- MDN:SHEET CSV",
        "--- MDN:FORMULAS JSON",
        "--- MDN:FORMAT JSON",
        "END DOCUMENT",
    ]
    .iter()
    .map(|marker| doc.find(marker).expect(marker))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
}

#[test]
fn format_section_is_omitted_when_nothing_is_styled() {
    let mut workbook = Workbook::new();
    workbook.create_sheet("Plain");
    let sheet = workbook.sheet_mut("Plain").expect("sheet");
    sheet.set_value(0, 0, CellValue::Integer(1));

    let doc = encode(&workbook, EncodeConfig::default());
    assert!(doc.contains("--- MDN:FORMULAS JSON\n{}\n---"));
    assert!(!doc.contains("MDN:FORMAT"));
}

#[test]
fn context_and_prompt_follow_config() {
    let config = EncodeConfig {
        include_context: false,
        ai_prompt: "  Summarize the budget.  ".to_string(),
        ..EncodeConfig::default()
    };
    let doc = encode(&budget_workbook(), config);
    assert!(!doc.contains(CONTEXT_MARKER));
    assert!(doc.ends_with("--- MDN:AI_PROMPT\nSummarize the budget.\n---\nEND DOCUMENT"));
}

#[test]
fn sheet_names_with_spaces_are_quoted_in_markers() {
    let mut workbook = Workbook::new();
    workbook.create_sheet("Q3 Data");
    let sheet = workbook.sheet_mut("Q3 Data").expect("sheet");
    sheet.set_value(9, 26, CellValue::Formula("=A1*2".to_string()));

    let doc = encode(&workbook, EncodeConfig::default());
    assert!(doc.contains("--- MDN:SHEET CSV name=\"Q3 Data\"\n"));
    assert!(doc.contains("\"Q3 Data!AA10\": \"=A1*2\""));
}

#[test]
fn csv_quotes_only_when_needed() {
    let mut sheet = Sheet::new("People".to_string());
    sheet.set_value(0, 0, CellValue::String("Smith, J.".to_string()));
    sheet.set_value(0, 1, CellValue::Integer(42));
    sheet.set_value(1, 0, CellValue::String("say \"hi\"".to_string()));
    sheet.set_value(1, 1, CellValue::Real(2.5));
    sheet.set_value(2, 0, CellValue::Real(3.0));

    let csv = sheet_to_csv(&sheet).expect("csv");
    assert_eq!(csv, "\"Smith, J.\",42\n\"say \"\"hi\"\"\",2.5\n3.0,");
}

#[test]
fn rows_that_look_like_structure_are_quoted() {
    let mut sheet = Sheet::new("Tricky".to_string());
    sheet.set_value(0, 0, CellValue::String("---".to_string()));
    sheet.set_value(1, 0, CellValue::String("END DOCUMENT".to_string()));
    sheet.set_value(2, 0, CellValue::String("--- MDN:HEADER YAML".to_string()));

    let csv = sheet_to_csv(&sheet).expect("csv");
    assert_eq!(csv, "\"---\"\n\"END DOCUMENT\"\n\"--- MDN:HEADER YAML\"");
}

#[test]
fn rows_that_would_read_as_blank_are_quoted() {
    let mut sheet = Sheet::new("Gaps".to_string());
    sheet.set_value(0, 0, CellValue::String("  ".to_string()));
    sheet.set_value(1, 0, CellValue::String("x\n---\ny".to_string()));
    sheet.set_value(3, 0, CellValue::String("z".to_string()));

    let csv = sheet_to_csv(&sheet).expect("csv");
    assert_eq!(csv, "\"  \"\n\"x\n---\ny\"\n\"\"\nz");
}

#[test]
fn empty_sheet_renders_empty_block() {
    let sheet = Sheet::new("Empty".to_string());
    assert_eq!(sheet_to_csv(&sheet).expect("csv"), "");
}

#[test]
fn formula_keys_keep_first_seen_order() {
    let mut workbook = Workbook::new();
    workbook.create_sheet("Zeta");
    workbook.create_sheet("Alpha");
    let zeta = workbook.sheet_mut("Zeta").expect("zeta");
    zeta.set_value(0, 1, CellValue::Formula("=2".to_string()));
    zeta.set_value(1, 0, CellValue::Formula("=3".to_string()));
    let alpha = workbook.sheet_mut("Alpha").expect("alpha");
    alpha.set_value(0, 0, CellValue::Formula("=1".to_string()));

    let doc = encode(&workbook, EncodeConfig::default());
    let at = |key: &str| doc.find(key).expect(key);
    assert!(at("\"Zeta!B1\": \"=2\"") < at("\"Zeta!A2\": \"=3\""));
    assert!(at("\"Zeta!A2\": \"=3\"") < at("\"Alpha!A1\": \"=1\""));
}

#[test]
fn format_rules_prune_defaults() {
    let mut workbook = Workbook::new();
    workbook.create_sheet("S");
    let sheet = workbook.sheet_mut("S").expect("sheet");
    for col in 0..5 {
        sheet.set_value(0, col, CellValue::Integer(col as i64));
    }
    let patches = [
        StylePatch {
            number_format: Some("General".to_string()),
            color: Some(FontColor::Theme(1)),
            ..StylePatch::default()
        },
        StylePatch {
            number_format: Some("0.00%".to_string()),
            ..StylePatch::default()
        },
        StylePatch {
            italic: Some(true),
            color: Some(FontColor::Rgb("FF00ff00".to_string())),
            ..StylePatch::default()
        },
        StylePatch {
            color: Some(FontColor::Theme(4)),
            ..StylePatch::default()
        },
        StylePatch {
            bold: Some(false),
            ..StylePatch::default()
        },
    ];
    for (col, patch) in patches.iter().enumerate() {
        sheet.apply_style(0, col, patch);
    }

    let doc = encode(&workbook, EncodeConfig::default());
    assert!(!doc.contains("\"S!A1\""));
    assert!(doc.contains("\"S!B1\": {\n    \"numberFormat\": \"0.00%\"\n  }"));
    assert!(doc.contains("\"S!C1\": {\n    \"italic\": true,\n    \"color\": \"#00FF00\"\n  }"));
    assert!(doc.contains("\"S!D1\": {\n    \"theme\": 4\n  }"));
    assert!(!doc.contains("\"S!E1\""));
}
