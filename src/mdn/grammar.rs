//! Section grammar of an MDN document.
//!
//! A document is a run of sections. Each marked section opens with a
//! `--- MDN:<KIND> ...` line and closes with a line that is exactly `---`;
//! a final `END DOCUMENT` line ends the document. Lines that sit outside a
//! marked section (the context block after the header) form unmarked
//! segments that carry no grammar of their own.
//!
//! Inside a SHEET section a line that continues a quoted CSV field is always
//! payload, even when it reads like a delimiter or marker.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

pub const DELIMITER: &str = "---";
pub const END_MARKER: &str = "END DOCUMENT";
pub const CONTEXT_MARKER: &str = "# optional context section";

static NAME_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)name=").expect("valid name attribute regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKind {
    #[serde(rename = "MDN:HEADER YAML")]
    Header,
    #[serde(rename = "MDN:SHEET CSV")]
    Sheet,
    #[serde(rename = "MDN:FORMULAS JSON")]
    Formulas,
    #[serde(rename = "MDN:FORMAT JSON")]
    Format,
    #[serde(rename = "MDN:AI_PROMPT")]
    AiPrompt,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// One segment of a scanned document, borrowed from the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection<'a> {
    pub kind: SectionKind,
    /// Zero-based line of the marker (first payload line for unmarked segments).
    pub line: usize,
    /// Marker text after the opening `---`, empty for unmarked segments.
    pub marker: &'a str,
    pub payload: Vec<&'a str>,
    /// False when the document ran out before a closing `---`.
    pub terminated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannedDocument<'a> {
    pub sections: Vec<RawSection<'a>>,
    pub has_end_marker: bool,
}

impl SectionKind {
    /// Marked kinds in their required document order.
    pub const ORDERED: [SectionKind; 5] = [
        SectionKind::Header,
        SectionKind::Sheet,
        SectionKind::Formulas,
        SectionKind::Format,
        SectionKind::AiPrompt,
    ];

    pub fn marker(self) -> &'static str {
        match self {
            SectionKind::Header => "MDN:HEADER YAML",
            SectionKind::Sheet => "MDN:SHEET CSV",
            SectionKind::Formulas => "MDN:FORMULAS JSON",
            SectionKind::Format => "MDN:FORMAT JSON",
            SectionKind::AiPrompt => "MDN:AI_PROMPT",
            SectionKind::Unknown => "",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            SectionKind::Header | SectionKind::Sheet | SectionKind::Formulas
        )
    }

    pub fn classify(marker: &str) -> Self {
        Self::ORDERED
            .into_iter()
            .find(|kind| marker.starts_with(kind.marker()))
            .unwrap_or(SectionKind::Unknown)
    }

    /// Opening line for this kind (sheets need [`sheet_marker_line`]).
    pub fn marker_line(self) -> String {
        format!("{DELIMITER} {}", self.marker())
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Unknown => f.write_str("UNKNOWN"),
            kind => f.write_str(kind.marker()),
        }
    }
}

impl<'a> RawSection<'a> {
    fn open(kind: SectionKind, line: usize, marker: &'a str) -> Self {
        Self {
            kind,
            line,
            marker,
            payload: Vec::new(),
            terminated: false,
        }
    }

    pub fn payload_text(&self) -> String {
        self.payload.join("\n")
    }

    pub fn sheet_name(&self) -> Option<String> {
        extract_sheet_name(self.marker)
    }
}

/// Marker text of a section opening line, if `line` is one.
pub fn marker_text(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix(DELIMITER)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let marker = rest.trim();
    (!marker.is_empty()).then_some(marker)
}

/// True for lines the scanner would read as structure rather than payload.
pub fn is_boundary_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed == DELIMITER || trimmed == END_MARKER || marker_text(line).is_some()
}

/// Splits a document into sections without interpreting payloads.
pub fn scan(text: &str) -> ScannedDocument<'_> {
    let mut sections = Vec::new();
    let mut current: Option<RawSection<'_>> = None;
    let mut has_end_marker = false;
    let mut in_quotes = false;

    for (index, line) in text.lines().enumerate() {
        if in_quotes {
            if let Some(section) = current.as_mut() {
                section.payload.push(line);
                in_quotes = quote_state_after(line, true);
                continue;
            }
        }
        let trimmed = line.trim();
        if trimmed == END_MARKER {
            has_end_marker = true;
            break;
        }
        if let Some(marker) = marker_text(line) {
            sections.extend(current.take());
            current = Some(RawSection::open(SectionKind::classify(marker), index, marker));
            continue;
        }
        if trimmed == DELIMITER {
            if let Some(mut section) = current.take() {
                section.terminated = true;
                sections.push(section);
            }
            continue;
        }
        match current.as_mut() {
            Some(section) => {
                section.payload.push(line);
                in_quotes = section.kind == SectionKind::Sheet && quote_state_after(line, false);
            }
            None if !trimmed.is_empty() => {
                let mut section = RawSection::open(SectionKind::Unknown, index, "");
                section.payload.push(line);
                current = Some(section);
            }
            None => {}
        }
    }
    sections.extend(current);

    ScannedDocument {
        sections,
        has_end_marker,
    }
}

/// True when the CSV lines end inside an unterminated quoted field.
pub fn ends_inside_quotes(lines: &[&str]) -> bool {
    lines
        .iter()
        .fold(false, |in_quotes, line| quote_state_after(line, in_quotes))
}

// Follows CSV quoting over one physical line: a quote opens a field only at
// the start of that field, and `""` inside a quoted field is a literal quote.
fn quote_state_after(line: &str, mut in_quotes: bool) -> bool {
    let mut field_start = !in_quotes;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            field_start = false;
        } else if c == '"' && field_start {
            in_quotes = true;
            field_start = false;
        } else {
            field_start = c == ',';
        }
    }
    in_quotes
}

pub fn sheet_marker_line(name: &str) -> String {
    format!(
        "{} name={}",
        SectionKind::Sheet.marker_line(),
        quote_sheet_name(name)
    )
}

// Names with whitespace (or a leading quote) are quoted, doubling inner quotes.
fn quote_sheet_name(name: &str) -> String {
    if name.is_empty() || name.starts_with('"') || name.chars().any(char::is_whitespace) {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

/// Value of the `name=` attribute of a sheet marker.
///
/// Unquoted values run to the next whitespace; quoted values run to the
/// closing quote with `""` standing for a literal quote.
pub fn extract_sheet_name(marker: &str) -> Option<String> {
    let found = NAME_ATTR_RE.find(marker)?;
    let rest = &marker[found.end()..];

    let Some(quoted) = rest.strip_prefix('"') else {
        let name: String = rest.chars().take_while(|c| !c.is_whitespace()).collect();
        return (!name.is_empty()).then_some(name);
    };

    let mut name = String::new();
    let mut chars = quoted.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '"' {
            name.push(c);
            continue;
        }
        if chars.peek() == Some(&'"') {
            chars.next();
            name.push('"');
        } else {
            return (!name.is_empty()).then_some(name);
        }
    }
    None
}
