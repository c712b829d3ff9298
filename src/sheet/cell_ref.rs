//! A1-style reference arithmetic.
//!
//! Columns use bijective base-26 letters (`A` = 1, `Z` = 26, `AA` = 27) and
//! rows are one-based, so a [`CellRef`] always names a real cell.

use crate::common::errors::MdnError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Sheet limits of the xlsx format.
pub const MAX_COLUMNS: u32 = 16_384;
pub const MAX_ROWS: u32 = 1_048_576;
/// Largest number of cells a single range expression may expand to.
pub const MAX_RANGE_CELLS: u64 = 262_144;

static CELL_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)([0-9]+)$").expect("valid cell reference regex"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub letters: String,
    pub col: u32,
    pub row: u32,
}

/// Converts column letters to a one-based column index.
pub fn letter_to_index(letters: &str) -> Result<u32, MdnError> {
    if letters.is_empty() {
        return Err(MdnError::InvalidArgument("column letters are empty".to_string()));
    }
    letters.bytes().try_fold(0u32, |acc, b| {
        if !b.is_ascii_uppercase() {
            return Err(MdnError::InvalidArgument(format!(
                "column letters must be A-Z: {letters}"
            )));
        }
        acc.checked_mul(26)
            .and_then(|v| v.checked_add(u32::from(b - b'A') + 1))
            .ok_or_else(|| MdnError::InvalidArgument(format!("column out of range: {letters}")))
    })
}

/// Converts a one-based column index back to letters.
pub fn index_to_letter(index: u32) -> Result<String, MdnError> {
    if index < 1 {
        return Err(MdnError::InvalidArgument(format!(
            "column index must be 1 or greater, got {index}"
        )));
    }
    let mut col = index;
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    Ok(String::from_utf8_lossy(&letters).into_owned())
}

/// Parses `B12` style references into letters plus one-based column and row.
///
/// References past `XFD1048576` are rejected.
pub fn parse_cell_ref(reference: &str) -> Result<CellRef, MdnError> {
    let caps = CELL_REF_RE
        .captures(reference)
        .ok_or_else(|| MdnError::InvalidReference(reference.to_string()))?;
    let letters = caps[1].to_string();
    let col =
        letter_to_index(&letters).map_err(|_| MdnError::InvalidReference(reference.to_string()))?;
    let row: u32 = caps[2]
        .parse()
        .map_err(|_| MdnError::InvalidReference(reference.to_string()))?;
    if row == 0 || row > MAX_ROWS || col > MAX_COLUMNS {
        return Err(MdnError::InvalidReference(reference.to_string()));
    }
    Ok(CellRef { letters, col, row })
}

/// Expands a range expression into individual cells.
///
/// Accepts a comma separated union of single cells (`A1`), rectangles
/// (`A1:B3`) and bare column spans (`A:C`). Cells are emitted column-major:
/// every row of the first column, then the next column. Bare column spans
/// cover rows `1..=column_rows` (capped at the sheet's row limit). The whole
/// expression may cover at most [`MAX_RANGE_CELLS`] cells.
pub fn parse_range_ref(range: &str, column_rows: u32) -> Result<Vec<CellRef>, MdnError> {
    let column_rows = column_rows.clamp(1, MAX_ROWS);
    let mut cells = Vec::new();
    let mut covered = 0u64;
    for part in range.split(',').map(str::trim) {
        if part.is_empty() {
            return Err(MdnError::InvalidReference(range.to_string()));
        }
        let Some((start, end)) = part.split_once(':') else {
            covered += 1;
            if covered > MAX_RANGE_CELLS {
                return Err(too_many_cells(range));
            }
            cells.push(parse_cell_ref(part)?);
            continue;
        };
        let (start, end) = (start.trim(), end.trim());

        let bare_columns = !start.is_empty()
            && !end.is_empty()
            && start.bytes().all(|b| b.is_ascii_uppercase())
            && end.bytes().all(|b| b.is_ascii_uppercase());
        let (first, last) = if bare_columns {
            let start_col =
                letter_to_index(start).map_err(|_| MdnError::InvalidReference(part.to_string()))?;
            let end_col =
                letter_to_index(end).map_err(|_| MdnError::InvalidReference(part.to_string()))?;
            if start_col.max(end_col) > MAX_COLUMNS {
                return Err(MdnError::InvalidReference(part.to_string()));
            }
            ((start_col, 1), (end_col, column_rows))
        } else {
            let a = parse_cell_ref(start)?;
            let b = parse_cell_ref(end)?;
            ((a.col, a.row), (b.col, b.row))
        };

        let (col_lo, col_hi) = (first.0.min(last.0), first.0.max(last.0));
        let (row_lo, row_hi) = (first.1.min(last.1), first.1.max(last.1));
        covered += u64::from(col_hi - col_lo + 1) * u64::from(row_hi - row_lo + 1);
        if covered > MAX_RANGE_CELLS {
            return Err(too_many_cells(range));
        }
        for col in col_lo..=col_hi {
            let letters = index_to_letter(col)?;
            for row in row_lo..=row_hi {
                cells.push(CellRef {
                    letters: letters.clone(),
                    col,
                    row,
                });
            }
        }
    }
    Ok(cells)
}

fn too_many_cells(range: &str) -> MdnError {
    MdnError::InvalidReference(format!("{range}: covers more than {MAX_RANGE_CELLS} cells"))
}

impl CellRef {
    pub fn new(col: u32, row: u32) -> Result<Self, MdnError> {
        if !(1..=MAX_ROWS).contains(&row) {
            return Err(MdnError::InvalidArgument(format!(
                "row index must be within 1..={MAX_ROWS}, got {row}"
            )));
        }
        if col > MAX_COLUMNS {
            return Err(MdnError::InvalidArgument(format!(
                "column index must be within 1..={MAX_COLUMNS}, got {col}"
            )));
        }
        Ok(Self {
            letters: index_to_letter(col)?,
            col,
            row,
        })
    }

    /// Builds a reference from zero-based grid coordinates.
    pub fn from_zero_based(row: usize, col: usize) -> Result<Self, MdnError> {
        let col = u32::try_from(col + 1)
            .map_err(|_| MdnError::InvalidArgument(format!("column {col} out of range")))?;
        let row = u32::try_from(row + 1)
            .map_err(|_| MdnError::InvalidArgument(format!("row {row} out of range")))?;
        Self::new(col, row)
    }

    /// Zero-based `(row, col)` for indexing into the sheet grid.
    pub fn zero_based(&self) -> (usize, usize) {
        ((self.row as usize).saturating_sub(1), (self.col as usize).saturating_sub(1))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letters, self.row)
    }
}
