#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Real(f64),
    /// Formula text including the leading `=`.
    Formula(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontColor {
    /// `AARRGGBB` hex, as stored in the package.
    Rgb(String),
    Theme(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub color: Option<FontColor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CellStyle {
    /// `None` stands for the General format.
    pub number_format: Option<String>,
    pub font: FontStyle,
}

/// Partial style update; unset fields leave the cell untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub number_format: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<FontColor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl CellValue {
    /// Raw cell content as text: formulas keep their `=`, empty is `None`.
    pub fn raw_text(&self) -> Option<String> {
        match self {
            CellValue::String(v) | CellValue::Formula(v) => Some(v.clone()),
            CellValue::Integer(v) => Some(v.to_string()),
            CellValue::Real(v) => Some(Self::real_text(*v)),
            CellValue::Empty => None,
        }
    }

    /// Formula text when the raw content is a string starting with `=`.
    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellValue::String(v) | CellValue::Formula(v) if v.starts_with('=') => Some(v),
            _ => None,
        }
    }

    // Shortest round-trip decimal, always with a fractional part so reals stay reals.
    fn real_text(v: f64) -> String {
        let text = v.to_string();
        if v.is_finite() && !text.contains('.') {
            format!("{text}.0")
        } else {
            text
        }
    }
}

impl Cell {
    pub fn empty() -> Self {
        Self {
            value: CellValue::Empty,
            style: CellStyle::default(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value == CellValue::Empty && self.style == CellStyle::default()
    }
}

impl CellStyle {
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(format) = &patch.number_format {
            self.number_format = Some(format.clone());
        }
        if let Some(bold) = patch.bold {
            self.font.bold = bold;
        }
        if let Some(italic) = patch.italic {
            self.font.italic = italic;
        }
        if let Some(color) = &patch.color {
            self.font.color = Some(color.clone());
        }
    }
}

impl Sheet {
    pub fn new(name: String) -> Self {
        Self {
            name,
            rows: Vec::new(),
        }
    }

    pub fn ensure_cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        // Only the touched row grows; dimensions() reports the bounding box.
        while self.rows.len() <= row {
            self.rows.push(Vec::new());
        }
        let row_cells = &mut self.rows[row];
        while row_cells.len() <= col {
            row_cells.push(Cell::empty());
        }
        &mut row_cells[col]
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn max_cols(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// `(max_row, max_col)` of the used rectangle, both counts.
    pub fn dimensions(&self) -> (usize, usize) {
        let cols = self.max_cols();
        if cols == 0 {
            return (0, 0);
        }
        (self.rows.len(), cols)
    }

    pub fn set_value(&mut self, row: usize, col: usize, value: CellValue) {
        self.ensure_cell_mut(row, col).value = value;
    }

    pub fn apply_style(&mut self, row: usize, col: usize, patch: &StylePatch) {
        self.ensure_cell_mut(row, col).style.apply(patch);
    }
}

impl Workbook {
    pub fn new() -> Self {
        Self { sheets: Vec::new() }
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet_index_by_name(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name == name)
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Appends a sheet; an existing sheet with the same name is reused.
    pub fn create_sheet(&mut self, name: &str) -> usize {
        if let Some(index) = self.sheet_index_by_name(name) {
            return index;
        }
        self.sheets.push(Sheet::new(name.to_string()));
        self.sheets.len() - 1
    }
}
