/// A single typed cell read from the source table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Canonical string form used when a cell is spliced into rendered text.
    pub fn to_canonical_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(number) => format_number(*number),
            CellValue::Bool(flag) => flag.to_string(),
        }
    }
}

// Whole numbers print without a trailing ".0" so ticket 4521 reads "4521".
fn format_number(number: f64) -> String {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{number}")
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Cells past the end of a short row read as empty.
    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }
}

/// Positions of the fields the outline needs within each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub ticket_id: usize,
    pub ticket_summary: usize,
    pub organization_name: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            ticket_id: 0,
            ticket_summary: 6,
            organization_name: 10,
        }
    }
}

impl ColumnLayout {
    pub fn ticket_id(&self, row: &Row) -> String {
        row.cell(self.ticket_id).to_canonical_string()
    }

    pub fn ticket_summary(&self, row: &Row) -> String {
        row.cell(self.ticket_summary).to_canonical_string()
    }

    pub fn organization_name(&self, row: &Row) -> String {
        row.cell(self.organization_name).to_canonical_string()
    }
}
