use std::fmt;
use std::path::{Path, PathBuf};

use super::TableError;

// ---------------------------------------------------------------------------
// Cell – a single value in a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, guessed from the text the way a dataframe
/// reader would infer a dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Null,
}

impl Cell {
    /// Guess the cell type from raw field text.
    ///
    /// Surrounding whitespace is ignored. Empty → `Null`, anything `f64`
    /// accepts → `Number`, everything else stays `Text`.
    pub fn guess(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Cell::Null;
        }
        match s.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(s.to_string()),
        }
    }

    /// Numeric value, if the cell holds one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Null => write!(f, ""),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded file
// ---------------------------------------------------------------------------

/// Parsed tabular data with named columns and ordered rows.
///
/// Always has at least two columns, and every row has exactly one cell per
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    origin: PathBuf,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, checking the shape invariants.
    pub fn new(
        origin: impl Into<PathBuf>,
        columns: Vec<String>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<Self, TableError> {
        let origin = origin.into();
        if columns.len() < 2 {
            return Err(TableError::Unparseable { path: origin });
        }
        if let Some(row) = rows.iter().position(|r| r.len() != columns.len()) {
            return Err(TableError::Ragged {
                path: origin,
                row,
                expected: columns.len(),
                found: rows[row].len(),
            });
        }
        Ok(Table {
            origin,
            columns,
            rows,
        })
    }

    /// Where the table was loaded from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Column names in file order, as written in the header.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows (excluding the header).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterate over one column's cells.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |r| &r[idx])
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Cell>> {
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_infers_numbers_text_and_null() {
        assert_eq!(Cell::guess(" 42 "), Cell::Number(42.0));
        assert_eq!(Cell::guess("1e3"), Cell::Number(1000.0));
        assert_eq!(Cell::guess("heap"), Cell::Text("heap".into()));
        assert_eq!(Cell::guess("   "), Cell::Null);
    }

    #[test]
    fn new_rejects_single_column() {
        let err = Table::new("one.csv", vec!["n".into()], vec![]).unwrap_err();
        assert!(matches!(err, TableError::Unparseable { .. }));
    }

    #[test]
    fn new_rejects_ragged_rows() {
        let err = Table::new(
            "ragged.csv",
            vec!["n".into(), "t".into()],
            vec![vec![Cell::Number(1.0), Cell::Number(2.0)], vec![Cell::Null]],
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Ragged { row: 1, .. }));
    }
}
