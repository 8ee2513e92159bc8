use std::path::Path;

use csv::ReaderBuilder;

use super::model::{Cell, Table};
use super::TableError;

// ---------------------------------------------------------------------------
// Delimiter hypotheses
// ---------------------------------------------------------------------------

/// One way of splitting a line into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Byte(u8),
    /// Runs of spaces and tabs separate fields.
    Whitespace,
}

/// Candidates in priority order: comma, semicolon, tab, then whitespace.
pub const DELIMITERS: [Delimiter; 4] = [
    Delimiter::Byte(b','),
    Delimiter::Byte(b';'),
    Delimiter::Byte(b'\t'),
    Delimiter::Whitespace,
];

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delimiter::Byte(b'\t') => write!(f, "tab"),
            Delimiter::Byte(b) => write!(f, "'{}'", *b as char),
            Delimiter::Whitespace => write!(f, "whitespace"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a delimited text file with a header row.
///
/// Tries every entry of [`DELIMITERS`] in order and returns the first parse
/// with at least two columns. A candidate that fails outright (ragged rows,
/// bad quoting) is just a rejected hypothesis.
pub fn load(path: &Path) -> Result<Table, TableError> {
    let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str(&text, path)
}

/// Same as [`load`] for text already in memory. `origin` only labels the
/// table and its errors.
pub fn load_str(text: &str, origin: &Path) -> Result<Table, TableError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for delimiter in DELIMITERS {
        match parse_with(text, delimiter) {
            Some((columns, rows)) if columns.len() >= 2 => {
                log::debug!(
                    "{}: parsed with {delimiter} delimiter ({} columns, {} rows)",
                    origin.display(),
                    columns.len(),
                    rows.len()
                );
                return Table::new(origin, columns, rows);
            }
            Some((columns, _)) => {
                log::debug!(
                    "{}: {delimiter} delimiter gives {} column(s), trying next",
                    origin.display(),
                    columns.len()
                );
            }
            None => {
                log::debug!("{}: {delimiter} delimiter failed, trying next", origin.display());
            }
        }
    }

    Err(TableError::Unparseable {
        path: origin.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

type Parsed = (Vec<String>, Vec<Vec<Cell>>);

fn parse_with(text: &str, delimiter: Delimiter) -> Option<Parsed> {
    match delimiter {
        Delimiter::Byte(b) => parse_csv(text, b),
        Delimiter::Whitespace => parse_whitespace(text),
    }
}

fn parse_csv(text: &str, delimiter: u8) -> Option<Parsed> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .ok()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        rows.push(record.iter().map(Cell::guess).collect());
    }
    Some((columns, rows))
}

fn parse_whitespace(text: &str) -> Option<Parsed> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let columns: Vec<String> = lines.next()?.split_whitespace().map(str::to_string).collect();

    let mut rows = Vec::new();
    for line in lines {
        let row: Vec<Cell> = line.split_whitespace().map(Cell::guess).collect();
        if row.len() != columns.len() {
            return None;
        }
        rows.push(row);
    }
    Some((columns, rows))
}
