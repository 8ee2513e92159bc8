//! Data layer: table model, tolerant loading, column resolution and
//! unit conversion.
//!
//! Architecture:
//! ```text
//!  results.csv  (`,` / `;` / tab / whitespace)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  try delimiters → Table (≥ 2 columns)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ resolve   │  aliases + fallbacks → (x, y_mean, y_std?)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ summary   │  sort by x, scale ns → unit, mean / std
//!   └──────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;

pub mod loader;
pub mod model;
pub mod resolve;
pub mod summary;

/// Errors raised while turning a file into a [`model::Table`].
#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No delimiter candidate produced at least two columns.
    #[error("table unparseable: {} (no delimiter yields two or more columns)", path.display())]
    Unparseable { path: PathBuf },

    #[error("{}: row {row} has {found} cells, expected {expected}", path.display())]
    Ragged {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },
}
