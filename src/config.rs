//! Report configuration: which files to expect and how to chart them.
//!
//! The three built-in presets reproduce the heap, string-matching and
//! range-query reports. Any report can also be described in JSON and
//! loaded with [`ReportConfig::from_json_file`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::resolve::ColumnAliases;
use crate::units::TimeUnit;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config '{0}' lists no input files")]
    NoFiles(String),
}

/// How a report turns tables into charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// One line chart per file, plus multi-series comparisons.
    Lines,
    /// One bar per file (its mean), grouped into bar charts.
    Bars,
}

/// An expected input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSpec {
    /// File name relative to the base directory.
    pub name: String,
    pub title: String,
    #[serde(default = "default_x_label")]
    pub x_label: String,
    /// Overrides the y-axis label derived from the file name.
    #[serde(default)]
    pub y_label: Option<String>,
    /// Bar reports: which chart the bar belongs to.
    #[serde(default)]
    pub group: Option<String>,
    /// Bar reports: the bar label, also the colour key.
    #[serde(default)]
    pub series: Option<String>,
}

fn default_x_label() -> String {
    "Size n".to_string()
}

impl FileSpec {
    fn line(name: &str, title: &str) -> Self {
        FileSpec {
            name: name.to_string(),
            title: title.to_string(),
            x_label: default_x_label(),
            y_label: None,
            group: None,
            series: None,
        }
    }

    fn bar(name: &str, series: &str, group: &str) -> Self {
        FileSpec {
            group: Some(group.to_string()),
            series: Some(series.to_string()),
            ..FileSpec::line(name, &format!("{series} – {group}"))
        }
    }

    /// Output name for this file's own chart: `<stem>_<unit>.png`.
    pub fn chart_file_name(&self, unit: TimeUnit) -> String {
        let stem = Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name);
        format!("{stem}_{}.png", unit.suffix())
    }
}

/// A multi-series line chart over every loaded file whose name contains
/// `contains`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSpec {
    pub contains: String,
    pub title: String,
    pub y_label: String,
    pub output_stem: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub name: String,
    pub title: String,
    pub kind: ReportKind,
    #[serde(default)]
    pub unit: TimeUnit,
    pub files: Vec<FileSpec>,
    #[serde(default)]
    pub aliases: ColumnAliases,
    /// Subdirectory (of the base directory) for aggregate charts.
    #[serde(default)]
    pub output_dir: String,
    #[serde(default)]
    pub comparisons: Vec<ComparisonSpec>,
    /// Fixed `#rrggbb` colours keyed by series label.
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub mean_line: bool,
    #[serde(default)]
    pub std_band: bool,
    #[serde(default)]
    pub markers: bool,
}

impl ReportConfig {
    /// Insert and extract-min timings of binary, binomial and Fibonacci heaps.
    pub fn heaps() -> Self {
        let files = [
            ("resultadosInsertBinaryHeap.csv", "Insert — Binary Heap"),
            ("resultadosInsertBinomialHeap.csv", "Insert — Binomial Heap"),
            ("resultadosInsertFibonacciHeap.csv", "Insert — Fibonacci Heap"),
            ("resultadosextractMinBinaryHeap.csv", "extractMin — Binary Heap"),
            ("resultadosextractMinBinomialHeap.csv", "extractMin — Binomial Heap"),
            ("resultadosextractMinFibonacciHeap.csv", "extractMin — Fibonacci Heap"),
        ]
        .into_iter()
        .map(|(name, title)| FileSpec::line(name, title))
        .collect();

        ReportConfig {
            name: "heaps".into(),
            title: "Heap operations".into(),
            kind: ReportKind::Lines,
            unit: TimeUnit::Ns,
            files,
            aliases: ColumnAliases::default(),
            output_dir: String::new(),
            comparisons: Vec::new(),
            colors: BTreeMap::new(),
            mean_line: true,
            std_band: false,
            markers: true,
        }
    }

    /// FM-Index against Rabin-Karp over text and pattern sweeps.
    pub fn string_matching() -> Self {
        let mut files = Vec::new();
        for (prefix, algo) in [("fm", "FM-Index"), ("rk", "Rabin-Karp")] {
            for (sweep, sweep_label) in [("texto", "Text"), ("patron", "Pattern")] {
                for size in ["1GB", "200MB"] {
                    files.push(FileSpec::bar(
                        &format!("{prefix}_{sweep}{size}.csv"),
                        algo,
                        &format!("{sweep_label} {size}"),
                    ));
                }
            }
        }

        let colors = [("FM-Index", "#00a2e8"), ("Rabin-Karp", "#f58231")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        ReportConfig {
            name: "string-matching".into(),
            title: "FM-Index vs Rabin-Karp".into(),
            kind: ReportKind::Bars,
            unit: TimeUnit::Us,
            files,
            aliases: ColumnAliases::default(),
            output_dir: "charts".into(),
            comparisons: Vec::new(),
            colors,
            mean_line: false,
            std_band: false,
            markers: false,
        }
    }

    /// Segment tree against sparse table: construction and query batches.
    pub fn range_queries() -> Self {
        let files = [
            ("construccion_segtree.csv", "Construction: Segment Tree"),
            ("construccion_sparsetable.csv", "Construction: Sparse Table"),
            ("consulta_segtree.csv", "Queries (Q=4096): Segment Tree"),
            ("consulta_sparsetable.csv", "Queries (Q=4096): Sparse Table"),
        ]
        .into_iter()
        .map(|(name, title)| FileSpec::line(name, title))
        .collect();

        ReportConfig {
            name: "range-queries".into(),
            title: "Range-query structures".into(),
            kind: ReportKind::Lines,
            unit: TimeUnit::Us,
            files,
            aliases: ColumnAliases::default(),
            output_dir: String::new(),
            comparisons: vec![
                ComparisonSpec {
                    contains: "construccion".into(),
                    title: "Comparison: construction time".into(),
                    y_label: "Average time".into(),
                    output_stem: "comparison_construction".into(),
                },
                ComparisonSpec {
                    contains: "consulta".into(),
                    title: "Comparison: query time (Q=4096 per n)".into(),
                    y_label: "Total time".into(),
                    output_stem: "comparison_queries".into(),
                },
            ],
            colors: BTreeMap::new(),
            mean_line: false,
            std_band: true,
            markers: false,
        }
    }

    /// All built-in presets, in run order.
    pub fn presets() -> Vec<Self> {
        vec![Self::heaps(), Self::string_matching(), Self::range_queries()]
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ReportConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.files.is_empty() {
            return Err(ConfigError::NoFiles(self.name.clone()));
        }
        Ok(())
    }

    /// Where aggregate charts go.
    pub fn output_path(&self, base_dir: &Path) -> PathBuf {
        if self.output_dir.is_empty() {
            base_dir.to_path_buf()
        } else {
            base_dir.join(&self.output_dir)
        }
    }
}
