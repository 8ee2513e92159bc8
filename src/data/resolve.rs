use serde::{Deserialize, Serialize};

use super::model::Table;

// ---------------------------------------------------------------------------
// Alias lists
// ---------------------------------------------------------------------------

/// Column-name aliases for each role, compared after trimming and
/// lowercasing both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub x: Vec<String>,
    pub y_mean: Vec<String>,
    pub y_std: Vec<String>,
    /// Second-chance rule for y-mean when no alias matches.
    pub y_mean_prefix: Option<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        fn owned(names: &[&str]) -> Vec<String> {
            names.iter().map(|s| s.to_string()).collect()
        }
        Self {
            x: owned(&["n", "size", "tamano", "tamaño", "pos", "position", "indice", "índice"]),
            y_mean: owned(&["t_mean", "tmean", "mean_time", "tiempo_medio", "tiempo_promedio"]),
            y_std: owned(&["t_std", "tstd", "time_stdev", "desviacion", "stdev", "std"]),
            y_mean_prefix: Some("t_".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A column picked for a role: index into the table plus header text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub x: ColumnRef,
    pub y_mean: ColumnRef,
    pub y_std: Option<ColumnRef>,
}

impl ResolvedColumns {
    /// The columns holding time values (y-mean, then y-std if present),
    /// each listed once.
    pub fn time_columns(&self) -> Vec<usize> {
        let mut columns = vec![self.y_mean.index];
        if let Some(std) = self.y_std.as_ref().filter(|c| c.index != self.y_mean.index) {
            columns.push(std.index);
        }
        columns
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Pick the x, y-mean and optional y-std columns.
///
/// Priority, per role:
/// * x      – first column matching `aliases.x`, else column 0
/// * y-mean – first column matching `aliases.y_mean`, else first column
///   starting with `aliases.y_mean_prefix`, else column 1
/// * y-std  – first column other than y-mean matching `aliases.y_std`,
///   else absent
///
/// [`Table`] guarantees two columns, so x and y-mean always resolve.
pub fn resolve_columns(table: &Table, aliases: &ColumnAliases) -> ResolvedColumns {
    let names: Vec<String> = table.columns().iter().map(|c| normalize(c)).collect();

    let find_except = |list: &[String], skip: Option<usize>| -> Option<usize> {
        let list: Vec<String> = list.iter().map(|a| normalize(a)).collect();
        names
            .iter()
            .enumerate()
            .position(|(i, n)| Some(i) != skip && list.contains(n))
    };
    let find = |list: &[String]| find_except(list, None);
    let column = |index: usize| ColumnRef {
        index,
        name: table.columns()[index].trim().to_string(),
    };

    let x = find(&aliases.x).unwrap_or(0);

    let y_mean = find(&aliases.y_mean)
        .or_else(|| {
            let prefix = normalize(aliases.y_mean_prefix.as_deref()?);
            names.iter().position(|n| n.starts_with(&prefix))
        })
        .unwrap_or(1);

    let y_std = find_except(&aliases.y_std, Some(y_mean));

    ResolvedColumns {
        x: column(x),
        y_mean: column(y_mean),
        y_std: y_std.map(column),
    }
}
