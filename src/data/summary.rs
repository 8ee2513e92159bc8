use std::cmp::Ordering;

use super::model::{Cell, Table};
use super::resolve::ResolvedColumns;

/// A table after sorting and unit conversion, with statistics of its
/// y-mean column.
#[derive(Debug, Clone)]
pub struct Summary {
    pub table: Table,
    pub columns: ResolvedColumns,
    /// Arithmetic mean of the scaled y-mean column.
    pub mean: Option<f64>,
    /// Sample standard deviation of the same values.
    pub std_dev: Option<f64>,
    /// Numeric cells that went into `mean`.
    pub count: usize,
}

/// One plottable row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub std: Option<f64>,
}

impl Summary {
    /// Numeric `(x, y_mean, y_std?)` points in x order. Rows with a
    /// non-numeric x or y-mean are left out.
    pub fn series(&self) -> Vec<Point> {
        let std_idx = self.columns.y_std.as_ref().map(|c| c.index);
        self.table
            .rows()
            .iter()
            .filter_map(|row| {
                Some(Point {
                    x: row[self.columns.x.index].as_f64()?,
                    y: row[self.columns.y_mean.index].as_f64()?,
                    std: std_idx.and_then(|i| row[i].as_f64()),
                })
            })
            .collect()
    }
}

/// Stable ascending sort on a column's numeric value. Non-numeric cells
/// sort after every number and keep their relative order.
pub fn sort_by_column(table: &mut Table, idx: usize) {
    table.rows_mut().sort_by(|a, b| match (a[idx].as_f64(), b[idx].as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Multiply every numeric cell of the given columns by `scale`.
pub fn scale_columns(table: &mut Table, columns: &[usize], scale: f64) {
    for row in table.rows_mut() {
        for &idx in columns {
            if let Cell::Number(v) = &mut row[idx] {
                *v *= scale;
            }
        }
    }
}

/// Mean and sample standard deviation of the numeric cells in a column.
pub fn column_stats(table: &Table, idx: usize) -> (Option<f64>, Option<f64>, usize) {
    let values: Vec<f64> = table.column(idx).filter_map(Cell::as_f64).collect();
    let n = values.len();
    if n == 0 {
        return (None, None, 0);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let std_dev = (n > 1).then(|| {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    });
    (Some(mean), std_dev, n)
}

/// Sort by x, scale the time columns from nanoseconds by `scale` (once),
/// then compute statistics of the scaled y-mean column.
pub fn convert_and_summarize(mut table: Table, columns: ResolvedColumns, scale: f64) -> Summary {
    sort_by_column(&mut table, columns.x.index);
    scale_columns(&mut table, &columns.time_columns(), scale);
    let (mean, std_dev, count) = column_stats(&table, columns.y_mean.index);
    Summary {
        table,
        columns,
        mean,
        std_dev,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_str;
    use crate::data::resolve::{resolve_columns, ColumnAliases};
    use std::path::Path;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn load(text: &str) -> Table {
        load_str(text, Path::new("t.csv")).unwrap()
    }

    #[test]
    fn scales_and_averages_time_columns() {
        let table = load("n,t_mean,t_std\n200,900,15\n100,500,10\n");
        let cols = resolve_columns(&table, &ColumnAliases::default());
        let summary = convert_and_summarize(table, cols, 1e-3);

        let pts = summary.series();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].x, 100.0);
        assert!(approx(pts[0].y, 0.5));
        assert!(approx(pts[0].std.unwrap(), 0.01));
        assert_eq!(pts[1].x, 200.0);
        assert!(approx(pts[1].y, 0.9));
        assert!(approx(pts[1].std.unwrap(), 0.015));

        assert!(approx(summary.mean.unwrap(), 0.7));
        assert_eq!(summary.count, 2);
        // x is never scaled
        assert_eq!(summary.table.rows()[1][0], Cell::Number(200.0));
    }

    #[test]
    fn overlapping_alias_lists_scale_once() {
        let table = load("n,t_mean\n1,1000\n");
        let aliases = ColumnAliases {
            y_std: vec!["t_mean".into()],
            ..ColumnAliases::default()
        };
        let cols = resolve_columns(&table, &aliases);
        let summary = convert_and_summarize(table, cols, 1e-3);
        assert!(approx(summary.mean.unwrap(), 1.0));
    }

    #[test]
    fn conversion_is_invertible() {
        let mut table = load("n,t_mean\n1,123.456\n2,7890.12\n");
        let original = table.clone();
        scale_columns(&mut table, &[1], 1e-3);
        scale_columns(&mut table, &[1], 1e3);
        for (a, b) in table.column(1).zip(original.column(1)) {
            assert!(approx(a.as_f64().unwrap(), b.as_f64().unwrap()));
        }
    }

    #[test]
    fn sort_is_stable_and_total() {
        let mut table = load("k,v\n3,a\n1,b\nx,d\n2,c\ny,e\n");
        sort_by_column(&mut table, 0);
        let order: Vec<String> = table.column(1).map(|c| c.to_string()).collect();
        assert_eq!(order, ["b", "c", "a", "d", "e"]);
    }

    #[test]
    fn stats_skip_non_numeric_cells() {
        let table = load("n,t_mean\n1,2\n2,\n3,oops\n4,4\n");
        let (mean, std_dev, count) = column_stats(&table, 1);
        assert_eq!(count, 2);
        assert!(approx(mean.unwrap(), 3.0));
        assert!(approx(std_dev.unwrap(), 2f64.sqrt()));
    }

    #[test]
    fn stats_of_empty_column_are_absent() {
        let table = load("n,t_mean\n");
        assert_eq!(column_stats(&table, 1), (None, None, 0));
    }
}
