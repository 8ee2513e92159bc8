//! Chart layer: plain chart descriptions built by the report pipeline and
//! the sink that turns them into images.
//!
//! Keeping the description separate from drawing lets reports be checked
//! without rasterising anything.

use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use thiserror::Error;

use crate::data::summary::Point;

mod png;

pub use png::PngRenderer;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("cannot create directory {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("drawing {}: {message}", path.display())]
    Draw { path: PathBuf, message: String },
    #[error("chart '{0}' has no data")]
    Empty(String),
}

// ---------------------------------------------------------------------------
// Line charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: RGBColor,
    pub points: Vec<Point>,
}

/// Dashed horizontal reference line.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanLine {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub mean_line: Option<MeanLine>,
    /// Shade ±1 standard deviation around each series.
    pub std_band: bool,
    pub markers: bool,
}

impl LineChart {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// Axis ranges covering every point, band edge and the mean line.
    pub fn bounds(&self) -> (Range<f64>, Range<f64>) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let xs: Vec<f64> = points.clone().map(|p| p.x).collect();

        let mut ys = Vec::new();
        for p in points {
            ys.push(p.y);
            if let (true, Some(std)) = (self.std_band, p.std) {
                ys.push(p.y - std);
                ys.push(p.y + std);
            }
        }
        if let Some(mean) = &self.mean_line {
            ys.push(mean.value);
        }
        (padded_range(&xs, 0.02), padded_range(&ys, 0.05))
    }
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: RGBColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Value axis from zero to just above the tallest bar, leaving room for
    /// the value annotations.
    pub fn value_range(&self) -> Range<f64> {
        let max = self.bars.iter().map(|b| b.value).fold(0.0, f64::max);
        if max > 0.0 {
            0.0..max * 1.15
        } else {
            0.0..1.0
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Destination for finished charts.
pub trait ChartSink {
    fn line_chart(&mut self, chart: &LineChart, path: &Path) -> Result<(), ChartError>;
    fn bar_chart(&mut self, chart: &BarChart, path: &Path) -> Result<(), ChartError>;
}

/// `min..max` widened by `pad` of the span on each side. Degenerate input
/// gets a unit-wide range.
pub fn padded_range(values: &[f64], pad: f64) -> Range<f64> {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span <= f64::EPSILON * max.abs().max(1.0) {
        return (min - 0.5)..(max + 0.5);
    }
    (min - span * pad)..(max + span * pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64, std: Option<f64>) -> Point {
        Point { x, y, std }
    }

    #[test]
    fn padded_range_widens_span() {
        let r = padded_range(&[0.0, 10.0], 0.1);
        assert_eq!(r, -1.0..11.0);
    }

    #[test]
    fn padded_range_handles_degenerate_input() {
        assert_eq!(padded_range(&[], 0.1), 0.0..1.0);
        assert_eq!(padded_range(&[3.0, 3.0], 0.1), 2.5..3.5);
        assert_eq!(padded_range(&[f64::NAN], 0.1), 0.0..1.0);
    }

    #[test]
    fn bounds_cover_band_and_mean() {
        let chart = LineChart {
            title: "t".into(),
            x_label: "n".into(),
            y_label: "y".into(),
            series: vec![Series {
                label: "s".into(),
                color: RGBColor(0, 0, 0),
                points: vec![pt(1.0, 10.0, Some(5.0)), pt(2.0, 20.0, Some(5.0))],
            }],
            mean_line: Some(MeanLine {
                value: 40.0,
                label: "mean".into(),
            }),
            std_band: true,
            markers: false,
        };
        let (x, y) = chart.bounds();
        assert!(x.start < 1.0 && x.end > 2.0);
        assert!(y.start < 5.0 && y.end > 40.0);
        assert!(!chart.is_empty());
    }

    #[test]
    fn bar_range_starts_at_zero() {
        let chart = BarChart {
            title: "t".into(),
            y_label: "y".into(),
            bars: vec![Bar {
                label: "a".into(),
                value: 10.0,
                color: RGBColor(0, 0, 0),
            }],
        };
        let r = chart.value_range();
        assert_eq!(r.start, 0.0);
        assert!(r.end > 10.0);
    }
}
