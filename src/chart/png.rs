use std::path::Path;

use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{BarChart, ChartError, ChartSink, LineChart};

const LINE_SIZE: (u32, u32) = (1280, 800);
const BAR_SIZE: (u32, u32) = (960, 640);
const GRID: RGBColor = RGBColor(230, 230, 230);

// ---------------------------------------------------------------------------
// PNG renderer (plotters bitmap backend)
// ---------------------------------------------------------------------------

/// Writes charts as PNG files, creating parent directories as needed.
#[derive(Debug, Default)]
pub struct PngRenderer;

fn draw_err<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> ChartError + '_ {
    move |e| ChartError::Draw {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn ensure_parent(path: &Path) -> Result<(), ChartError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|source| ChartError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

impl ChartSink for PngRenderer {
    fn line_chart(&mut self, chart: &LineChart, path: &Path) -> Result<(), ChartError> {
        if chart.is_empty() {
            return Err(ChartError::Empty(chart.title.clone()));
        }
        ensure_parent(path)?;

        let root = BitMapBackend::new(path, LINE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err(path))?;

        let (x_range, y_range) = chart.bounds();
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 30))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range.clone(), y_range)
            .map_err(draw_err(path))?;

        ctx.configure_mesh()
            .light_line_style(GRID)
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .draw()
            .map_err(draw_err(path))?;

        for series in &chart.series {
            let color = series.color;
            let xy = || series.points.iter().map(|p| (p.x, p.y));

            if chart.std_band && series.points.iter().any(|p| p.std.is_some()) {
                let upper = series.points.iter().map(|p| (p.x, p.y + p.std.unwrap_or(0.0)));
                let lower = series.points.iter().rev().map(|p| (p.x, p.y - p.std.unwrap_or(0.0)));
                ctx.draw_series(std::iter::once(Polygon::new(
                    upper.chain(lower).collect::<Vec<_>>(),
                    color.mix(0.2).filled(),
                )))
                .map_err(draw_err(path))?
                .label(format!("{} ±1 std dev", series.label))
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.mix(0.2).filled())
                });
            }

            ctx.draw_series(LineSeries::new(xy(), color.stroke_width(2)))
                .map_err(draw_err(path))?
                .label(&series.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

            if chart.markers {
                ctx.draw_series(xy().map(|c| Circle::new(c, 4, color.filled())))
                    .map_err(draw_err(path))?;
            }
        }

        if let Some(mean) = &chart.mean_line {
            let style = BLACK.stroke_width(1);
            ctx.draw_series(DashedLineSeries::new(
                [(x_range.start, mean.value), (x_range.end, mean.value)],
                8,
                6,
                style,
            ))
            .map_err(draw_err(path))?
            .label(&mean.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err(path))?;

        root.present().map_err(draw_err(path))?;
        Ok(())
    }

    fn bar_chart(&mut self, chart: &BarChart, path: &Path) -> Result<(), ChartError> {
        let n = chart.bars.len();
        if n == 0 {
            return Err(ChartError::Empty(chart.title.clone()));
        }
        ensure_parent(path)?;

        let width = BAR_SIZE.0.max(140 * n as u32);
        let root = BitMapBackend::new(path, (width, BAR_SIZE.1)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err(path))?;

        let y_range = chart.value_range();
        let label_offset = (y_range.end - y_range.start) * 0.01;
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d((0..n).into_segmented(), y_range)
            .map_err(draw_err(path))?;

        let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        ctx.configure_mesh()
            .disable_x_mesh()
            .light_line_style(GRID)
            .y_desc(&chart.y_label)
            .x_labels(n)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .draw()
            .map_err(draw_err(path))?;

        ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
            let mut rect = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), bar.value)],
                bar.color.filled(),
            );
            rect.set_margin(0, 0, 12, 12);
            rect
        }))
        .map_err(draw_err(path))?;

        let value_style = TextStyle::from(("sans-serif", 16).into_font())
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
            Text::new(
                format!("{:.1}", bar.value),
                (SegmentValue::CenterOf(i), bar.value + label_offset),
                value_style.clone(),
            )
        }))
        .map_err(draw_err(path))?;

        root.present().map_err(draw_err(path))?;
        Ok(())
    }
}
