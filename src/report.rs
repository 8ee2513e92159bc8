use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::chart::{Bar, BarChart, ChartSink, LineChart, MeanLine, Series};
use crate::color::ColorMap;
use crate::config::{ConfigError, FileSpec, ReportConfig, ReportKind};
use crate::data::loader;
use crate::data::resolve::resolve_columns;
use crate::data::summary::{convert_and_summarize, Summary};
use crate::units::TimeUnit;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// No file yielded data. `failures` counts the files that were present
    /// but could not be parsed or drawn.
    #[error("report '{report}': nothing to plot (no expected file yielded data, {failures} failed)")]
    NothingToPlot { report: String, failures: usize },
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// Loaded and drawn into its own chart.
    Plotted(PathBuf),
    /// Loaded; only feeds aggregate charts.
    Summarized,
    /// Not found on disk.
    Skipped,
    /// Parsed, but the y-mean column holds no numbers.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub name: String,
    pub status: FileStatus,
}

/// One line of the bar-report summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanRow {
    pub series: String,
    pub group: String,
    pub mean: f64,
}

#[derive(Debug, Default)]
pub struct ReportOutcome {
    pub name: String,
    pub files: Vec<FileOutcome>,
    /// Every chart written, in order.
    pub charts: Vec<PathBuf>,
    /// Aggregate charts that could not be written.
    pub chart_errors: Vec<String>,
    pub means: Vec<MeanRow>,
}

impl ReportOutcome {
    pub fn failures(&self) -> usize {
        let files = self
            .files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Failed(_)))
            .count();
        files + self.chart_errors.len()
    }

    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Skipped)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

struct Loaded<'a> {
    spec: &'a FileSpec,
    summary: Summary,
}

/// Run one report against the files in `base_dir`.
///
/// Missing files are skipped with a warning. A file that cannot be parsed
/// or drawn is recorded as failed and the remaining files still run. The
/// report only errors when no file produced any data.
pub fn run_report(
    config: &ReportConfig,
    base_dir: &Path,
    sink: &mut dyn ChartSink,
) -> Result<ReportOutcome, ReportError> {
    config.validate()?;
    log::info!("report '{}' ({}) in {}", config.name, config.unit.suffix(), base_dir.display());

    let colors = ColorMap::new(config.files.iter().map(|f| f.title.as_str()), &config.colors);
    let mut outcome = ReportOutcome {
        name: config.name.clone(),
        ..ReportOutcome::default()
    };
    let mut loaded = Vec::new();

    for spec in &config.files {
        let status = match load_one(config, base_dir, spec) {
            Ok(Some(summary)) => {
                let status = match config.kind {
                    ReportKind::Lines => plot_one(config, base_dir, spec, &summary, &colors, sink),
                    ReportKind::Bars => FileStatus::Summarized,
                };
                if !matches!(status, FileStatus::Failed(_)) {
                    loaded.push(Loaded { spec, summary });
                }
                status
            }
            Ok(None) => FileStatus::Empty,
            Err(status) => status,
        };
        if let FileStatus::Plotted(path) = &status {
            outcome.charts.push(path.clone());
        }
        outcome.files.push(FileOutcome {
            name: spec.name.clone(),
            status,
        });
    }

    if loaded.is_empty() {
        return Err(ReportError::NothingToPlot {
            report: config.name.clone(),
            failures: outcome.failures(),
        });
    }

    match config.kind {
        ReportKind::Lines => plot_comparisons(config, base_dir, &loaded, &colors, sink, &mut outcome),
        ReportKind::Bars => plot_bars(config, base_dir, &loaded, sink, &mut outcome),
    }

    Ok(outcome)
}

fn load_one(
    config: &ReportConfig,
    base_dir: &Path,
    spec: &FileSpec,
) -> Result<Option<Summary>, FileStatus> {
    let path = base_dir.join(&spec.name);
    if !path.exists() {
        log::warn!("missing input {}, skipping", path.display());
        return Err(FileStatus::Skipped);
    }

    let table = loader::load(&path).map_err(|e| {
        log::error!("{e}");
        FileStatus::Failed(e.to_string())
    })?;
    let columns = resolve_columns(&table, &config.aliases);
    log::debug!(
        "{}: x = '{}', y_mean = '{}', y_std = {:?}",
        table.origin().display(),
        columns.x.name,
        columns.y_mean.name,
        columns.y_std.as_ref().map(|c| &c.name)
    );

    let rows = table.len();
    let summary = convert_and_summarize(table, columns, config.unit.scale());
    log::debug!(
        "{}: {rows} rows, mean = {:?}, std dev = {:?} ({})",
        spec.name,
        summary.mean,
        summary.std_dev,
        config.unit.suffix()
    );
    if summary.count == 0 {
        log::warn!("{}: no numeric values in '{}', skipping", spec.name, summary.columns.y_mean.name);
        return Ok(None);
    }
    Ok(Some(summary))
}

/// Default y-axis label, from the operation named in the file.
pub fn y_label_for(file_name: &str, unit: TimeUnit) -> String {
    let name = file_name.to_lowercase();
    if name.contains("insert") {
        format!("Average time per insertion ({unit})")
    } else if name.contains("extractmin") {
        format!("Average time per extract-min ({unit})")
    } else {
        format!("Average time ({unit})")
    }
}

fn plot_one(
    config: &ReportConfig,
    base_dir: &Path,
    spec: &FileSpec,
    summary: &Summary,
    colors: &ColorMap,
    sink: &mut dyn ChartSink,
) -> FileStatus {
    let unit = config.unit;
    let mean_line = match (config.mean_line, summary.mean) {
        (true, Some(value)) => Some(MeanLine {
            value,
            label: format!("Overall mean = {value:.2} {unit}"),
        }),
        _ => None,
    };
    let chart = LineChart {
        title: spec.title.clone(),
        x_label: spec.x_label.clone(),
        y_label: spec
            .y_label
            .clone()
            .unwrap_or_else(|| y_label_for(&spec.name, unit)),
        series: vec![Series {
            label: format!("{} ({unit})", summary.columns.y_mean.name),
            color: colors.color_for(&spec.title),
            points: summary.series(),
        }],
        mean_line,
        std_band: config.std_band,
        markers: config.markers,
    };

    let path = base_dir.join(spec.chart_file_name(unit));
    match sink.line_chart(&chart, &path) {
        Ok(()) => {
            log::info!("saved {}", path.display());
            FileStatus::Plotted(path)
        }
        Err(e) => {
            log::error!("{e}");
            FileStatus::Failed(e.to_string())
        }
    }
}

fn plot_comparisons(
    config: &ReportConfig,
    base_dir: &Path,
    loaded: &[Loaded<'_>],
    colors: &ColorMap,
    sink: &mut dyn ChartSink,
    outcome: &mut ReportOutcome,
) {
    let unit = config.unit;
    for comparison in &config.comparisons {
        let needle = comparison.contains.to_lowercase();
        let mut members: Vec<&Loaded<'_>> = loaded
            .iter()
            .filter(|l| l.spec.name.to_lowercase().contains(&needle))
            .collect();
        if members.is_empty() {
            log::debug!("comparison '{}': no matching files", comparison.title);
            continue;
        }
        members.sort_by(|a, b| a.spec.name.cmp(&b.spec.name));

        let chart = LineChart {
            title: comparison.title.clone(),
            x_label: members[0].spec.x_label.clone(),
            y_label: format!("{} ({unit})", comparison.y_label),
            series: members
                .iter()
                .map(|l| Series {
                    label: l.spec.title.clone(),
                    color: colors.color_for(&l.spec.title),
                    points: l.summary.series(),
                })
                .collect(),
            mean_line: None,
            std_band: false,
            markers: config.markers,
        };

        let path = config
            .output_path(base_dir)
            .join(format!("{}_{}.png", comparison.output_stem, unit.suffix()));
        emit(sink.line_chart(&chart, &path), path, outcome);
    }
}

fn plot_bars(
    config: &ReportConfig,
    base_dir: &Path,
    loaded: &[Loaded<'_>],
    sink: &mut dyn ChartSink,
    outcome: &mut ReportOutcome,
) {
    let unit = config.unit;
    let rows: Vec<MeanRow> = loaded
        .iter()
        .filter_map(|l| {
            Some(MeanRow {
                series: l.spec.series.clone().unwrap_or_else(|| l.spec.title.clone()),
                group: l.spec.group.clone().unwrap_or_else(|| "all".to_string()),
                mean: l.summary.mean?,
            })
        })
        .collect();

    let colors = ColorMap::new(rows.iter().map(|r| r.series.as_str()), &config.colors);
    let bar = |row: &MeanRow, label: String| Bar {
        label,
        value: row.mean,
        color: colors.color_for(&row.series),
    };

    let mut groups: BTreeMap<&str, Vec<&MeanRow>> = BTreeMap::new();
    for row in &rows {
        groups.entry(row.group.as_str()).or_default().push(row);
    }

    let out_dir = config.output_path(base_dir);
    let y_label = format!("Average time ({unit})");

    for (group, members) in &groups {
        let chart = BarChart {
            title: format!("Average time comparison – {group}"),
            y_label: y_label.clone(),
            bars: members.iter().map(|r| bar(*r, r.series.clone())).collect(),
        };
        let path = out_dir.join(format!("bars_{}.png", group.replace(' ', "_")));
        emit(sink.bar_chart(&chart, &path), path, outcome);
    }

    let global = BarChart {
        title: format!("Global comparison – {}", config.title),
        y_label,
        bars: groups
            .values()
            .flatten()
            .map(|r| bar(*r, format!("{} {}", r.series, r.group)))
            .collect(),
    };
    let path = out_dir.join("global_comparison_bars.png");
    emit(sink.bar_chart(&global, &path), path, outcome);

    log::info!("{:<14} {:<16} {:>14}", "series", "group", format!("mean ({unit})"));
    for (group, members) in &groups {
        for row in members {
            log::info!("{:<14} {:<16} {:>14.3}", row.series, group, row.mean);
        }
    }
    outcome.means = groups.into_values().flatten().cloned().collect();
}

fn emit(
    result: Result<(), crate::chart::ChartError>,
    path: PathBuf,
    outcome: &mut ReportOutcome,
) {
    match result {
        Ok(()) => {
            log::info!("saved {}", path.display());
            outcome.charts.push(path);
        }
        Err(e) => {
            log::error!("{e}");
            outcome.chart_errors.push(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartError;
    use crate::config::ComparisonSpec;

    #[derive(Default)]
    struct Recorder {
        lines: Vec<(LineChart, PathBuf)>,
        bars: Vec<(BarChart, PathBuf)>,
    }

    impl ChartSink for Recorder {
        fn line_chart(&mut self, chart: &LineChart, path: &Path) -> Result<(), ChartError> {
            self.lines.push((chart.clone(), path.to_path_buf()));
            Ok(())
        }

        fn bar_chart(&mut self, chart: &BarChart, path: &Path) -> Result<(), ChartError> {
            self.bars.push((chart.clone(), path.to_path_buf()));
            Ok(())
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn write(dir: &Path, name: &str, text: &str) {
        std::fs::write(dir.join(name), text).unwrap();
    }

    fn line_config(files: &[&str]) -> ReportConfig {
        let mut cfg = ReportConfig::heaps();
        cfg.name = "test".into();
        cfg.files = files
            .iter()
            .map(|name| FileSpec {
                name: name.to_string(),
                title: name.to_string(),
                x_label: "n".into(),
                y_label: None,
                group: None,
                series: None,
            })
            .collect();
        cfg
    }

    #[test]
    fn converts_to_microseconds_with_std_band() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "ops.csv", "n,t_mean,t_std\n200,900,15\n100,500,10\n");

        let mut cfg = line_config(&["ops.csv"]);
        cfg.unit = TimeUnit::Us;
        cfg.std_band = true;

        let mut sink = Recorder::default();
        let outcome = run_report(&cfg, dir.path(), &mut sink).unwrap();

        let (chart, path) = &sink.lines[0];
        assert_eq!(path, &dir.path().join("ops_us.png"));
        assert_eq!(outcome.charts, vec![path.clone()]);
        let pts = &chart.series[0].points;
        assert_eq!((pts[0].x, pts[1].x), (100.0, 200.0));
        assert!(approx(pts[0].y, 0.5) && approx(pts[1].y, 0.9));
        assert!(approx(pts[0].std.unwrap(), 0.01) && approx(pts[1].std.unwrap(), 0.015));
        assert!(approx(chart.mean_line.as_ref().unwrap().value, 0.7));
        assert!(chart.std_band);
    }

    #[test]
    fn missing_file_is_skipped_without_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "resultadosInsertBinaryHeap.csv", "size;tiempo_promedio\n1;10\n2;20\n");

        let cfg = line_config(&["resultadosInsertBinaryHeap.csv", "absent.csv"]);
        let mut sink = Recorder::default();
        let outcome = run_report(&cfg, dir.path(), &mut sink).unwrap();

        assert_eq!(outcome.skipped(), 1);
        assert_eq!(outcome.failures(), 0);
        assert_eq!(outcome.files[1].status, FileStatus::Skipped);
        assert_eq!(sink.lines.len(), 1);
        assert_eq!(sink.lines[0].0.y_label, "Average time per insertion (ns)");
    }

    #[test]
    fn unparseable_file_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.csv", "t_mean\n1\n2\n");
        write(dir.path(), "good.csv", "n,t_mean\n1,2\n");

        let cfg = line_config(&["bad.csv", "good.csv"]);
        let mut sink = Recorder::default();
        let outcome = run_report(&cfg, dir.path(), &mut sink).unwrap();

        assert_eq!(outcome.failures(), 1);
        match &outcome.files[0].status {
            FileStatus::Failed(msg) => assert!(msg.contains("unparseable") && msg.contains("bad.csv")),
            other => panic!("unexpected status {other:?}"),
        }
        assert_eq!(sink.lines.len(), 1);
        assert_eq!(sink.lines[0].1, dir.path().join("good_ns.png"));
    }

    #[test]
    fn nothing_to_plot_when_every_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = line_config(&["a.csv", "b.csv"]);
        let err = run_report(&cfg, dir.path(), &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, ReportError::NothingToPlot { failures: 0, .. }));
    }

    #[test]
    fn nothing_to_plot_keeps_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.csv", "t_mean\n1\n2\n");
        let cfg = line_config(&["bad.csv", "absent.csv"]);
        let err = run_report(&cfg, dir.path(), &mut Recorder::default()).unwrap_err();
        match err {
            ReportError::NothingToPlot { report, failures } => {
                assert_eq!(report, "test");
                assert_eq!(failures, 1);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn table_without_numbers_is_empty_not_failed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "words.csv", "n,t_mean\na,b\n");
        write(dir.path(), "good.csv", "n,t_mean\n1,2\n");

        let cfg = line_config(&["words.csv", "good.csv"]);
        let outcome = run_report(&cfg, dir.path(), &mut Recorder::default()).unwrap();
        assert_eq!(outcome.files[0].status, FileStatus::Empty);
        assert_eq!(outcome.failures(), 0);
    }

    #[test]
    fn comparisons_gather_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "construccion_sparsetable.csv", "n,t_mean,t_std\n1,1000,10\n");
        write(dir.path(), "construccion_segtree.csv", "n\tt_mean\tt_std\n1\t2000\t20\n");
        write(dir.path(), "consulta_segtree.csv", "n,t_mean\n1,3000\n");

        let cfg = ReportConfig::range_queries();
        let mut sink = Recorder::default();
        let outcome = run_report(&cfg, dir.path(), &mut sink).unwrap();

        assert_eq!(outcome.skipped(), 1);
        // three individual charts + two comparisons
        assert_eq!(sink.lines.len(), 5);
        let (construction, path) = &sink.lines[3];
        assert_eq!(path, &dir.path().join("comparison_construction_us.png"));
        let labels: Vec<&str> = construction.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Construction: Segment Tree", "Construction: Sparse Table"]);
        assert_eq!(construction.y_label, "Average time (μs)");

        let (queries, path) = &sink.lines[4];
        assert_eq!(path, &dir.path().join("comparison_queries_us.png"));
        assert_eq!(queries.series.len(), 1);
    }

    #[test]
    fn comparison_without_members_is_not_drawn() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.csv", "n,t_mean\n1,2\n");
        let mut cfg = line_config(&["a.csv"]);
        cfg.comparisons = vec![ComparisonSpec {
            contains: "zzz".into(),
            title: "none".into(),
            y_label: "t".into(),
            output_stem: "none".into(),
        }];
        let mut sink = Recorder::default();
        run_report(&cfg, dir.path(), &mut sink).unwrap();
        assert_eq!(sink.lines.len(), 1);
    }

    #[test]
    fn bar_report_groups_means() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "fm_texto1GB.csv", "n,t_mean\n1,1000\n2,3000\n");
        write(dir.path(), "rk_texto1GB.csv", "n;t_mean\n1;4000\n");
        write(dir.path(), "fm_patron200MB.csv", "n,t_mean\n1,500\n");

        let cfg = ReportConfig::string_matching();
        let mut sink = Recorder::default();
        let outcome = run_report(&cfg, dir.path(), &mut sink).unwrap();

        assert_eq!(outcome.skipped(), 5);
        assert!(sink.lines.is_empty());
        // "Pattern 200MB", "Text 1GB", then global
        assert_eq!(sink.bars.len(), 3);

        let charts = dir.path().join("charts");
        assert_eq!(sink.bars[0].1, charts.join("bars_Pattern_200MB.png"));
        let (text, path) = &sink.bars[1];
        assert_eq!(path, &charts.join("bars_Text_1GB.png"));
        assert_eq!(text.bars.len(), 2);
        assert_eq!(text.bars[0].label, "FM-Index");
        assert!(approx(text.bars[0].value, 2.0));
        assert_eq!(text.bars[0].color, plotters::style::RGBColor(0x00, 0xa2, 0xe8));
        assert!(approx(text.bars[1].value, 4.0));

        let (global, path) = &sink.bars[2];
        assert_eq!(path, &charts.join("global_comparison_bars.png"));
        assert_eq!(global.bars.len(), 3);
        assert_eq!(global.bars[0].label, "FM-Index Pattern 200MB");

        assert_eq!(outcome.means.len(), 3);
        assert_eq!(outcome.charts.len(), 3);
    }

    #[test]
    fn y_label_follows_operation() {
        assert_eq!(
            y_label_for("resultadosextractMinBinaryHeap.csv", TimeUnit::Us),
            "Average time per extract-min (μs)"
        );
        assert_eq!(y_label_for("x.csv", TimeUnit::S), "Average time (s)");
    }
}
