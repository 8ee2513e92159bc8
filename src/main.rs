mod chart;
mod color;
mod config;
mod data;
mod report;
mod units;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use chart::{ChartSink, PngRenderer};
use config::ReportConfig;
use report::{run_report, ReportError};
use units::TimeUnit;

/// Render benchmark CSV results as PNG charts.
#[derive(Debug, Parser)]
#[command(name = "bench-plot", version, about)]
struct Cli {
    /// Which built-in report to run.
    #[arg(value_enum, default_value_t = Report::All)]
    report: Report,

    /// Directory holding the CSV files; charts are written here too.
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Display unit for times (input is nanoseconds).
    #[arg(short, long, value_enum)]
    unit: Option<TimeUnit>,

    /// JSON report description, used instead of the built-in reports.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    All,
    Heaps,
    StringMatching,
    RangeQueries,
}

impl Report {
    fn configs(self) -> Vec<ReportConfig> {
        match self {
            Report::All => ReportConfig::presets(),
            Report::Heaps => vec![ReportConfig::heaps()],
            Report::StringMatching => vec![ReportConfig::string_matching()],
            Report::RangeQueries => vec![ReportConfig::range_queries()],
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut configs = match &cli.config {
        Some(path) => vec![ReportConfig::from_json_file(path)
            .with_context(|| format!("loading report config {}", path.display()))?],
        None => cli.report.configs(),
    };
    if let Some(unit) = cli.unit {
        for config in &mut configs {
            config.unit = unit;
        }
    }

    let totals = run_reports(&configs, &cli.dir, &mut PngRenderer)?;
    totals.check(&cli.dir)
}

/// Charts written and failures seen across every report of a run.
#[derive(Debug, Default, PartialEq, Eq)]
struct RunTotals {
    charts: usize,
    failures: usize,
}

impl RunTotals {
    /// Exit status: any failure is an error, as is a run with no charts.
    fn check(&self, dir: &Path) -> Result<()> {
        if self.failures > 0 {
            bail!("{} file(s) or chart(s) failed", self.failures);
        }
        if self.charts == 0 {
            bail!("nothing to plot in {}", dir.display());
        }
        Ok(())
    }
}

/// Run every report in turn.
///
/// Only a single requested report is fatal when empty; with several, a
/// directory usually holds results for just one of them. Failures of an
/// empty report still count.
fn run_reports(configs: &[ReportConfig], dir: &Path, sink: &mut dyn ChartSink) -> Result<RunTotals> {
    let single = configs.len() == 1;
    let mut totals = RunTotals::default();

    for config in configs {
        match run_report(config, dir, sink) {
            Ok(outcome) => {
                log::info!(
                    "report '{}': {} chart(s), {} skipped, {} failed",
                    outcome.name,
                    outcome.charts.len(),
                    outcome.skipped(),
                    outcome.failures()
                );
                totals.failures += outcome.failures();
                totals.charts += outcome.charts.len();
            }
            Err(e @ ReportError::NothingToPlot { failures, .. }) if !single => {
                log::warn!("{e}");
                totals.failures += failures;
            }
            Err(e) => return Err(e).with_context(|| format!("running report '{}'", config.name)),
        }
    }
    Ok(totals)
}
