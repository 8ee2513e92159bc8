use std::fmt;

use serde::{Deserialize, Serialize};

/// Display unit for time values. Benchmark files store nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Ns,
    Us,
    Ms,
    S,
}

impl TimeUnit {
    /// Factor converting nanoseconds into this unit.
    pub fn scale(self) -> f64 {
        match self {
            TimeUnit::Ns => 1.0,
            TimeUnit::Us => 1e-3,
            TimeUnit::Ms => 1e-6,
            TimeUnit::S => 1e-9,
        }
    }

    /// ASCII suffix used in file names.
    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        }
    }

    /// Label for chart axes and legends.
    pub fn symbol(self) -> &'static str {
        match self {
            TimeUnit::Us => "μs",
            other => other.suffix(),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
