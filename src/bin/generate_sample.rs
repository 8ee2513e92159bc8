//! Writes synthetic benchmark CSVs for every built-in report, so the
//! charts can be tried without running the real benchmarks.
//!
//! Usage: `generate_sample [DIR]` (default: current directory).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;

/// Seeded noise for timings (splitmix64), so reruns write identical files.
struct Jitter(u64);

impl Jitter {
    /// Multiplier in `[1 - spread, 1 + spread)`.
    fn next(&mut self, spread: f64) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        let unit = ((z ^ (z >> 31)) >> 11) as f64 / (1u64 << 53) as f64;
        1.0 + spread * (2.0 * unit - 1.0)
    }
}

/// Cost model for one benchmark: nanoseconds for input size `n`.
type CostFn = fn(f64) -> f64;

const STATS_HEADER: [&str; 3] = ["n", "t_mean", "t_std"];
const SPANISH_HEADER: [&str; 3] = ["size", "tiempo_promedio", "desviacion"];

struct Sweep {
    file: String,
    delimiter: u8,
    header: [&'static str; 3],
    sizes: Vec<u64>,
    cost: CostFn,
}

impl Sweep {
    fn new(file: &str, delimiter: u8, sizes: &[u64], cost: CostFn) -> Self {
        Sweep {
            file: file.to_string(),
            delimiter,
            header: STATS_HEADER,
            sizes: sizes.to_vec(),
            cost,
        }
    }

    fn with_header(mut self, header: [&'static str; 3]) -> Self {
        self.header = header;
        self
    }
}

fn powers_of_two(from: u32, to: u32) -> Vec<u64> {
    (from..=to).map(|k| 1u64 << k).collect()
}

fn write_sweep(dir: &Path, sweep: &Sweep, rng: &mut Jitter) -> Result<PathBuf> {
    let path = dir.join(&sweep.file);
    let mut writer = WriterBuilder::new()
        .delimiter(sweep.delimiter)
        .from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(sweep.header)?;
    for &n in &sweep.sizes {
        let mean = (sweep.cost)(n as f64) * rng.next(0.08);
        let std = mean * 0.05 * rng.next(0.5);
        writer.write_record([n.to_string(), format!("{mean:.1}"), format!("{std:.1}")])?;
    }
    writer
        .flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = Jitter(42);
    let heap = powers_of_two(10, 20);
    let range = powers_of_two(10, 22);

    // Delimiters and headers vary on purpose: the reader must cope with all of them.
    let mut sweeps = vec![
        Sweep::new("resultadosInsertBinaryHeap.csv", b',', &heap, |n| 12.0 + 1.5 * n.log2()),
        Sweep::new("resultadosInsertBinomialHeap.csv", b';', &heap, |_| 35.0),
        Sweep::new("resultadosInsertFibonacciHeap.csv", b'\t', &heap, |_| 28.0),
        Sweep::new("resultadosextractMinBinaryHeap.csv", b',', &heap, |n| 40.0 * n.log2())
            .with_header(SPANISH_HEADER),
        Sweep::new("resultadosextractMinBinomialHeap.csv", b';', &heap, |n| 65.0 * n.log2())
            .with_header(SPANISH_HEADER),
        Sweep::new("resultadosextractMinFibonacciHeap.csv", b',', &heap, |n| 90.0 * n.log2()),
        Sweep::new("construccion_segtree.csv", b',', &range, |n| 9.0 * n),
        Sweep::new("construccion_sparsetable.csv", b',', &range, |n| 4.0 * n * n.log2()),
        // Query files hold the total for a batch of 4096 queries.
        Sweep::new("consulta_segtree.csv", b';', &range, |n| 4096.0 * 30.0 * n.log2()),
        Sweep::new("consulta_sparsetable.csv", b';', &range, |_| 4096.0 * 20.0),
    ];

    // String matching sweeps pattern length m.
    let patterns = [4, 8, 16, 32, 64, 128];
    for prefix in ["fm", "rk"] {
        for kind in ["texto", "patron"] {
            for size in ["1GB", "200MB"] {
                let cost: CostFn = match (prefix, size) {
                    ("fm", _) => |m: f64| 800.0 * m,
                    (_, "1GB") => |_| 1.2e9,
                    _ => |_| 2.4e8,
                };
                let file = format!("{prefix}_{kind}{size}.csv");
                sweeps.push(Sweep::new(&file, b',', &patterns, cost).with_header(["m", "t_mean", "t_std"]));
            }
        }
    }

    for sweep in &sweeps {
        let path = write_sweep(&dir, sweep, &mut rng)?;
        println!("Wrote {} rows to {}", sweep.sizes.len(), path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_is_seeded_and_bounded() {
        let (mut a, mut b) = (Jitter(42), Jitter(42));
        for _ in 0..1000 {
            let v = a.next(0.08);
            assert_eq!(v, b.next(0.08));
            assert!((0.92..1.08).contains(&v));
        }
        assert_ne!(Jitter(1).next(0.5), Jitter(2).next(0.5));
    }
}
