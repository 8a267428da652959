//! Timing the driver against `BalancedTree` and the standard `BTreeSet`.

use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use balanced_tree::BalancedTree;
use eyre::{bail, Result};
use range_query::{driver, Container, DriverError};
use serde_derive::Serialize;

#[derive(Serialize, Debug)]
pub struct Report {
    pub input: String,
    pub iterations: u32,
    pub results: Vec<Measurement>,
}

#[derive(Serialize, Debug)]
pub struct Measurement {
    pub container: &'static str,
    pub values: usize,
    pub queries: usize,
    pub total_ms: f64,
    pub mean_ms: f64,
    pub min_ms: f64,
    #[serde(skip)]
    output: Vec<u8>,
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Runs the whole command stream `iterations` times against a fresh `C`.
pub fn measure<C: Container<i64>>(
    container: &'static str,
    input: &str,
    iterations: u32,
) -> Result<Measurement, DriverError> {
    let mut total = Duration::ZERO;
    let mut min = Duration::MAX;
    let mut output = Vec::new();
    let mut values = 0;

    for _ in 0..iterations.max(1) {
        output.clear();
        let start = Instant::now();
        let filled = driver::<C, i64, _>(input, &mut output)?;
        let elapsed = start.elapsed();
        values = filled.len();
        total += elapsed;
        min = min.min(elapsed);
    }
    tracing::info!(container, ?total, "benchmark finished");

    Ok(Measurement {
        container,
        values,
        queries: output.iter().filter(|&&b| b == b'\n').count(),
        total_ms: millis(total),
        mean_ms: millis(total) / f64::from(iterations.max(1)),
        min_ms: millis(min),
        output,
    })
}

/// Benchmarks both containers and checks they produced the same answers.
pub fn compare(name: &str, input: &str, iterations: u32) -> Result<Report> {
    let ours = measure::<BalancedTree<i64>>("balanced-tree", input, iterations)?;
    let reference = measure::<BTreeSet<i64>>("btree-set", input, iterations)?;
    if ours.output != reference.output {
        bail!("balanced-tree and btree-set disagree on {}", name);
    }
    Ok(Report {
        input: name.to_owned(),
        iterations: iterations.max(1),
        results: vec![ours, reference],
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} ({} iterations)", self.input, self.iterations)?;
        writeln!(
            f,
            "{:<15} {:>8} {:>8} {:>12} {:>12}",
            "container", "values", "queries", "mean ms", "min ms"
        )?;
        for m in &self.results {
            writeln!(
                f,
                "{:<15} {:>8} {:>8} {:>12.3} {:>12.3}",
                m.container, m.values, m.queries, m.mean_ms, m.min_ms
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_agrees() {
        let report = compare("inline", "k 1 k 5 k 3 q 0 4 q 2 9 k 8 q 8 8", 3).unwrap();
        assert_eq!(report.iterations, 3);
        assert_eq!(report.results.len(), 2);
        for m in &report.results {
            assert_eq!(m.values, 4);
            assert_eq!(m.queries, 3);
            assert_eq!(m.output, b"2\n2\n1\n");
        }
        let table = report.to_string();
        assert!(table.starts_with("inline (3 iterations)\n"));
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("balanced-tree"));
        assert!(table.contains("btree-set"));
    }

    #[test]
    fn bad_input_fails() {
        assert!(compare("inline", "k 1 x", 1).is_err());
    }

    #[test]
    fn json_skips_raw_output() {
        let report = compare("inline", "k 1 q 0 1", 1).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["container"], "balanced-tree");
        assert_eq!(json["results"][1]["queries"], 1);
        assert!(json["results"][0].get("output").is_none());
    }
}
