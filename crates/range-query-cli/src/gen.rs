//! Random command streams for benchmarking.

use std::io::Write;

use eyre::{ensure, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Builds `inserts` insert commands and `queries` query commands with
/// values in `[-value_range, value_range]`, in random order.
///
/// Query bounds are always distinct and given low to high.
pub fn generate<R: Rng>(
    rng: &mut R,
    inserts: usize,
    queries: usize,
    value_range: i64,
) -> Result<Vec<String>> {
    ensure!(value_range > 0, "value range must be positive, got {}", value_range);

    let mut blocks = Vec::with_capacity(inserts + queries);
    for _ in 0..inserts {
        let value = rng.random_range(-value_range..=value_range);
        blocks.push(format!("k {}", value));
    }
    for _ in 0..queries {
        let a = rng.random_range(-value_range..=value_range);
        let mut b = rng.random_range(-value_range..=value_range);
        while b == a {
            b = rng.random_range(-value_range..=value_range);
        }
        blocks.push(format!("q {} {}", a.min(b), a.max(b)));
    }
    blocks.shuffle(rng);
    Ok(blocks)
}

pub fn write_blocks<W: Write>(out: &mut W, blocks: &[String]) -> std::io::Result<()> {
    for block in blocks {
        write!(out, "{} ", block)?;
    }
    out.flush()
}
