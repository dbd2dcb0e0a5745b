//! Generate random operation scripts.
//!
//! Scripts are reproducible from the seed, which makes them usable both as
//! benchmarking input for `segments apply` and as the workload of
//! `segments verify`.

use crate::error::{Result, SegmentsError};
use crate::script::Op;
use crate::segment::{Intensity, Position};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::io::{BufWriter, Write};
use std::time::Instant;

/// Buffer size for script output (1MB).
const BUF_SIZE: usize = 1024 * 1024;

/// Shape of a random workload.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Number of add/set operations
    pub ops: usize,
    /// Ranges fall inside `[0, domain]`
    pub domain: Position,
    pub seed: u64,
    /// Amounts are drawn from `[-max_amount, max_amount]`
    pub max_amount: Intensity,
    /// Fraction of operations that are `set`
    pub set_ratio: f64,
    /// Emit a `print` after every this many operations (0 = never)
    pub print_every: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            ops: 1000,
            domain: 100_000,
            seed: 42,
            max_amount: 1000,
            set_ratio: 0.5,
            print_every: 0,
        }
    }
}

impl GenerateConfig {
    /// Check the workload parameters.
    pub fn validate(&self) -> Result<()> {
        if self.domain < 1 {
            return Err(SegmentsError::InvalidArgument(format!(
                "domain must be at least 1, got {}",
                self.domain
            )));
        }
        if self.max_amount < 0 {
            return Err(SegmentsError::InvalidArgument(format!(
                "max amount must not be negative, got {}",
                self.max_amount
            )));
        }
        if !(0.0..=1.0).contains(&self.set_ratio) {
            return Err(SegmentsError::InvalidArgument(format!(
                "set ratio must be within [0, 1], got {}",
                self.set_ratio
            )));
        }
        Ok(())
    }

    /// Draw one add or set over a non-empty range inside the domain.
    #[inline]
    pub fn random_op(&self, rng: &mut SmallRng) -> Op {
        let from = rng.gen_range(0..self.domain);
        let to = rng.gen_range(from + 1..=self.domain);
        let amount = rng.gen_range(-self.max_amount..=self.max_amount);
        if rng.gen_bool(self.set_ratio) {
            Op::Set { from, to, amount }
        } else {
            Op::Add { from, to, amount }
        }
    }
}

/// Statistics from generate operation.
#[derive(Debug, Default, Clone)]
pub struct GenerateStats {
    pub adds: usize,
    pub sets: usize,
    pub prints: usize,
    pub elapsed_secs: f64,
}

impl std::fmt::Display for GenerateStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Adds: {}, Sets: {}, Prints: {} ({:.3}s)",
            self.adds, self.sets, self.prints, self.elapsed_secs
        )
    }
}

/// Writes a random operation script.
pub struct GenerateCommand {
    config: GenerateConfig,
}

impl GenerateCommand {
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    /// The operations this command writes, in order.
    pub fn ops(&self) -> Result<Vec<Op>> {
        self.config.validate()?;
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let mut ops = Vec::with_capacity(self.config.ops);
        for i in 0..self.config.ops {
            ops.push(self.config.random_op(&mut rng));
            if self.config.print_every > 0 && (i + 1) % self.config.print_every == 0 {
                ops.push(Op::Print);
            }
        }
        Ok(ops)
    }

    /// Write the script to `output`.
    pub fn run<W: Write>(&self, output: W) -> Result<GenerateStats> {
        let start = Instant::now();
        let ops = self.ops()?;

        let mut stats = GenerateStats::default();
        let mut writer = BufWriter::with_capacity(BUF_SIZE, output);
        for op in &ops {
            match op {
                Op::Add { .. } => stats.adds += 1,
                Op::Set { .. } => stats.sets += 1,
                Op::Print => stats.prints += 1,
            }
            writeln!(writer, "{}", op)?;
        }
        writer.flush()?;

        stats.elapsed_secs = start.elapsed().as_secs_f64();
        Ok(stats)
    }
}
