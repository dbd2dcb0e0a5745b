//! Intensity segments CLI
//!
//! Usage: segments <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process;

use intensity_segments::commands::{
    ApplyCommand, GenerateCommand, GenerateConfig, VerifyCommand, VerifyConfig,
};
use intensity_segments::{Intensity, Position, SegmentsError};

#[derive(Parser)]
#[command(name = "segments")]
#[command(version)]
#[command(about = "Piecewise-constant intensity profiles with skip list range updates", long_about = None)]
struct Cli {
    /// Number of threads to use (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Reject empty ranges (from == to) instead of ignoring them.
    /// Ranges with from > to are always rejected.
    #[arg(long, global = true)]
    strict_ranges: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an operation script and print the resulting profile
    Apply {
        /// Input script (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Seed for the skip list level generator
        #[arg(long)]
        seed: Option<u64>,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Generate a random operation script
    Generate {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of add/set operations
        #[arg(short = 'n', long, default_value = "1000")]
        ops: usize,

        /// Ranges fall inside [0, domain]
        #[arg(long, default_value = "100000")]
        domain: Position,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Amounts are drawn from [-max, max]
        #[arg(long, default_value = "1000")]
        max_amount: Intensity,

        /// Fraction of operations that are set
        #[arg(long, default_value = "0.5")]
        set_ratio: f64,

        /// Insert a print after every N operations (0 = never)
        #[arg(long, default_value = "0")]
        print_every: usize,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Check the skip list store against a dense reference on random workloads
    Verify {
        /// Number of independent trials
        #[arg(long, default_value = "16")]
        trials: usize,

        /// Operations per trial
        #[arg(short = 'n', long, default_value = "2000")]
        ops: usize,

        /// Ranges fall inside [0, domain]
        #[arg(long, default_value = "1000")]
        domain: Position,

        /// Base seed; trial i uses seed + i
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Amounts are drawn from [-max, max]
        #[arg(long, default_value = "1000")]
        max_amount: Intensity,

        /// Fraction of operations that are set
        #[arg(long, default_value = "0.5")]
        set_ratio: f64,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // This must be set before any operation is applied
    if cli.strict_ranges {
        intensity_segments::config::set_strict_ranges(true);
    }

    // Configure thread pool if --threads specified
    if let Some(n) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .expect("Failed to initialize thread pool");
    }

    let result = match cli.command {
        Commands::Apply { input, seed, stats } => run_apply(input, seed, stats),

        Commands::Generate {
            output,
            ops,
            domain,
            seed,
            max_amount,
            set_ratio,
            print_every,
            stats,
        } => run_generate(
            output,
            GenerateConfig {
                ops,
                domain,
                seed,
                max_amount,
                set_ratio,
                print_every,
            },
            stats,
        ),

        Commands::Verify {
            trials,
            ops,
            domain,
            seed,
            max_amount,
            set_ratio,
            stats,
        } => run_verify(
            VerifyConfig {
                trials,
                workload: GenerateConfig {
                    ops,
                    domain,
                    seed,
                    max_amount,
                    set_ratio,
                    print_every: 0,
                },
            },
            stats,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_apply(input: Option<PathBuf>, seed: Option<u64>, stats: bool) -> Result<(), SegmentsError> {
    let stdout = io::stdout();
    let handle = stdout.lock();

    let mut cmd = ApplyCommand::new();
    if let Some(seed) = seed {
        cmd = cmd.with_seed(seed);
    }

    let result = match input {
        Some(path) if path.to_string_lossy() != "-" => cmd.run(&path, handle)?,
        _ => cmd.run_stdin(handle)?,
    };

    if stats {
        eprintln!("Apply stats: {}", result);
    }
    Ok(())
}

fn run_generate(
    output: Option<PathBuf>,
    config: GenerateConfig,
    stats: bool,
) -> Result<(), SegmentsError> {
    let cmd = GenerateCommand::new(config);

    let result = match output {
        Some(path) => cmd.run(File::create(&path)?)?,
        None => cmd.run(io::stdout().lock())?,
    };

    if stats {
        eprintln!("Generate stats: {}", result);
    }
    Ok(())
}

fn run_verify(config: VerifyConfig, stats: bool) -> Result<(), SegmentsError> {
    let result = VerifyCommand::new(config).run()?;

    if stats {
        eprintln!("Verify stats: {}", result);
    } else {
        eprintln!("OK: {} trials, {} operations", result.trials, result.ops);
    }
    Ok(())
}
