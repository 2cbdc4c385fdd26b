//! fabex CLI: explore and rank reconfigurable-fabric routing architectures.
//!
//! Provides `fabex generate` and `fabex sample` for working with design
//! points, `fabex instantiate` for materializing one architecture, `fabex
//! evaluate` and `fabex route` for scoring and ranking architecture lists, and
//! `fabex compare` for measuring agreement between two result files.

#![warn(missing_docs)]

mod compare;
mod evaluate;
mod generate;
mod instantiate;
mod project;
mod sample;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// fabex: routing-architecture design space exploration.
#[derive(Parser, Debug)]
#[command(name = "fabex", version, about = "Routing architecture exploration")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `fabex.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the switch blocks generated for an architecture label.
    Generate(GenerateArgs),
    /// Print random, distinct architecture labels.
    Sample(SampleArgs),
    /// Materialize the architecture file for a label.
    Instantiate(InstantiateArgs),
    /// Calibrate, score and rank architectures with the routability evaluator.
    Evaluate(EvaluateArgs),
    /// Score and rank architectures by routing benchmarks.
    Route(RouteArgs),
    /// Compare two result files.
    Compare(CompareArgs),
}

/// Arguments for the `fabex generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Architecture label.
    pub label: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Print the document edits instead of the switch blocks.
    #[arg(long)]
    pub dry_run: bool,

    /// Global via repeat (default: `explore.via_repeat`, or 4 without a config).
    #[arg(long)]
    pub via_repeat: Option<u32>,
}

/// Arguments for the `fabex sample` subcommand.
#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// Number of labels to draw.
    #[arg(short = 'n', long)]
    pub count: usize,

    /// LUT size of the sampled architectures (4 or 6).
    #[arg(long, default_value_t = 6)]
    pub lut: u32,

    /// Random seed, for reproducible samples.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the `fabex instantiate` subcommand.
#[derive(Parser, Debug)]
pub struct InstantiateArgs {
    /// Architecture label.
    pub label: String,

    /// Run index; the file is staged under `<work_dir>/<label>/run<N>`.
    #[arg(long, default_value_t = 0)]
    pub run: usize,
}

/// Architecture selection shared by `evaluate` and `route`.
#[derive(Parser, Debug)]
pub struct PointArgs {
    /// Architecture labels.
    pub labels: Vec<String>,

    /// File with one label per line; blank lines and `#` comments are ignored.
    #[arg(short, long)]
    pub list: Option<PathBuf>,

    /// Result file to write.
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the `fabex evaluate` subcommand.
#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Points and output.
    #[command(flatten)]
    pub points: PointArgs,

    /// Result file of a reference ordering (e.g. from `fabex route`) to compare against.
    #[arg(short, long)]
    pub reference: Option<PathBuf>,
}

/// Arguments for the `fabex route` subcommand.
#[derive(Parser, Debug)]
pub struct RouteArgs {
    /// Points and output.
    #[command(flatten)]
    pub points: PointArgs,
}

/// Arguments for the `fabex compare` subcommand.
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Result file whose ordering is checked.
    pub ordering: PathBuf,

    /// Result file of the reference ordering.
    pub reference: PathBuf,

    /// Reference-score difference within which a disagreement still counts
    /// (default: `compare.tolerance`).
    #[arg(short, long)]
    pub tolerance: Option<f64>,
}

/// Output format for `fabex generate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn init_tracing(global: &GlobalArgs) {
    let filter = if global.verbose {
        "debug"
    } else if global.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Generate(ref args) => generate::run(args, &global),
        Command::Sample(ref args) => sample::run(args),
        Command::Instantiate(ref args) => instantiate::run(args, &global),
        Command::Evaluate(ref args) => evaluate::run_evaluate(args, &global),
        Command::Route(ref args) => evaluate::run_route(args, &global),
        Command::Compare(ref args) => compare::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
