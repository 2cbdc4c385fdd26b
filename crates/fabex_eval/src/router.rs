//! The placement-and-routing tool: single runs, rr-graph probes, and the
//! multi-benchmark reference score.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::EvalError;
use crate::evaluator::run_program;
use crate::metric::{geomean, mean, MetricPattern, CHANNEL_WIDTH_PATTERN};

/// File name the router writes its rr graph to during a probe.
pub const RR_GRAPH_FILE: &str = "dumped_rr_graph.xml";

/// Flags that make the router search for the minimum channel width.
const BINARY_SEARCH_FLAGS: [&str; 9] = [
    "--route",
    "--router_initial_timing",
    "lookahead",
    "--router_lookahead",
    "map",
    "--verify_binary_search",
    "on",
    "--routing_failure_predictor",
    "off",
];

/// Benchmark netlist formats the router flow accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkKind {
    /// A technology-mapped `.blif` netlist.
    Blif,
    /// A `.v` source run through the full flow.
    Verilog,
}

impl BenchmarkKind {
    /// Classifies a benchmark by its extension.
    pub fn of(benchmark: &Path) -> Result<Self, EvalError> {
        match benchmark.extension().and_then(|e| e.to_str()) {
            Some("blif") => Ok(Self::Blif),
            Some("v") => Ok(Self::Verilog),
            _ => Err(EvalError::UnknownBenchmark(benchmark.to_path_buf())),
        }
    }
}

/// One router invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteJob {
    /// Architecture description file.
    pub arch: PathBuf,
    /// Benchmark netlist.
    pub benchmark: PathBuf,
    /// Directory the router runs in; created if missing.
    pub run_dir: PathBuf,
    /// Placement seed.
    pub seed: u64,
    /// Fixed channel width, or `None` to binary-search the minimum.
    pub channel_width: Option<u32>,
    /// Where to dump the rr graph, relative to `run_dir`.
    pub write_rr_graph: Option<PathBuf>,
    /// Whether to open the router's display.
    pub display: bool,
}

impl RouteJob {
    /// A headless minimum-channel-width run with seed 1.
    pub fn new(
        arch: impl Into<PathBuf>,
        benchmark: impl Into<PathBuf>,
        run_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            arch: arch.into(),
            benchmark: benchmark.into(),
            run_dir: run_dir.into(),
            seed: 1,
            channel_width: None,
            write_rr_graph: None,
            display: false,
        }
    }

    /// Returns the router's command-line arguments.
    ///
    /// # Errors
    ///
    /// Fails with [`EvalError::UnknownBenchmark`] for anything but `.blif` or `.v`.
    pub fn args(&self) -> Result<Vec<OsString>, EvalError> {
        let kind = BenchmarkKind::of(&self.benchmark)?;
        let mut args: Vec<OsString> = match kind {
            BenchmarkKind::Blif => vec![self.arch.clone().into(), self.benchmark.clone().into()],
            BenchmarkKind::Verilog => vec![self.benchmark.clone().into(), self.arch.clone().into()],
        };
        if let Some(rr) = &self.write_rr_graph {
            args.push("--write_rr_graph".into());
            args.push(rr.clone().into());
        }
        args.push("--disp".into());
        args.push((if self.display { "on" } else { "off" }).into());
        args.extend(["--pack", "--place", "--timing_analysis", "on", "--seed"].map(OsString::from));
        args.push(self.seed.to_string().into());
        match self.channel_width {
            Some(width) => {
                args.push("--route_chan_width".into());
                args.push(width.to_string().into());
            }
            None => args.extend(BINARY_SEARCH_FLAGS.map(OsString::from)),
        }
        if kind == BenchmarkKind::Verilog {
            args.push("-temp_dir".into());
            args.push(self.run_dir.clone().into());
        }
        Ok(args)
    }
}

/// Result of one router run.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// The benchmark routed; holds the router's stdout.
    Routed(String),
    /// The router exited non-zero.
    Unroutable {
        /// Exit status, or -1 if terminated by a signal.
        status: i32,
    },
}

/// A placement-and-routing tool.
pub trait Router: Send + Sync {
    /// Runs one job to completion.
    ///
    /// # Errors
    ///
    /// Fails only when the router cannot be run at all. A failed route is
    /// [`RouteOutcome::Unroutable`].
    fn route(&self, job: &RouteJob) -> Result<RouteOutcome, EvalError>;
}

/// Runs the router inside each job's run directory.
///
/// `.blif` benchmarks go straight to the router executable; `.v` benchmarks
/// go through the full-flow script, which synthesizes them first.
#[derive(Debug, Clone)]
pub struct ProcessRouter {
    vpr: PathBuf,
    flow_script: PathBuf,
}

impl ProcessRouter {
    /// Creates a backend for the router executable and the flow script.
    pub fn new(vpr: impl Into<PathBuf>, flow_script: impl Into<PathBuf>) -> Self {
        Self {
            vpr: vpr.into(),
            flow_script: flow_script.into(),
        }
    }

    /// Returns the program and arguments that run `job`.
    pub fn command(&self, job: &RouteJob) -> Result<(&Path, Vec<OsString>), EvalError> {
        let program = match BenchmarkKind::of(&job.benchmark)? {
            BenchmarkKind::Blif => self.vpr.as_path(),
            BenchmarkKind::Verilog => self.flow_script.as_path(),
        };
        Ok((program, job.args()?))
    }
}

impl Router for ProcessRouter {
    fn route(&self, job: &RouteJob) -> Result<RouteOutcome, EvalError> {
        let (program, args) = self.command(job)?;
        fs::create_dir_all(&job.run_dir).map_err(io_error(&job.run_dir))?;
        let output = run_program(program, &args, Some(&job.run_dir))?;
        if output.status != 0 {
            tracing::debug!(
                program = %program.display(),
                status = output.status,
                stderr = %output.stderr,
                "router failed"
            );
            return Ok(RouteOutcome::Unroutable {
                status: output.status,
            });
        }
        Ok(RouteOutcome::Routed(output.stdout))
    }
}

/// Routes `benchmark` on `arch` at `channel_width` to obtain the
/// architecture's rr graph, which lands in `run_dir`.
pub fn probe_rr_graph(
    router: &dyn Router,
    arch: &Path,
    benchmark: &Path,
    run_dir: &Path,
    channel_width: u32,
) -> Result<PathBuf, EvalError> {
    let job = RouteJob {
        channel_width: Some(channel_width),
        write_rr_graph: Some(PathBuf::from(RR_GRAPH_FILE)),
        ..RouteJob::new(arch, benchmark, run_dir)
    };
    match router.route(&job)? {
        RouteOutcome::Routed(_) => {}
        RouteOutcome::Unroutable { status } => {
            return Err(EvalError::ProbeUnroutable {
                benchmark: benchmark.to_path_buf(),
                channel_width,
                status,
            })
        }
    }
    let rr_graph = run_dir.join(RR_GRAPH_FILE);
    if !rr_graph.is_file() {
        return Err(EvalError::MissingRrGraph(rr_graph));
    }
    Ok(rr_graph)
}

/// Scores architectures by routing a benchmark set with the router itself.
///
/// Each benchmark yields its minimum channel width (or `penalty` if it does
/// not route); a seed's score is the geometric mean over benchmarks and the
/// final score is the mean over seeds. Lower is better.
pub struct ReferenceRouting<'a> {
    router: &'a dyn Router,
    benchmarks: Vec<PathBuf>,
    seeds: Vec<u64>,
    threads: usize,
    penalty: f64,
    scratch: PathBuf,
    pattern: MetricPattern,
}

impl<'a> ReferenceRouting<'a> {
    /// Creates a scorer writing its per-benchmark run directories under `scratch`.
    pub fn new(
        router: &'a dyn Router,
        benchmarks: Vec<PathBuf>,
        seeds: Vec<u64>,
        threads: usize,
        penalty: f64,
        scratch: impl Into<PathBuf>,
    ) -> Result<Self, EvalError> {
        if benchmarks.is_empty() || seeds.is_empty() {
            return Err(EvalError::NoScores);
        }
        Ok(Self {
            router,
            benchmarks,
            seeds,
            threads: threads.max(1),
            penalty,
            scratch: scratch.into(),
            pattern: MetricPattern::new(CHANNEL_WIDTH_PATTERN)?,
        })
    }

    /// Scores the architecture at `arch`, identified by `label`.
    pub fn score(&self, label: &str, arch: &Path) -> Result<f64, EvalError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.min(self.benchmarks.len()))
            .build()
            .map_err(|e| EvalError::Pool(e.to_string()))?;

        let mut per_seed = Vec::with_capacity(self.seeds.len());
        for &seed in &self.seeds {
            tracing::debug!(label, seed, "routing benchmarks");
            let seed_dir = self.scratch.join(format!("seed{seed}")).join(label);
            if seed_dir.exists() {
                fs::remove_dir_all(&seed_dir).map_err(io_error(&seed_dir))?;
            }
            let widths = pool.install(|| {
                self.benchmarks
                    .par_iter()
                    .enumerate()
                    .map(|(i, bm)| self.route_one(arch, bm, &seed_dir.join(format!("bm{i}")), seed))
                    .collect::<Result<Vec<f64>, EvalError>>()
            })?;
            per_seed.push(geomean(&widths).ok_or(EvalError::NoScores)?);
        }
        mean(&per_seed).ok_or(EvalError::NoScores)
    }

    fn route_one(
        &self,
        arch: &Path,
        benchmark: &Path,
        bm_dir: &Path,
        seed: u64,
    ) -> Result<f64, EvalError> {
        fs::create_dir_all(bm_dir).map_err(io_error(bm_dir))?;
        let local_arch = bm_dir.join(arch.file_name().unwrap_or(arch.as_os_str()));
        fs::copy(arch, &local_arch).map_err(io_error(&local_arch))?;

        let job = RouteJob {
            seed,
            ..RouteJob::new(&local_arch, benchmark, bm_dir)
        };
        match self.router.route(&job)? {
            RouteOutcome::Routed(out) => self.pattern.extract(&out),
            RouteOutcome::Unroutable { status } => {
                tracing::warn!(
                    benchmark = %benchmark.display(),
                    seed,
                    status,
                    penalty = self.penalty,
                    "benchmark did not route"
                );
                Ok(self.penalty)
            }
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> EvalError {
    let path = path.to_path_buf();
    move |source| EvalError::Io { path, source }
}
