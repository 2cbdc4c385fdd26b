//! Running architecture points through instantiation, probing, calibration
//! and scoring.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rayon::prelude::*;

use fabex_arch::ArchPoint;
use fabex_config::{resolve_calibration, ExploreConfig, ResolvedCalibration};
use fabex_eval::{
    calibrate, geomean, mean, probe_rr_graph, CalibrationOutcome, CalibrationParams, EvalError,
    EvalRequest, Evaluator, MetricPattern, ReferenceRouting, Router,
};
use fabex_instantiate::{EditorFactory, Instantiator};
use fabex_rank::ScoredPoint;

use crate::error::ExploreError;

/// The external collaborators a run talks to.
#[derive(Clone, Copy)]
pub struct Backends<'a> {
    /// Opens editors on staged architecture files.
    pub editors: &'a dyn EditorFactory,
    /// The routability evaluator.
    pub evaluator: &'a dyn Evaluator,
    /// The placement-and-routing tool.
    pub router: &'a dyn Router,
}

/// Evaluation of a point at one channel width.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRun {
    /// Channel width the rr graph was probed at.
    pub channel_width: u32,
    /// Final tracked metric.
    pub value: f64,
    /// Demand multiplier the metric was measured at.
    pub parameter: f64,
    /// Score extracted from the final evaluator output.
    pub score: f64,
    /// How the calibration ended; `None` for fixed-demand runs.
    pub outcome: Option<CalibrationOutcome>,
    /// Evaluator invocations used.
    pub iterations: u32,
}

/// The outcome of evaluating one point.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResult {
    /// Position of the point in the input list.
    pub index: usize,
    /// Architecture label.
    pub label: String,
    /// Geometric mean of the per-width scores.
    pub score: f64,
    /// One entry per configured channel width, in order.
    pub runs: Vec<ChannelRun>,
}

impl CalibrationResult {
    /// Mean tracked metric over channel widths.
    pub fn value(&self) -> f64 {
        mean_of(&self.runs, |r| r.value)
    }

    /// Mean tuned demand multiplier over channel widths.
    pub fn parameter(&self) -> f64 {
        mean_of(&self.runs, |r| r.parameter)
    }

    /// Whether any channel width ended with the metric short of its target.
    pub fn too_unroutable(&self) -> bool {
        self.runs
            .iter()
            .any(|r| r.outcome == Some(CalibrationOutcome::Unreachable))
    }

    /// The `(index, label, score)` row used for ranking.
    pub fn to_scored(&self) -> ScoredPoint {
        ScoredPoint::new(self.index, self.label.clone(), self.score)
    }
}

fn mean_of(runs: &[ChannelRun], f: impl Fn(&ChannelRun) -> f64) -> f64 {
    let values: Vec<f64> = runs.iter().map(f).collect();
    mean(&values).unwrap_or(f64::NAN)
}

/// A point that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPoint {
    /// Position of the point in the input list.
    pub index: usize,
    /// Architecture label.
    pub label: String,
    /// Rendered error.
    pub error: String,
}

/// Results of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct Exploration<T> {
    /// Points that were scored.
    pub results: Vec<T>,
    /// Points that failed and were left out.
    pub failed: Vec<FailedPoint>,
}

/// Drives points through the exploration pipeline.
///
/// `config` paths are used as given; resolve them against the project root
/// first.
pub struct Explorer<'a> {
    config: &'a ExploreConfig,
    backends: Backends<'a>,
    calibration: ResolvedCalibration,
    metric: MetricPattern,
    score: MetricPattern,
    instantiator: Instantiator,
}

impl<'a> Explorer<'a> {
    /// Prepares an explorer, compiling the configured metric patterns.
    pub fn new(config: &'a ExploreConfig, backends: Backends<'a>) -> Result<Self, ExploreError> {
        let calibration = resolve_calibration(&config.calibration);
        let metric = MetricPattern::new(&calibration.pattern)?;
        let score = MetricPattern::new(&calibration.score_pattern)?;
        CalibrationParams::from(&calibration).validate()?;
        Ok(Self {
            config,
            backends,
            calibration,
            metric,
            score,
            instantiator: Instantiator::new(
                &config.paths.arch_base,
                &config.paths.work_dir,
                config.explore.via_repeat,
            ),
        })
    }

    /// Materializes `point` under run `index` and returns the staged file.
    pub fn instantiate(&self, index: usize, point: &ArchPoint) -> Result<PathBuf, ExploreError> {
        Ok(self
            .instantiator
            .instantiate(point, index, self.backends.editors)?)
    }

    /// Evaluates one point at every configured channel width.
    pub fn evaluate_point(
        &self,
        index: usize,
        point: &ArchPoint,
    ) -> Result<CalibrationResult, ExploreError> {
        let label = point.label();
        let arch = self.instantiate(index, point)?;
        let run_dir = arch.parent().unwrap_or(Path::new(".")).to_path_buf();
        let probe = self
            .config
            .paths
            .benchmarks
            .join(self.config.explore.probe_benchmark.get(point.lut_size()));

        let mut runs = Vec::with_capacity(self.config.explore.channel_widths.len());
        for &channel_width in &self.config.explore.channel_widths {
            let rr_graph =
                probe_rr_graph(self.backends.router, &arch, &probe, &run_dir, channel_width)?;
            let run = self.evaluate_width(point, &rr_graph, channel_width)?;
            tracing::debug!(
                label = %label,
                channel_width,
                score = run.score,
                demand = run.parameter,
                "channel width evaluated"
            );
            runs.push(run);
        }

        let scores: Vec<f64> = runs.iter().map(|r| r.score).collect();
        let score = geomean(&scores).ok_or(EvalError::NoScores)?;
        tracing::info!(index, label = %label, score, "point evaluated");
        Ok(CalibrationResult {
            index,
            label,
            score,
            runs,
        })
    }

    fn evaluate_width(
        &self,
        point: &ArchPoint,
        rr_graph: &Path,
        channel_width: u32,
    ) -> Result<ChannelRun, ExploreError> {
        let request = |demand: f64| EvalRequest {
            rr_graph,
            demand: Some(demand),
            fc_in: point.fc_in(),
            fc_out: point.fc_out(),
        };

        if let Some(demand) = self.calibration.fixed_demand {
            let output = self.backends.evaluator.evaluate(&request(demand))?;
            let value = self.metric.extract(&output)?;
            return Ok(ChannelRun {
                channel_width,
                value,
                parameter: demand,
                score: value,
                outcome: None,
                iterations: 1,
            });
        }

        let params = CalibrationParams::from(&self.calibration);
        let cal = calibrate(params, &self.metric, |demand| {
            self.backends.evaluator.evaluate(&request(demand))
        })?;
        if cal.outcome == CalibrationOutcome::Unreachable {
            tracing::warn!(
                label = %point,
                channel_width,
                value = cal.value,
                target = params.target,
                "too unroutable to reach target"
            );
        }
        Ok(ChannelRun {
            channel_width,
            value: cal.value,
            parameter: cal.parameter,
            score: self.score.extract(&cal.output)?,
            outcome: Some(cal.outcome),
            iterations: cal.iterations,
        })
    }

    /// Evaluates `points` on a pool of `explore.workers` threads.
    ///
    /// A point that fails is logged and recorded in
    /// [`Exploration::failed`]; the rest of the batch continues.
    pub fn evaluate_all(
        &self,
        points: &[ArchPoint],
    ) -> Result<Exploration<CalibrationResult>, ExploreError> {
        self.run_pool(points, self.config.explore.workers, |i, p| {
            self.evaluate_point(i, p)
        })
    }

    /// Scores one point with the router over the configured benchmark set.
    ///
    /// Lower is better.
    pub fn route_point(&self, index: usize, point: &ArchPoint) -> Result<ScoredPoint, ExploreError> {
        let label = point.label();
        let arch = self.instantiate(index, point)?;
        let router = &self.config.router;
        let benchmarks = router
            .benchmarks
            .get(point.lut_size())
            .iter()
            .map(|b| self.config.paths.benchmarks.join(b))
            .collect();
        let scorer = ReferenceRouting::new(
            self.backends.router,
            benchmarks,
            router.seeds.clone(),
            router.threads,
            router.penalty,
            self.config.paths.work_dir.join("router"),
        )?;
        let score = scorer.score(&label, &arch)?;
        tracing::info!(index, label = %label, score, "point routed");
        Ok(ScoredPoint::new(index, label, score))
    }

    /// Scores `points` with the router, one point at a time.
    ///
    /// Benchmarks within a point already run on `router.threads` threads.
    pub fn route_all(&self, points: &[ArchPoint]) -> Result<Exploration<ScoredPoint>, ExploreError> {
        self.run_pool(points, 1, |i, p| self.route_point(i, p))
    }

    fn run_pool<T, F>(
        &self,
        points: &[ArchPoint],
        workers: usize,
        job: F,
    ) -> Result<Exploration<T>, ExploreError>
    where
        T: Send,
        F: Fn(usize, &ArchPoint) -> Result<T, ExploreError> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .build()
            .map_err(|e| ExploreError::Pool(e.to_string()))?;

        let results = Mutex::new(Vec::with_capacity(points.len()));
        let failed = Mutex::new(Vec::new());
        pool.install(|| {
            points.par_iter().enumerate().for_each(|(index, point)| {
                match job(index, point) {
                    Ok(result) => results.lock().push((index, result)),
                    Err(e) => {
                        tracing::error!(index, label = %point, error = %e, "point failed");
                        failed.lock().push(FailedPoint {
                            index,
                            label: point.label(),
                            error: e.to_string(),
                        });
                    }
                }
            });
        });

        let mut results = results.into_inner();
        results.sort_by_key(|(index, _)| *index);
        let mut failed = failed.into_inner();
        failed.sort_by_key(|f| f.index);
        Ok(Exploration {
            results: results.into_iter().map(|(_, r)| r).collect(),
            failed,
        })
    }
}
