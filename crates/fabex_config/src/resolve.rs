//! Resolution of optional settings into the concrete values used at run time.

use crate::types::{CalibrationConfig, CalibrationMode, PathsConfig};
use std::path::Path;

/// Calibration settings with every mode default filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCalibration {
    /// Tracked metric.
    pub mode: CalibrationMode,
    /// Target value for the tracked metric.
    pub target: f64,
    /// Convergence tolerance.
    pub tolerance: f64,
    /// Regex extracting the tracked metric.
    pub pattern: String,
    /// Regex extracting the score.
    pub score_pattern: String,
    /// Lower bracket bound.
    pub low: f64,
    /// Upper bracket bound.
    pub high: f64,
    /// Maximum evaluator invocations.
    pub max_iters: u32,
    /// Fixed demand that replaces the search, if set.
    pub fixed_demand: Option<f64>,
}

/// Fills unset calibration fields with the defaults of the configured mode.
pub fn resolve_calibration(config: &CalibrationConfig) -> ResolvedCalibration {
    let mode = config.mode;
    ResolvedCalibration {
        mode,
        target: config.target.unwrap_or_else(|| mode.default_target()),
        tolerance: config.tolerance.unwrap_or_else(|| mode.default_tolerance()),
        pattern: config
            .pattern
            .clone()
            .unwrap_or_else(|| mode.default_pattern().to_string()),
        score_pattern: config.score_pattern.clone(),
        low: config.low,
        high: config.high,
        max_iters: config.max_iters,
        fixed_demand: config.fixed_demand,
    }
}

/// Resolves relative paths against `root`, the directory holding `fabex.toml`.
///
/// Absolute paths are kept as they are.
pub fn resolve_paths(paths: &PathsConfig, root: &Path) -> PathsConfig {
    let rooted = |p: &Path| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            root.join(p)
        }
    };
    PathsConfig {
        arch_base: rooted(&paths.arch_base),
        work_dir: rooted(&paths.work_dir),
        evaluator: rooted(&paths.evaluator),
        router: rooted(&paths.router),
        flow_script: rooted(&paths.flow_script),
        benchmarks: rooted(&paths.benchmarks),
    }
}
