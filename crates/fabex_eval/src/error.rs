//! Error types for external tool invocation and calibration.

use std::path::PathBuf;

/// Errors raised while running the evaluator or router, extracting metrics,
/// or calibrating.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// A metric pattern is not a valid regular expression.
    #[error("invalid metric pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// The regex compilation error.
        source: regex::Error,
    },

    /// A metric pattern has no capture group to read the value from.
    #[error("metric pattern '{0}' has no capture group")]
    PatternWithoutGroup(String),

    /// Tool output contained no match for a metric pattern.
    #[error("no match for '{pattern}' in tool output")]
    MetricNotFound {
        /// The pattern that did not match.
        pattern: String,
    },

    /// A captured metric is not a number.
    #[error("captured value '{value}' for '{pattern}' is not a number")]
    InvalidMetric {
        /// The captured text.
        value: String,
        /// The pattern that captured it.
        pattern: String,
    },

    /// An external program could not be started.
    #[error("failed to run '{}': {source}", program.display())]
    Spawn {
        /// The program that failed to start.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An external program exited with a non-zero status.
    #[error("'{}' exited with status {status}: {stderr}", program.display())]
    Failed {
        /// The program that failed.
        program: PathBuf,
        /// Exit status, or -1 if terminated by a signal.
        status: i32,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// A scratch file or directory could not be prepared.
    #[error("failed to prepare {}: {source}", path.display())]
    Io {
        /// The path being created or copied.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A benchmark file has an extension the router flow does not handle.
    #[error("unknown benchmark type: {} (expected .blif or .v)", .0.display())]
    UnknownBenchmark(PathBuf),

    /// The probe benchmark could not be routed, so no rr graph was written.
    #[error("probe benchmark {} is unroutable at channel width {channel_width} (status {status})", benchmark.display())]
    ProbeUnroutable {
        /// The probe benchmark.
        benchmark: PathBuf,
        /// Channel width the probe was routed at.
        channel_width: u32,
        /// Router exit status.
        status: i32,
    },

    /// The router succeeded but left no rr graph behind.
    #[error("router did not write {}", .0.display())]
    MissingRrGraph(PathBuf),

    /// Calibration parameters are inconsistent.
    #[error("invalid calibration parameters: {0}")]
    InvalidParams(String),

    /// The search bracket inverted, so the metric is not monotone in the parameter.
    #[error("search bracket inverted (low {low} > high {high}); metric is not monotone")]
    NonMonotonic {
        /// Lower bound at the time of failure.
        low: f64,
        /// Upper bound at the time of failure.
        high: f64,
    },

    /// There were no values to aggregate into a score.
    #[error("no values to aggregate")]
    NoScores,

    /// A worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    Pool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_metric_not_found() {
        let err = EvalError::MetricNotFound {
            pattern: r"Routability metric: (\d+\.*\d*)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r"no match for 'Routability metric: (\d+\.*\d*)' in tool output"
        );
    }

    #[test]
    fn display_failed() {
        let err = EvalError::Failed {
            program: PathBuf::from("/opt/wotan"),
            status: 2,
            stderr: "bad rr graph".to_string(),
        };
        assert_eq!(err.to_string(), "'/opt/wotan' exited with status 2: bad rr graph");
    }

    #[test]
    fn display_non_monotonic() {
        let err = EvalError::NonMonotonic { low: 2.5, high: 1.0 };
        assert!(err.to_string().contains("low 2.5 > high 1"));
    }

    #[test]
    fn display_unknown_benchmark() {
        let err = EvalError::UnknownBenchmark(PathBuf::from("a/sha.vhd"));
        assert_eq!(
            err.to_string(),
            "unknown benchmark type: a/sha.vhd (expected .blif or .v)"
        );
    }
}
