//! Bisection search for the demand multiplier that drives the evaluator's
//! tracked metric to a target value.
//!
//! The search assumes the metric is monotone in the demand: increasing for
//! normalized demand, decreasing for the routability metric. [`Bisection`]
//! is the state machine; [`calibrate`] drives it against an evaluator.

use std::fmt;

use fabex_config::{CalibrationMode, ResolvedCalibration};

use crate::error::EvalError;
use crate::metric::MetricPattern;

/// Inputs of one calibration search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationParams {
    /// Whether the metric grows with the parameter.
    pub increasing: bool,
    /// Value the metric should reach.
    pub target: f64,
    /// Accepted distance from the target.
    pub tolerance: f64,
    /// Initial lower bound of the parameter.
    pub low: f64,
    /// Initial upper bound of the parameter.
    pub high: f64,
    /// Maximum number of evaluations.
    pub max_iters: u32,
}

impl CalibrationParams {
    /// Default search for a mode: its target and tolerance, bounds `[0, 10]`,
    /// 30 evaluations.
    pub fn for_mode(mode: CalibrationMode) -> Self {
        Self {
            increasing: mode.increasing(),
            target: mode.default_target(),
            tolerance: mode.default_tolerance(),
            low: 0.0,
            high: 10.0,
            max_iters: 30,
        }
    }

    /// Checks that the search is well-formed.
    pub fn validate(&self) -> Result<(), EvalError> {
        let finite = [self.target, self.tolerance, self.low, self.high]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(EvalError::InvalidParams(
                "target, tolerance and bounds must be finite".to_string(),
            ));
        }
        if self.low > self.high {
            return Err(EvalError::InvalidParams(format!(
                "low {} exceeds high {}",
                self.low, self.high
            )));
        }
        if self.tolerance <= 0.0 {
            return Err(EvalError::InvalidParams(format!(
                "tolerance {} must be positive",
                self.tolerance
            )));
        }
        if self.max_iters == 0 {
            return Err(EvalError::InvalidParams(
                "max_iters must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&ResolvedCalibration> for CalibrationParams {
    fn from(c: &ResolvedCalibration) -> Self {
        Self {
            increasing: c.mode.increasing(),
            target: c.target,
            tolerance: c.tolerance,
            low: c.low,
            high: c.high,
            max_iters: c.max_iters,
        }
    }
}

/// Where a [`Bisection`] stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// More evaluations are needed.
    Searching,
    /// The last metric is within tolerance of the target.
    Converged,
    /// Out of evaluations with the metric still short of the target.
    ExhaustedLow,
    /// Out of evaluations with the metric past the target.
    ExhaustedHigh,
}

/// Bisection over the parameter bracket.
#[derive(Debug, Clone)]
pub struct Bisection {
    params: CalibrationParams,
    low: f64,
    high: f64,
    iterations: u32,
    state: SearchState,
}

impl Bisection {
    /// Starts a search.
    pub fn new(params: CalibrationParams) -> Result<Self, EvalError> {
        params.validate()?;
        Ok(Self {
            params,
            low: params.low,
            high: params.high,
            iterations: 0,
            state: SearchState::Searching,
        })
    }

    /// Current state.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Number of observations so far.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Current bracket.
    pub fn bracket(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    /// Parameter to evaluate next, or `None` once the search has ended.
    pub fn next_parameter(&self) -> Option<f64> {
        (self.state == SearchState::Searching).then(|| (self.low + self.high) / 2.0)
    }

    /// Records the metric `value` measured at `parameter` and narrows the bracket.
    ///
    /// # Errors
    ///
    /// Fails if the bracket inverts, which means the metric is not monotone.
    pub fn observe(&mut self, parameter: f64, value: f64) -> Result<SearchState, EvalError> {
        self.iterations += 1;
        let p = self.params;
        if (value - p.target).abs() <= p.tolerance {
            self.state = SearchState::Converged;
            return Ok(self.state);
        }

        let short = if p.increasing {
            value < p.target
        } else {
            value > p.target
        };
        if short {
            self.low = parameter;
        } else {
            self.high = parameter;
        }
        if self.low > self.high {
            return Err(EvalError::NonMonotonic {
                low: self.low,
                high: self.high,
            });
        }

        if self.iterations >= p.max_iters {
            self.state = if short {
                SearchState::ExhaustedLow
            } else {
                SearchState::ExhaustedHigh
            };
        }
        Ok(self.state)
    }
}

/// How a calibration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationOutcome {
    /// The metric reached the target within tolerance.
    Converged,
    /// The metric never reached the target; the architecture is too unroutable.
    Unreachable,
    /// The metric overshot; the last value is the best effort.
    BestEffort,
}

impl fmt::Display for CalibrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Converged => "converged",
            Self::Unreachable => "too unroutable",
            Self::BestEffort => "best effort",
        };
        f.write_str(s)
    }
}

/// Result of a calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Last measured metric.
    pub value: f64,
    /// Parameter the last metric was measured at.
    pub parameter: f64,
    /// Evaluator output of the last evaluation.
    pub output: String,
    /// How the search ended.
    pub outcome: CalibrationOutcome,
    /// Number of evaluations run.
    pub iterations: u32,
}

/// Runs a bisection, calling `evaluate` with each candidate parameter and
/// reading the metric from its output with `pattern`.
///
/// # Errors
///
/// Invalid parameters, evaluator failures, unparsable output and bracket
/// inversion are fatal. Running out of evaluations is not an error; see
/// [`CalibrationOutcome`].
pub fn calibrate<F>(
    params: CalibrationParams,
    pattern: &MetricPattern,
    mut evaluate: F,
) -> Result<Calibration, EvalError>
where
    F: FnMut(f64) -> Result<String, EvalError>,
{
    let mut search = Bisection::new(params)?;
    while let Some(parameter) = search.next_parameter() {
        let output = evaluate(parameter)?;
        let value = pattern.extract(&output)?;
        let state = search.observe(parameter, value)?;
        let (low, high) = search.bracket();
        tracing::debug!(
            iteration = search.iterations(),
            parameter,
            value,
            low,
            high,
            "bisection step"
        );

        let outcome = match state {
            SearchState::Searching => continue,
            SearchState::Converged => CalibrationOutcome::Converged,
            SearchState::ExhaustedLow => CalibrationOutcome::Unreachable,
            SearchState::ExhaustedHigh => CalibrationOutcome::BestEffort,
        };
        if outcome != CalibrationOutcome::Converged {
            tracing::warn!(
                iterations = search.iterations(),
                value,
                target = params.target,
                %outcome,
                "calibration did not converge"
            );
        }
        return Ok(Calibration {
            value,
            parameter,
            output,
            outcome,
            iterations: search.iterations(),
        });
    }
    // next_parameter only returns None after a terminal state, which returns above.
    Err(EvalError::NoScores)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demand_pattern() -> MetricPattern {
        MetricPattern::new(CalibrationMode::NormalizedDemand.default_pattern()).unwrap()
    }

    fn routability_pattern() -> MetricPattern {
        MetricPattern::new(CalibrationMode::RoutabilityMetric.default_pattern()).unwrap()
    }

    #[test]
    fn converges_on_identity_metric() {
        let params = CalibrationParams {
            target: 0.8,
            tolerance: 0.01,
            ..CalibrationParams::for_mode(CalibrationMode::NormalizedDemand)
        };
        let mut seen = Vec::new();
        let cal = calibrate(params, &demand_pattern(), |p| {
            seen.push(p);
            Ok(format!("Normalized demand: {p:?}\n"))
        })
        .unwrap();
        assert_eq!(cal.outcome, CalibrationOutcome::Converged);
        assert!(cal.iterations <= 11);
        assert!((0.79..=0.81).contains(&cal.parameter));
        assert_eq!(seen[..3], [5.0, 2.5, 1.25]);
        assert_eq!(seen.len() as u32, cal.iterations);
    }

    #[test]
    fn decreasing_metric_converges() {
        // Routability falls as demand rises: r(d) = 1 / (1 + d).
        let params = CalibrationParams::for_mode(CalibrationMode::RoutabilityMetric);
        let cal = calibrate(params, &routability_pattern(), |d| {
            Ok(format!("Routability metric: {:?}\n", 1.0 / (1.0 + d)))
        })
        .unwrap();
        assert_eq!(cal.outcome, CalibrationOutcome::Converged);
        assert!((cal.value - 0.3).abs() <= 0.02);
        assert!(cal.output.starts_with("Routability metric"));
    }

    #[test]
    fn constant_metric_is_too_unroutable() {
        let params = CalibrationParams::for_mode(CalibrationMode::RoutabilityMetric);
        let mut calls = 0;
        let cal = calibrate(params, &routability_pattern(), |_| {
            calls += 1;
            Ok("Routability metric: 5.0\n".to_string())
        })
        .unwrap();
        assert_eq!(cal.outcome, CalibrationOutcome::Unreachable);
        assert_eq!(cal.iterations, 30);
        assert_eq!(calls, 30);
        assert_eq!(cal.value, 5.0);
        assert!(cal.parameter > 9.99);
    }

    #[test]
    fn overshooting_metric_is_best_effort() {
        let params = CalibrationParams {
            max_iters: 5,
            ..CalibrationParams::for_mode(CalibrationMode::NormalizedDemand)
        };
        let cal = calibrate(params, &demand_pattern(), |_| {
            Ok("Normalized demand: 1.00\n".to_string())
        })
        .unwrap();
        assert_eq!(cal.outcome, CalibrationOutcome::BestEffort);
        assert_eq!(cal.iterations, 5);
        assert_eq!(cal.parameter, 0.3125);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let params = CalibrationParams {
            low: 2.0,
            high: 1.0,
            ..CalibrationParams::for_mode(CalibrationMode::NormalizedDemand)
        };
        let err = calibrate(params, &demand_pattern(), |_| unreachable!()).unwrap_err();
        assert!(matches!(err, EvalError::InvalidParams(_)));
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let params = CalibrationParams {
            max_iters: 0,
            ..CalibrationParams::for_mode(CalibrationMode::RoutabilityMetric)
        };
        assert!(matches!(
            Bisection::new(params),
            Err(EvalError::InvalidParams(_))
        ));
    }

    #[test]
    fn evaluator_errors_and_bad_output_propagate() {
        let params = CalibrationParams::for_mode(CalibrationMode::RoutabilityMetric);
        let err = calibrate(params, &routability_pattern(), |_| {
            Err(EvalError::Failed {
                program: "wotan".into(),
                status: 1,
                stderr: String::new(),
            })
        })
        .unwrap_err();
        assert!(matches!(err, EvalError::Failed { .. }));

        let err = calibrate(params, &routability_pattern(), |_| Ok("segfault".to_string()))
            .unwrap_err();
        assert!(matches!(err, EvalError::MetricNotFound { .. }));
    }

    #[test]
    fn bisection_narrows_bracket_by_mode() {
        let mut up = Bisection::new(CalibrationParams::for_mode(CalibrationMode::NormalizedDemand))
            .unwrap();
        assert_eq!(up.next_parameter(), Some(5.0));
        up.observe(5.0, 0.2).unwrap();
        assert_eq!(up.bracket(), (5.0, 10.0));

        let mut down =
            Bisection::new(CalibrationParams::for_mode(CalibrationMode::RoutabilityMetric))
                .unwrap();
        down.observe(5.0, 0.2).unwrap();
        assert_eq!(down.bracket(), (0.0, 5.0));
        assert_eq!(down.state(), SearchState::Searching);
        down.observe(2.5, 0.31).unwrap();
        assert_eq!(down.state(), SearchState::Converged);
        assert_eq!(down.next_parameter(), None);
    }

    #[test]
    fn params_from_resolved_config() {
        let resolved = fabex_config::resolve_calibration(&fabex_config::CalibrationConfig::default());
        let params = CalibrationParams::from(&resolved);
        assert_eq!(
            params,
            CalibrationParams::for_mode(CalibrationMode::RoutabilityMetric)
        );
    }
}
