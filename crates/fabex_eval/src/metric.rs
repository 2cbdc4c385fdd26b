//! Extraction of numeric metrics from unstructured tool output.

use regex::Regex;

use crate::error::EvalError;

/// Extracts the router's channel width from its log.
pub const CHANNEL_WIDTH_PATTERN: &str = r"channel width factor of (\d+)";

/// A compiled pattern whose first capture group holds a number.
///
/// When the pattern matches several times, the last match wins, since tools
/// print running values before the final one.
#[derive(Debug, Clone)]
pub struct MetricPattern {
    regex: Regex,
}

impl MetricPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Fails if the pattern is not a valid regex or has no capture group.
    pub fn new(pattern: &str) -> Result<Self, EvalError> {
        let regex = Regex::new(pattern).map_err(|source| EvalError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        if regex.captures_len() < 2 {
            return Err(EvalError::PatternWithoutGroup(pattern.to_string()));
        }
        Ok(Self { regex })
    }

    /// Returns the pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Extracts the value of the last match in `text`.
    pub fn extract(&self, text: &str) -> Result<f64, EvalError> {
        let capture = self
            .regex
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .last()
            .ok_or_else(|| EvalError::MetricNotFound {
                pattern: self.as_str().to_string(),
            })?;
        capture
            .as_str()
            .parse()
            .map_err(|_| EvalError::InvalidMetric {
                value: capture.as_str().to_string(),
                pattern: self.as_str().to_string(),
            })
    }
}

/// Geometric mean of `values`, or `None` if there are none.
pub fn geomean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let log_sum: f64 = values.iter().map(|v| v.ln()).sum();
    Some((log_sum / values.len() as f64).exp())
}

/// Arithmetic mean of `values`, or `None` if there are none.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
