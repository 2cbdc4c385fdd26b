//! Configuration types deserialized from `fabex.toml`.

use fabex_arch::LutSize;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// The top-level exploration configuration parsed from `fabex.toml`.
///
/// Every section is optional; missing sections take their defaults. The value
/// is immutable once loaded and is passed by reference to every operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExploreConfig {
    /// Locations of templates, scratch space, tools and benchmarks.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Options passed to the routability evaluator.
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    /// Demand-multiplier search settings.
    #[serde(default)]
    pub calibration: CalibrationConfig,
    /// Per-point exploration settings.
    #[serde(default)]
    pub explore: ExploreSettings,
    /// Placement and routing reference settings.
    #[serde(default)]
    pub router: RouterConfig,
    /// Ordering comparison settings.
    #[serde(default)]
    pub compare: CompareConfig,
}

/// Filesystem locations. Relative paths are resolved against the directory
/// holding `fabex.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the base architecture templates.
    pub arch_base: PathBuf,
    /// Scratch directory for staged architectures and tool runs.
    pub work_dir: PathBuf,
    /// The routability evaluator executable.
    pub evaluator: PathBuf,
    /// The placement and routing executable, used for `.blif` benchmarks.
    pub router: PathBuf,
    /// The full-flow script, used for `.v` benchmarks.
    pub flow_script: PathBuf,
    /// Root directory of the benchmark circuits.
    pub benchmarks: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            arch_base: PathBuf::from("arch"),
            work_dir: PathBuf::from("work"),
            evaluator: PathBuf::from("wotan"),
            router: PathBuf::from("vpr"),
            flow_script: PathBuf::from("run_vtr_flow.py"),
            benchmarks: PathBuf::from("benchmarks"),
        }
    }
}

/// Fixed options passed to every evaluator invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Evaluator-internal thread count (`-threads`).
    pub threads: u32,
    /// Maximum connection length (`-max_connection_length`).
    pub max_connection_length: u32,
    /// Suppress the evaluator's display (`-nodisp`).
    pub nodisp: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            max_connection_length: 2,
            nodisp: true,
        }
    }
}

/// Which evaluator metric the demand search tracks.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CalibrationMode {
    /// Track the routability metric, which falls as demand rises (default).
    #[default]
    RoutabilityMetric,
    /// Track normalized demand, which rises with the demand multiplier.
    NormalizedDemand,
}

impl CalibrationMode {
    /// Returns `true` if the tracked metric increases with the tuned parameter.
    pub fn increasing(self) -> bool {
        matches!(self, Self::NormalizedDemand)
    }

    /// Default target value for the tracked metric.
    pub fn default_target(self) -> f64 {
        match self {
            Self::RoutabilityMetric => 0.3,
            Self::NormalizedDemand => 0.8,
        }
    }

    /// Default convergence tolerance.
    pub fn default_tolerance(self) -> f64 {
        match self {
            Self::RoutabilityMetric => 0.02,
            Self::NormalizedDemand => 0.01,
        }
    }

    /// Default pattern that extracts the tracked metric from evaluator output.
    pub fn default_pattern(self) -> &'static str {
        match self {
            Self::RoutabilityMetric => r"Routability metric: (\d+\.*\d*)",
            Self::NormalizedDemand => r"Normalized demand: (\d+\.\d+)",
        }
    }
}

impl std::fmt::Display for CalibrationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::RoutabilityMetric => "routability-metric",
            Self::NormalizedDemand => "normalized-demand",
        })
    }
}

/// Pattern extracting the demand multiplier used as a point's score.
pub const DEFAULT_SCORE_PATTERN: &str = r"Demand multiplier: (\d*\.*\d+)";

/// Demand-multiplier search settings.
///
/// `target`, `tolerance` and `pattern` fall back to the mode's defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Tracked metric.
    pub mode: CalibrationMode,
    /// Target value for the tracked metric.
    pub target: Option<f64>,
    /// Convergence tolerance.
    pub tolerance: Option<f64>,
    /// Regex with one capture group extracting the tracked metric.
    pub pattern: Option<String>,
    /// Lower bound of the demand multiplier bracket.
    pub low: f64,
    /// Upper bound of the demand multiplier bracket.
    pub high: f64,
    /// Maximum evaluator invocations per search.
    pub max_iters: u32,
    /// Regex with one capture group extracting the score.
    pub score_pattern: String,
    /// Evaluate once at this demand instead of searching.
    pub fixed_demand: Option<f64>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            mode: CalibrationMode::default(),
            target: None,
            tolerance: None,
            pattern: None,
            low: 0.0,
            high: 10.0,
            max_iters: 30,
            score_pattern: DEFAULT_SCORE_PATTERN.to_string(),
            fixed_demand: None,
        }
    }
}

/// A value that differs between 4-LUT and 6-LUT architectures.
#[derive(Debug, Clone, Deserialize)]
pub struct PerLut<T> {
    /// Value for 4-LUT architectures.
    pub k4: T,
    /// Value for 6-LUT architectures.
    pub k6: T,
}

impl<T> PerLut<T> {
    /// Returns the value for a LUT size.
    pub fn get(&self, lut_size: LutSize) -> &T {
        match lut_size {
            LutSize::K4 => &self.k4,
            LutSize::K6 => &self.k6,
        }
    }
}

/// Per-point exploration settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExploreSettings {
    /// Number of points evaluated concurrently.
    pub workers: usize,
    /// Stride between global-wire switchpoints and populated connection blocks.
    pub via_repeat: u32,
    /// Channel widths at which each point is evaluated; scores are geomeaned.
    pub channel_widths: Vec<u32>,
    /// Benchmark used to dump the routing-resource graph, relative to `paths.benchmarks`.
    pub probe_benchmark: PerLut<String>,
}

impl Default for ExploreSettings {
    fn default() -> Self {
        Self {
            workers: 1,
            via_repeat: fabex_arch::DEFAULT_VIA_REPEAT,
            channel_widths: vec![100],
            probe_benchmark: PerLut {
                k4: "4LUT_DSP_vtr_benchmarks_blif/sha.pre-vpr.blif".to_string(),
                k6: "6LUT_vtr_benchmarks_blif/sha.pre-vpr.blif".to_string(),
            },
        }
    }
}

const REFERENCE_BENCHMARKS: [&str; 8] = [
    "bgm",
    "blob_merge",
    "boundtop",
    "or1200",
    "raygentop",
    "sha",
    "stereovision0",
    "stereovision1",
];

fn reference_benchmarks(dir: &str) -> Vec<String> {
    REFERENCE_BENCHMARKS
        .iter()
        .map(|name| format!("{dir}/{name}.pre-vpr.blif"))
        .collect()
}

/// Placement and routing reference settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Number of benchmarks routed concurrently for one point.
    pub threads: usize,
    /// Placement seeds; results are averaged over seeds.
    pub seeds: Vec<u64>,
    /// Benchmarks per LUT size, relative to `paths.benchmarks`.
    ///
    /// Each entry accepts a single string or a list of strings.
    #[serde(deserialize_with = "deserialize_per_lut_list")]
    pub benchmarks: PerLut<Vec<String>>,
    /// Channel width recorded for a benchmark that fails to route.
    pub penalty: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            threads: 3,
            seeds: vec![0, 1, 2],
            benchmarks: PerLut {
                k4: reference_benchmarks("4LUT_DSP_vtr_benchmarks_blif"),
                k6: reference_benchmarks("6LUT_vtr_benchmarks_blif"),
            },
            penalty: 1000.0,
        }
    }
}

/// Ordering comparison settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Reference-score difference within which a disagreement still counts.
    pub tolerance: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self { tolerance: 2.0 }
    }
}

fn deserialize_per_lut_list<'de, D>(deserializer: D) -> Result<PerLut<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Raw {
        #[serde(deserialize_with = "deserialize_string_or_vec")]
        k4: Vec<String>,
        #[serde(deserialize_with = "deserialize_string_or_vec")]
        k6: Vec<String>,
    }

    let raw = Raw::deserialize(deserializer)?;
    Ok(PerLut {
        k4: raw.k4,
        k6: raw.k6,
    })
}

/// Deserializes a field that can be either a single string or a list of strings.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn calibration_mode_variants() {
        for (input, expected) in [
            ("routability-metric", CalibrationMode::RoutabilityMetric),
            ("normalized-demand", CalibrationMode::NormalizedDemand),
        ] {
            let toml = format!("[calibration]\nmode = \"{input}\"\n");
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.calibration.mode, expected);
            assert_eq!(expected.to_string(), input);
        }
    }

    #[test]
    fn mode_defaults() {
        assert!(CalibrationMode::NormalizedDemand.increasing());
        assert!(!CalibrationMode::RoutabilityMetric.increasing());
        assert_eq!(CalibrationMode::NormalizedDemand.default_target(), 0.8);
        assert_eq!(CalibrationMode::RoutabilityMetric.default_tolerance(), 0.02);
    }

    #[test]
    fn per_lut_lookup() {
        let config = load_config_from_str("").unwrap();
        assert!(config
            .explore
            .probe_benchmark
            .get(LutSize::K4)
            .starts_with("4LUT_DSP"));
        assert_eq!(config.router.benchmarks.get(LutSize::K6).len(), 8);
    }

    #[test]
    fn router_benchmarks_single_string() {
        let toml = r#"
[router.benchmarks]
k4 = "4lut/sha.blif"
k6 = ["6lut/sha.blif", "6lut/bgm.blif"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.router.benchmarks.k4, vec!["4lut/sha.blif"]);
        assert_eq!(config.router.benchmarks.k6.len(), 2);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = load_config_from_str("[calibration]\nmode = \"bisect\"\n").unwrap_err();
        assert!(matches!(err, crate::ConfigError::ParseError(_)));
    }
}
