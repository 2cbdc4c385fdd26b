//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ExploreConfig;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE: &str = "fabex.toml";

/// Loads and validates a `fabex.toml` configuration from a project directory.
///
/// Reads `<project_dir>/fabex.toml`, parses it, and validates its values.
pub fn load_config(project_dir: &Path) -> Result<ExploreConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `fabex.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ExploreConfig, ConfigError> {
    let config: ExploreConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}

/// Validates that required fields are present and values are consistent.
pub fn validate_config(config: &ExploreConfig) -> Result<(), ConfigError> {
    let paths = &config.paths;
    for (name, path) in [
        ("paths.arch_base", &paths.arch_base),
        ("paths.work_dir", &paths.work_dir),
        ("paths.evaluator", &paths.evaluator),
        ("paths.router", &paths.router),
        ("paths.flow_script", &paths.flow_script),
        ("paths.benchmarks", &paths.benchmarks),
    ] {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField(name.to_string()));
        }
    }

    if config.evaluator.threads == 0 {
        return Err(invalid("evaluator.threads must be at least 1"));
    }

    let cal = &config.calibration;
    if !(cal.low.is_finite() && cal.high.is_finite()) {
        return Err(invalid("calibration bounds must be finite"));
    }
    if cal.low > cal.high {
        return Err(invalid(format!(
            "calibration.low ({}) is greater than calibration.high ({})",
            cal.low, cal.high
        )));
    }
    if cal.max_iters == 0 {
        return Err(invalid("calibration.max_iters must be at least 1"));
    }
    if let Some(tol) = cal.tolerance {
        if !(tol > 0.0) {
            return Err(invalid(format!(
                "calibration.tolerance must be positive, got {tol}"
            )));
        }
    }
    if let Some(demand) = cal.fixed_demand {
        if !(demand >= 0.0) {
            return Err(invalid(format!(
                "calibration.fixed_demand must be non-negative, got {demand}"
            )));
        }
    }
    if cal.score_pattern.is_empty() {
        return Err(ConfigError::MissingField(
            "calibration.score_pattern".to_string(),
        ));
    }

    let explore = &config.explore;
    if explore.workers == 0 {
        return Err(invalid("explore.workers must be at least 1"));
    }
    if explore.via_repeat == 0 {
        return Err(invalid("explore.via_repeat must be at least 1"));
    }
    if explore.channel_widths.is_empty() {
        return Err(invalid("explore.channel_widths must not be empty"));
    }
    if explore.channel_widths.contains(&0) {
        return Err(invalid("explore.channel_widths must be positive"));
    }

    let router = &config.router;
    if router.threads == 0 {
        return Err(invalid("router.threads must be at least 1"));
    }
    if router.seeds.is_empty() {
        return Err(invalid("router.seeds must not be empty"));
    }

    if !(config.compare.tolerance > 0.0) {
        return Err(invalid(format!(
            "compare.tolerance must be positive, got {}",
            config.compare.tolerance
        )));
    }
    Ok(())
}
