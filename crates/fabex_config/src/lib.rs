//! Parsing and validation of `fabex.toml` exploration configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed,
//! immutable [`ExploreConfig`] covering tool paths, evaluator options,
//! calibration, worker pools and the router reference flow.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, validate_config, CONFIG_FILE};
pub use resolve::{resolve_calibration, resolve_paths, ResolvedCalibration};
pub use types::*;
