//! The per-point exploration pipeline.
//!
//! For each architecture point an [`Explorer`] materializes the architecture,
//! routes a probe benchmark to dump its routing-resource graph, calibrates
//! the evaluator's demand multiplier at each configured channel width (or
//! evaluates once at a fixed demand), and reduces the per-width scores to one
//! score with a geometric mean. Points run on a bounded worker pool; a point
//! that fails is logged and left out of the results.
//!
//! [`Explorer::route_all`] produces the router-based reference ordering the
//! evaluator's ordering is compared against.

#![warn(missing_docs)]

pub mod error;
pub mod explorer;

pub use error::ExploreError;
pub use explorer::{
    Backends, CalibrationResult, ChannelRun, Exploration, Explorer, FailedPoint,
};
