//! External evaluator and router contracts, metric extraction, and demand
//! calibration.
//!
//! The routability evaluator and the placement-and-routing tool are reached
//! through the [`Evaluator`] and [`Router`] traits, each with a process
//! backend. [`calibrate`] runs the bisection search for the demand multiplier
//! that brings the evaluator's tracked metric to its target, and
//! [`ReferenceRouting`] scores architectures with the router itself.

#![warn(missing_docs)]

pub mod calibrate;
pub mod error;
pub mod evaluator;
pub mod metric;
pub mod router;

pub use calibrate::{
    calibrate, Bisection, Calibration, CalibrationOutcome, CalibrationParams, SearchState,
};
pub use error::EvalError;
pub use evaluator::{EvalRequest, Evaluator, ProcessEvaluator};
pub use metric::{geomean, mean, MetricPattern, CHANNEL_WIDTH_PATTERN};
pub use router::{
    probe_rr_graph, BenchmarkKind, ProcessRouter, ReferenceRouting, RouteJob, RouteOutcome,
    Router, RR_GRAPH_FILE,
};
