//! Error type for per-point exploration.

use fabex_arch::ArchError;
use fabex_eval::EvalError;
use fabex_instantiate::InstantiateError;

/// Errors that end the exploration of one point, or of the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum ExploreError {
    /// The point is invalid or has no base template.
    #[error(transparent)]
    Arch(#[from] ArchError),

    /// Materializing the architecture failed.
    #[error(transparent)]
    Instantiate(#[from] InstantiateError),

    /// Routing, evaluation or calibration failed.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// A worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    Pool(String),
}
