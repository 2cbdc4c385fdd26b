//! `fabex compare`: agreement between two result files.

use std::path::Path;

use fabex_rank::{compare_orderings, read_ordering, summary, ScoredPoint};

use crate::project::try_load_project;
use crate::{CompareArgs, GlobalArgs};

const DEFAULT_TOLERANCE: f64 = 2.0;

/// Runs the `fabex compare` command.
pub fn run(args: &CompareArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let tolerance = match args.tolerance {
        Some(t) => t,
        None => try_load_project(global)?
            .map(|c| c.compare.tolerance)
            .unwrap_or(DEFAULT_TOLERANCE),
    };
    let ordering = read_result_file(&args.ordering)?;
    let reference = read_result_file(&args.reference)?;
    let agreement = compare_orderings(&ordering, &reference, tolerance)?;
    println!("{}", summary(&agreement, tolerance));
    Ok(0)
}

/// Reads the ranked rows of a result file.
pub fn read_result_file(path: &Path) -> Result<Vec<ScoredPoint>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    read_ordering(&text).map_err(|e| format!("{}: {e}", path.display()).into())
}
