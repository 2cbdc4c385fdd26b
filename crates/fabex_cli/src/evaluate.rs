//! `fabex evaluate` and `fabex route`: score, rank and record a list of
//! architectures.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fabex_eval::{ProcessEvaluator, ProcessRouter};
use fabex_explore::{Backends, Exploration, Explorer, FailedPoint};
use fabex_instantiate::XmlStarletFactory;
use fabex_rank::{compare_orderings, rank, write_results, Agreement, ScoreOrder, ScoredPoint};

use crate::compare::read_result_file;
use crate::project::{collect_points, load_project};
use crate::{EvaluateArgs, GlobalArgs, RouteArgs};

/// Runs the `fabex evaluate` command.
///
/// Returns exit code 1 when any point failed; the result file still holds
/// every point that succeeded.
pub fn run_evaluate(args: &EvaluateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let points = collect_points(&args.points.labels, args.points.list.as_deref())?;
    let config = load_project(global)?;
    let reference = args
        .reference
        .as_deref()
        .map(read_result_file)
        .transpose()?;

    let evaluator = ProcessEvaluator::new(&config.paths.evaluator, config.evaluator.clone());
    let router = ProcessRouter::new(&config.paths.router, &config.paths.flow_script);
    let editors = XmlStarletFactory::default();
    let explorer = Explorer::new(
        &config,
        Backends {
            editors: &editors,
            evaluator: &evaluator,
            router: &router,
        },
    )?;

    if !global.quiet {
        eprintln!(
            "   Evaluating {} architecture(s) on {} worker(s)",
            points.len(),
            config.explore.workers
        );
    }
    let batch = explorer.evaluate_all(&points)?;
    for result in batch.results.iter().filter(|r| r.too_unroutable()) {
        tracing::warn!(label = %result.label, score = result.score, "too unroutable");
    }

    let Exploration { results, failed } = batch;
    let mut ranked: Vec<ScoredPoint> = results.iter().map(|r| r.to_scored()).collect();
    rank(&mut ranked, ScoreOrder::HigherIsBetter);

    let tolerance = config.compare.tolerance;
    let agreement = reference.and_then(|reference| agreement_with(&ranked, &reference, tolerance));
    write_output(
        &args.points.output,
        &ranked,
        agreement.as_ref().map(|a| (a, tolerance)),
    )?;

    if !global.quiet {
        eprintln!("   Wrote {}", args.points.output.display());
        if let Some(agreement) = &agreement {
            eprintln!("{}", fabex_rank::summary(agreement, tolerance));
        }
    }
    Ok(finish(&failed))
}

/// Runs the `fabex route` command.
pub fn run_route(args: &RouteArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let points = collect_points(&args.points.labels, args.points.list.as_deref())?;
    let config = load_project(global)?;

    let evaluator = ProcessEvaluator::new(&config.paths.evaluator, config.evaluator.clone());
    let router = ProcessRouter::new(&config.paths.router, &config.paths.flow_script);
    let editors = XmlStarletFactory::default();
    let explorer = Explorer::new(
        &config,
        Backends {
            editors: &editors,
            evaluator: &evaluator,
            router: &router,
        },
    )?;

    if !global.quiet {
        eprintln!(
            "   Routing {} architecture(s) over {} seed(s)",
            points.len(),
            config.router.seeds.len()
        );
    }
    let Exploration { mut results, failed } = explorer.route_all(&points)?;
    rank(&mut results, ScoreOrder::LowerIsBetter);
    write_output(&args.points.output, &results, None)?;

    if !global.quiet {
        eprintln!("   Wrote {}", args.points.output.display());
    }
    Ok(finish(&failed))
}

/// Compares against the reference; a mismatch is reported and skipped.
fn agreement_with(
    ranked: &[ScoredPoint],
    reference: &[ScoredPoint],
    tolerance: f64,
) -> Option<Agreement> {
    match compare_orderings(ranked, reference, tolerance) {
        Ok(agreement) => Some(agreement),
        Err(e) => {
            tracing::warn!(error = %e, "comparison skipped");
            None
        }
    }
}

fn write_output(
    path: &Path,
    points: &[ScoredPoint],
    comparison: Option<(&Agreement, f64)>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).map_err(|e| format!("failed to create {}: {e}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_results(&mut out, points, comparison)?;
    out.flush()?;
    Ok(())
}

fn finish(failed: &[FailedPoint]) -> i32 {
    for f in failed {
        eprintln!("error: {} (#{}): {}", f.label, f.index, f.error);
    }
    if failed.is_empty() {
        0
    } else {
        eprintln!("{} architecture(s) failed", failed.len());
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scored(rows: &[(usize, &str, f64)]) -> Vec<ScoredPoint> {
        rows.iter()
            .map(|&(i, l, s)| ScoredPoint::new(i, l, s))
            .collect()
    }

    #[test]
    fn output_includes_summary_after_blank_line() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out/wotan.txt");
        let ranked = scored(&[(1, "b", 7.5), (0, "a", 2.5)]);
        let reference = scored(&[(1, "b", 40.0), (0, "a", 80.0)]);
        let agreement = agreement_with(&ranked, &reference, 2.0).unwrap();
        write_output(&path, &ranked, Some((&agreement, 2.0))).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("1\tb\t7.5\n0\ta\t2.5\n\n"));
        assert!(text.contains("1/1 pairwise comparisons agree"));
    }

    #[test]
    fn mismatched_reference_is_skipped() {
        let ranked = scored(&[(0, "a", 1.0), (1, "b", 2.0)]);
        let reference = scored(&[(0, "a", 1.0)]);
        assert!(agreement_with(&ranked, &reference, 2.0).is_none());
    }

    #[test]
    fn failures_set_exit_code() {
        assert_eq!(finish(&[]), 0);
        let failed = FailedPoint {
            index: 3,
            label: "x".to_string(),
            error: "no base template".to_string(),
        };
        assert_eq!(finish(&[failed]), 1);
    }
}
