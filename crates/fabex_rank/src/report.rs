//! Tab-separated result files.
//!
//! A result file lists one `index\tlabel\tscore` row per point, best first.
//! When a comparison was run, a blank line and two summary lines follow.

use std::io::{self, Write};

use crate::error::RankError;
use crate::rank::{Agreement, ScoredPoint};

/// Writes ranked rows and, if given, the agreement summary.
pub fn write_results<W: Write>(
    out: &mut W,
    points: &[ScoredPoint],
    comparison: Option<(&Agreement, f64)>,
) -> io::Result<()> {
    for p in points {
        writeln!(out, "{}\t{}\t{}", p.index, p.label, p.score)?;
    }
    if let Some((agreement, tolerance)) = comparison {
        writeln!(out)?;
        writeln!(out, "{}", summary(agreement, tolerance))?;
    }
    Ok(())
}

/// The two summary lines of a comparison, without a trailing newline.
pub fn summary(agreement: &Agreement, tolerance: f64) -> String {
    format!(
        "{}/{} pairwise comparisons agree\n{}/{} cases agree within tolerance of {}",
        agreement.agree,
        agreement.total,
        agreement.within_tolerance,
        agreement.total,
        tolerance
    )
}

/// Parses the ranked rows of a result file, stopping at the first blank line.
///
/// Rows are `index\tlabel\tscore` or `label\tscore`. Two-column rows are
/// numbered by position.
pub fn read_ordering(text: &str) -> Result<Vec<ScoredPoint>, RankError> {
    let mut points = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            break;
        }
        let malformed = |reason: String| RankError::MalformedRow { line: n + 1, reason };
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        let (index, label, score) = match fields.as_slice() {
            [index, label, score] => {
                let index = index
                    .parse()
                    .map_err(|_| malformed(format!("index '{index}' is not a number")))?;
                (index, *label, *score)
            }
            [label, score] => (points.len(), *label, *score),
            _ => {
                return Err(malformed(format!(
                    "expected 2 or 3 tab-separated fields, found {}",
                    fields.len()
                )))
            }
        };
        if label.is_empty() {
            return Err(malformed("empty label".to_string()));
        }
        let score = score
            .parse()
            .map_err(|_| malformed(format!("score '{score}' is not a number")))?;
        points.push(ScoredPoint::new(index, label, score));
    }
    Ok(points)
}
