//! Sorting scored architectures and measuring how well two orderings agree.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::RankError;

/// One scored architecture.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    /// Position of the point in the input list.
    pub index: usize,
    /// Architecture label.
    pub label: String,
    /// Score; its meaning depends on the producer.
    pub score: f64,
}

impl ScoredPoint {
    /// Creates a scored point.
    pub fn new(index: usize, label: impl Into<String>, score: f64) -> Self {
        Self {
            index,
            label: label.into(),
            score,
        }
    }
}

/// Which end of the score range is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOrder {
    /// Higher scores are better (calibrated demand, routability).
    HigherIsBetter,
    /// Lower scores are better (minimum channel width).
    LowerIsBetter,
}

/// Sorts `points` best first. Ties keep their input order.
pub fn rank(points: &mut [ScoredPoint], order: ScoreOrder) {
    match order {
        ScoreOrder::HigherIsBetter => points.sort_by(|a, b| b.score.total_cmp(&a.score)),
        ScoreOrder::LowerIsBetter => points.sort_by(|a, b| a.score.total_cmp(&b.score)),
    }
}

/// Pairwise agreement between two orderings of the same points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agreement {
    /// Pairs both orderings rank the same way.
    pub agree: usize,
    /// `agree` plus disagreeing pairs whose reference scores are within tolerance.
    pub within_tolerance: usize,
    /// Number of unordered pairs.
    pub total: usize,
}

impl fmt::Display for Agreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} agree ({} within tolerance)",
            self.agree, self.total, self.within_tolerance
        )
    }
}

/// Compares `ordering` against `reference`, both sorted best first.
///
/// Every unordered pair of points is checked: it agrees when the reference
/// also places the first point ahead of the second. A disagreement still
/// counts toward [`Agreement::within_tolerance`] when the two reference scores
/// differ by at most `tolerance`.
pub fn compare_orderings(
    ordering: &[ScoredPoint],
    reference: &[ScoredPoint],
    tolerance: f64,
) -> Result<Agreement, RankError> {
    if ordering.len() != reference.len() {
        return Err(RankError::SizeMismatch {
            left: ordering.len(),
            right: reference.len(),
        });
    }
    let mut seen = HashSet::new();
    for p in ordering {
        if !seen.insert(p.label.as_str()) {
            return Err(RankError::DuplicateLabel(p.label.clone()));
        }
    }
    let mut position = HashMap::with_capacity(reference.len());
    for (i, p) in reference.iter().enumerate() {
        if position.insert(p.label.as_str(), (i, p.score)).is_some() {
            return Err(RankError::DuplicateLabel(p.label.clone()));
        }
    }
    let placed = ordering
        .iter()
        .map(|p| {
            position
                .get(p.label.as_str())
                .copied()
                .ok_or_else(|| RankError::MissingLabel(p.label.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut agreement = Agreement {
        agree: 0,
        within_tolerance: 0,
        total: 0,
    };
    for (i, &(pos_i, score_i)) in placed.iter().enumerate() {
        for (j, &(pos_j, score_j)) in placed.iter().enumerate().skip(i + 1) {
            agreement.total += 1;
            if pos_i < pos_j {
                agreement.agree += 1;
                agreement.within_tolerance += 1;
            } else if (score_i - score_j).abs() <= tolerance {
                agreement.within_tolerance += 1;
            } else {
                tracing::debug!(
                    first = %ordering[i].label,
                    first_score = score_i,
                    second = %ordering[j].label,
                    second_score = score_j,
                    "disagrees with reference"
                );
            }
        }
    }
    Ok(agreement)
}
