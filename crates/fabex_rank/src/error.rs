//! Error types for ordering comparison and result file parsing.

/// Errors raised while comparing orderings or reading result files.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// The orderings hold different numbers of points.
    #[error("orderings differ in size ({left} vs {right})")]
    SizeMismatch {
        /// Points in the first ordering.
        left: usize,
        /// Points in the second ordering.
        right: usize,
    },

    /// A point of the first ordering is absent from the second.
    #[error("'{0}' is missing from the reference ordering")]
    MissingLabel(String),

    /// A label appears more than once in one ordering.
    #[error("'{0}' appears more than once in an ordering")]
    DuplicateLabel(String),

    /// A result row could not be parsed.
    #[error("line {line}: {reason}")]
    MalformedRow {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the row.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_size_mismatch() {
        let err = RankError::SizeMismatch { left: 3, right: 2 };
        assert_eq!(err.to_string(), "orderings differ in size (3 vs 2)");
    }

    #[test]
    fn display_malformed_row() {
        let err = RankError::MalformedRow {
            line: 4,
            reason: "score 'abc' is not a number".to_string(),
        };
        assert_eq!(err.to_string(), "line 4: score 'abc' is not a number");
    }
}
