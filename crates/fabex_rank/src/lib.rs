//! Ranking of scored architectures and agreement between orderings.
//!
//! [`rank`] sorts points best first, [`compare_orderings`] counts how many
//! point pairs two orderings rank the same way, and [`report`] reads and
//! writes the tab-separated result files.

#![warn(missing_docs)]

pub mod error;
pub mod rank;
pub mod report;

pub use error::RankError;
pub use rank::{compare_orderings, rank, Agreement, ScoreOrder, ScoredPoint};
pub use report::{read_ordering, summary, write_results};
