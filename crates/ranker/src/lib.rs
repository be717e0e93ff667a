//! Task scoring and schedule ranking.
//!
//! A [`Scorer`] maps one task's features to a [`PriorityScore`]. The
//! [`ScheduleRanker`] scores a whole task set, absorbs scorer faults, writes
//! the resulting priorities back and returns the set in schedule order.

pub mod features;
pub mod ranker;
pub mod score;
pub mod scorer;
pub mod scorers;

pub use features::ScoreFeatures;
pub use ranker::{RankOutcome, ScheduleRanker};
pub use score::{PriorityScore, ScorerFault};
pub use scorer::Scorer;
pub use scorers::{create_scorer, PriorityScorer, RuleScorer, TrainedScorer};
