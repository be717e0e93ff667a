use async_trait::async_trait;

use crate::features::ScoreFeatures;
use crate::score::{PriorityScore, ScorerFault};
use crate::scorer::Scorer;

/// Days-until-due at or below which any task is urgent.
pub const URGENT_WITHIN_DAYS: i64 = 5;
/// Days-until-due at or below which productive work is bumped to medium.
pub const PRODUCTIVE_WITHIN_DAYS: i64 = 15;
/// Minimum difficulty that makes a critical-category task urgent.
pub const CRITICAL_MIN_DIFFICULTY: u8 = 3;

/// Deterministic rules used when no trained model is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleScorer;

impl RuleScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(features: &ScoreFeatures) -> PriorityScore {
        if features.due_within(URGENT_WITHIN_DAYS) {
            return PriorityScore::High;
        }
        if features.category.is_critical() && features.difficulty >= CRITICAL_MIN_DIFFICULTY {
            return PriorityScore::High;
        }
        if features.category.is_productive() && features.due_within(PRODUCTIVE_WITHIN_DAYS) {
            return PriorityScore::Medium;
        }
        PriorityScore::Low
    }
}

#[async_trait]
impl Scorer for RuleScorer {
    fn name(&self) -> &str {
        "rule"
    }

    async fn score(&self, features: &ScoreFeatures) -> Result<PriorityScore, ScorerFault> {
        Ok(Self::evaluate(features))
    }
}
