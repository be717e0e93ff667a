use async_trait::async_trait;

use crate::features::ScoreFeatures;
use crate::score::{PriorityScore, ScorerFault};
use crate::scorer::Scorer;

/// Scores a task by the priority it was declared with.
/// Ranking then reduces to sorting by declared priority and due date.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityScorer;

#[async_trait]
impl Scorer for PriorityScorer {
    fn name(&self) -> &str {
        "priority"
    }

    async fn score(&self, features: &ScoreFeatures) -> Result<PriorityScore, ScorerFault> {
        Ok(PriorityScore::from_priority(features.declared_priority))
    }
}
