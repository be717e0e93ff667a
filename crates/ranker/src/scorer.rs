use async_trait::async_trait;

use crate::features::ScoreFeatures;
use crate::score::{PriorityScore, ScorerFault};

/// Capability that turns task features into a priority class.
///
/// Implementations must be stateless and idempotent: the ranker calls them
/// concurrently and may call them again on the same input.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Short identifier reported by the health endpoint and in logs.
    fn name(&self) -> &str;

    async fn score(&self, features: &ScoreFeatures) -> Result<PriorityScore, ScorerFault>;
}
