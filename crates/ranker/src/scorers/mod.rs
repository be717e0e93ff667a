pub mod priority;
pub mod rule;
pub mod trained;

use std::sync::Arc;

use kairos_core::config::ScorerConfig;

use crate::score::ScorerFault;
use crate::scorer::Scorer;

pub use priority::PriorityScorer;
pub use rule::RuleScorer;
pub use trained::TrainedScorer;

/// Create the scorer named by `SCORER`.
///
/// `model` fails when the artifact cannot be loaded; the caller decides
/// whether to fall back to [`RuleScorer`].
pub fn create_scorer(config: &ScorerConfig) -> Result<Arc<dyn Scorer>, ScorerFault> {
    match config.kind.trim().to_lowercase().as_str() {
        "" | "rule" | "rules" => Ok(Arc::new(RuleScorer::new())),
        "priority" => Ok(Arc::new(PriorityScorer)),
        "model" | "trained" => {
            let path = config
                .model_path
                .as_ref()
                .ok_or_else(|| ScorerFault::ModelMissing("MODEL_PATH not set".into()))?;
            Ok(Arc::new(TrainedScorer::load(path)?))
        }
        other => Err(ScorerFault::Unavailable(format!("unknown scorer: '{}'", other))),
    }
}
