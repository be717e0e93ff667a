//! [`ScheduleRanker`]: scores a user's tasks and produces a total order.
//!
//! Each call scores every task concurrently, bounded per call by a timeout.
//! Faults never escape: the affected task gets [`PriorityScore::FALLBACK`].
//! Scores are written back as priorities through the task store, then tasks
//! are stably sorted by score (desc), due date (asc, missing last) and
//! estimated minutes (asc).

use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use kairos_core::Task;
use kairos_store::TaskStore;

use crate::features::ScoreFeatures;
use crate::score::{PriorityScore, ScorerFault};
use crate::scorer::Scorer;

/// Result of one ranking call.
#[derive(Debug, Clone, Default)]
pub struct RankOutcome {
    pub tasks: Vec<Task>,
    /// Tasks whose score fell back to medium.
    pub fallbacks: usize,
    /// Tasks whose new priority was written to the store.
    pub persisted: usize,
}

pub struct ScheduleRanker {
    scorer: Arc<dyn Scorer>,
    timeout: Duration,
}

impl ScheduleRanker {
    pub fn new(scorer: Arc<dyn Scorer>, timeout: Duration) -> Self {
        Self { scorer, timeout }
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    pub fn scorer(&self) -> &Arc<dyn Scorer> {
        &self.scorer
    }

    /// Rank at the current instant and return just the ordered tasks.
    pub async fn rank(&self, tasks: Vec<Task>, store: &TaskStore) -> Vec<Task> {
        self.rank_at(tasks, store, Utc::now()).await.tasks
    }

    /// Rank every stored task owned by `owner`.
    pub async fn rank_owner(&self, owner: Uuid, store: &TaskStore) -> RankOutcome {
        let tasks = store.list(Some(owner));
        self.rank_at(tasks, store, Utc::now()).await
    }

    pub async fn rank_at(&self, tasks: Vec<Task>, store: &TaskStore, now: DateTime<Utc>) -> RankOutcome {
        if tasks.is_empty() {
            return RankOutcome::default();
        }

        let features: Vec<ScoreFeatures> = tasks.iter().map(|t| ScoreFeatures::from_task(t, now)).collect();
        let results = join_all(features.iter().map(|f| self.score_bounded(f))).await;

        let mut fallbacks = 0;
        let mut persisted = 0;
        let mut scored: Vec<(PriorityScore, Task)> = Vec::with_capacity(tasks.len());
        for (mut task, result) in tasks.into_iter().zip(results) {
            let score = match result {
                Ok(score) => score,
                Err(fault) => {
                    warn!(
                        "Scorer '{}' failed for task '{}': {}; using {:?}",
                        self.scorer.name(),
                        task.id,
                        fault,
                        PriorityScore::FALLBACK
                    );
                    fallbacks += 1;
                    PriorityScore::FALLBACK
                }
            };
            task.priority = score.to_priority();
            // Records that are gone or owned by someone else are skipped.
            if let Some(stored) = store.set_priority(task.id, task.owner_id, task.priority) {
                task.updated_at = stored.updated_at;
                persisted += 1;
            }
            debug!("Task '{}' scored {:?}", task.id, score);
            scored.push((score, task));
        }

        scored.sort_by_key(|(score, task)| {
            (
                Reverse(*score),
                task.due_date.is_none(),
                task.due_date,
                task.estimated_minutes,
            )
        });

        info!(
            "Ranked {} tasks with scorer '{}' ({} fell back to medium, {} persisted)",
            scored.len(),
            self.scorer.name(),
            fallbacks,
            persisted
        );

        RankOutcome {
            tasks: scored.into_iter().map(|(_, task)| task).collect(),
            fallbacks,
            persisted,
        }
    }

    async fn score_bounded(&self, features: &ScoreFeatures) -> Result<PriorityScore, ScorerFault> {
        match tokio::time::timeout(self.timeout, self.scorer.score(features)).await {
            Ok(result) => result,
            Err(_) => Err(ScorerFault::Timeout(self.timeout)),
        }
    }
}
