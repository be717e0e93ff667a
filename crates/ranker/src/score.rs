use std::time::Duration;

use kairos_core::TaskPriority;

/// Three-class importance produced by a scorer. Higher ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriorityScore {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl PriorityScore {
    /// Substituted for any score the scorer failed to produce.
    pub const FALLBACK: PriorityScore = PriorityScore::Medium;

    pub fn from_class(class: i64) -> Result<Self, ScorerFault> {
        match class {
            0 => Ok(Self::Low),
            1 => Ok(Self::Medium),
            2 => Ok(Self::High),
            other => Err(ScorerFault::InvalidClass(other)),
        }
    }

    pub fn class(self) -> u8 {
        self as u8
    }

    pub fn to_priority(self) -> TaskPriority {
        match self {
            Self::Low => TaskPriority::Low,
            Self::Medium => TaskPriority::Medium,
            Self::High => TaskPriority::High,
        }
    }

    pub fn from_priority(priority: TaskPriority) -> Self {
        match priority {
            TaskPriority::Low => Self::Low,
            TaskPriority::Medium => Self::Medium,
            TaskPriority::High => Self::High,
        }
    }
}

/// Why a scorer could not produce a score. Always absorbed by the ranker.
#[derive(Debug, thiserror::Error)]
pub enum ScorerFault {
    #[error("model artifact missing: {0}")]
    ModelMissing(String),
    #[error("model artifact corrupt: {0}")]
    CorruptModel(String),
    #[error("category '{0}' unknown to the model")]
    UnknownCategory(String),
    #[error("scorer returned class {0}, expected 0, 1 or 2")]
    InvalidClass(i64),
    #[error("scorer timed out after {0:?}")]
    Timeout(Duration),
    #[error("scorer unavailable: {0}")]
    Unavailable(String),
}
