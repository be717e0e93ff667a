//! Task records and the payloads that create or patch them.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{KairosError, Result};
use crate::timestamp::{deserialize_opt_utc, deserialize_utc};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 120;
pub const DESCRIPTION_MAX_CHARS: usize = 1024;
pub const DIFFICULTY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// How far in the past a due date may be when a task is created or re-dated.
pub fn due_date_grace() -> Duration {
    Duration::days(1)
}

// ── Enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = KairosError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(KairosError::validation(format!("unknown priority '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

/// Fixed domain labels a task is filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    #[default]
    Work,
    Study,
    Health,
    Leisure,
    Home,
    Projects,
    Finance,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 7] = [
        Self::Work,
        Self::Study,
        Self::Health,
        Self::Leisure,
        Self::Home,
        Self::Projects,
        Self::Finance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Study => "study",
            Self::Health => "health",
            Self::Leisure => "leisure",
            Self::Home => "home",
            Self::Projects => "projects",
            Self::Finance => "finance",
        }
    }

    /// Categories whose harder tasks are always urgent.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Health | Self::Finance)
    }

    /// Categories where an approaching deadline bumps the task to medium.
    pub fn is_productive(&self) -> bool {
        matches!(self, Self::Work | Self::Study | Self::Projects)
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskCategory {
    type Err = KairosError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| KairosError::validation(format!("unknown category '{}'", s)))
    }
}

// ── Defaults ──────────────────────────────────────────────────

fn default_difficulty() -> u8 {
    3
}

fn default_estimated_minutes() -> u32 {
    60
}

/// Wraps any present value (including `null`) in `Some`, so a patch can tell
/// "field absent" from "field cleared".
fn deserialize_present<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn deserialize_present_due<'de, D>(deserializer: D) -> std::result::Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_opt_utc(deserializer).map(Some)
}

// ── Task ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Task {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_utc")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default = "default_estimated_minutes")]
    pub estimated_minutes: u32,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_utc")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_utc")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh record from a validated input.
    pub fn from_input(input: TaskInput, owner_id: Option<Uuid>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            category: input.category,
            difficulty: input.difficulty,
            estimated_minutes: input.estimated_minutes,
            priority: input.priority,
            status: input.status,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Identity, owner and creation time never change.
    pub fn apply_patch(&mut self, patch: TaskPatch, status: Option<TaskStatus>, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(minutes) = patch.estimated_minutes {
            self.estimated_minutes = minutes;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = status {
            self.status = status;
        }
        self.updated_at = now;
    }

    /// Field-shape checks that hold for every task, stored or submitted.
    /// The due-date recency rule only applies at creation, see [`TaskInput::validate`].
    pub fn validate_fields(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())?;
        validate_difficulty(self.difficulty)?;
        validate_minutes(self.estimated_minutes)
    }
}

// ── Payloads ──────────────────────────────────────────────────

/// Creation payload.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Deadline for completing the task.
    #[serde(default, deserialize_with = "deserialize_opt_utc")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default = "default_estimated_minutes")]
    pub estimated_minutes: u32,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
}

impl TaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            category: TaskCategory::default(),
            difficulty: default_difficulty(),
            estimated_minutes: default_estimated_minutes(),
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
        }
    }

    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())?;
        validate_due_date(self.due_date, now)?;
        validate_difficulty(self.difficulty)?;
        validate_minutes(self.estimated_minutes)
    }
}

/// Partial update. Absent fields are left untouched; an explicit `null`
/// clears `description` or `due_date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present_due")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub category: Option<TaskCategory>,
    #[serde(default)]
    pub difficulty: Option<u8>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
}

impl TaskPatch {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description.as_deref())?;
        }
        if let Some(due_date) = self.due_date {
            validate_due_date(due_date, now)?;
        }
        if let Some(difficulty) = self.difficulty {
            validate_difficulty(difficulty)?;
        }
        if let Some(minutes) = self.estimated_minutes {
            validate_minutes(minutes)?;
        }
        Ok(())
    }
}

// ── Validation ────────────────────────────────────────────────

fn validate_title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(KairosError::validation(format!(
            "title must be between {} and {} characters (got {})",
            TITLE_MIN_CHARS, TITLE_MAX_CHARS, len
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<()> {
    if let Some(d) = description {
        let len = d.chars().count();
        if len > DESCRIPTION_MAX_CHARS {
            return Err(KairosError::validation(format!(
                "description must be at most {} characters (got {})",
                DESCRIPTION_MAX_CHARS, len
            )));
        }
    }
    Ok(())
}

fn validate_due_date(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<()> {
    match due_date {
        Some(due) if due < now - due_date_grace() => Err(KairosError::validation(
            "due_date cannot be in the distant past",
        )),
        _ => Ok(()),
    }
}

fn validate_difficulty(difficulty: u8) -> Result<()> {
    if !DIFFICULTY_RANGE.contains(&difficulty) {
        return Err(KairosError::validation(format!(
            "difficulty must be between {} and {} (got {})",
            DIFFICULTY_RANGE.start(),
            DIFFICULTY_RANGE.end(),
            difficulty
        )));
    }
    Ok(())
}

fn validate_minutes(minutes: u32) -> Result<()> {
    if minutes == 0 {
        return Err(KairosError::validation("estimated_minutes must be positive"));
    }
    Ok(())
}
