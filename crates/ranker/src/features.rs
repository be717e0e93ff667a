use chrono::{DateTime, Utc};

use kairos_core::{Task, TaskCategory, TaskPriority};

/// Inputs a scorer sees for one task, captured at a single ranking instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreFeatures {
    /// Whole days until the due date, truncated toward zero. Negative when overdue.
    pub days_until_due: Option<i64>,
    pub estimated_minutes: u32,
    pub difficulty: u8,
    pub category: TaskCategory,
    pub declared_priority: TaskPriority,
}

impl ScoreFeatures {
    pub fn from_task(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            days_until_due: task.due_date.map(|due| (due - now).num_days()),
            estimated_minutes: task.estimated_minutes,
            difficulty: task.difficulty,
            category: task.category,
            declared_priority: task.priority,
        }
    }

    /// Due within `days` days. Overdue tasks count as due.
    pub fn due_within(&self, days: i64) -> bool {
        self.days_until_due.is_some_and(|d| d <= days)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use kairos_core::TaskInput;

    use super::*;

    fn task_due(offset: Option<Duration>, now: DateTime<Utc>) -> Task {
        let mut input = TaskInput::new("Feature probe");
        input.due_date = offset.map(|o| now + o);
        Task::from_input(input, None, now)
    }

    #[test]
    fn days_truncate_toward_zero() {
        let now = Utc::now();
        let f = ScoreFeatures::from_task(&task_due(Some(Duration::hours(47)), now), now);
        assert_eq!(f.days_until_due, Some(1));

        let f = ScoreFeatures::from_task(&task_due(Some(Duration::hours(-30)), now), now);
        assert_eq!(f.days_until_due, Some(-1));

        let f = ScoreFeatures::from_task(&task_due(Some(Duration::hours(5)), now), now);
        assert_eq!(f.days_until_due, Some(0));
    }

    #[test]
    fn missing_due_date_is_never_due() {
        let now = Utc::now();
        let f = ScoreFeatures::from_task(&task_due(None, now), now);
        assert_eq!(f.days_until_due, None);
        assert!(!f.due_within(10_000));
    }

    #[test]
    fn overdue_counts_as_due_within() {
        let now = Utc::now();
        let f = ScoreFeatures::from_task(&task_due(Some(Duration::days(-3)), now), now);
        assert!(f.due_within(5));
        assert!(f.due_within(0));
    }
}
