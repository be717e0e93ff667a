//! [`Repository`]: the task and user stores owned together, so that removing
//! a user can cascade to the tasks they own.

use std::path::Path;

use tracing::info;
use uuid::Uuid;

use kairos_core::{KairosError, Result};

use crate::task_store::TaskStore;
use crate::user_store::UserStore;

pub const TASKS_FILE: &str = "tasks.json";
pub const USERS_FILE: &str = "users.json";

#[derive(Default)]
pub struct Repository {
    pub tasks: TaskStore,
    pub users: UserStore,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from the snapshots in `data_dir` (missing files are empty).
    pub fn load(data_dir: &Path) -> Result<Self> {
        let repo = Self::new();
        repo.users.load_from(&data_dir.join(USERS_FILE))?;
        repo.tasks.load_from(&data_dir.join(TASKS_FILE))?;
        Ok(repo)
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        self.users.save_to(&data_dir.join(USERS_FILE))?;
        self.tasks.save_to(&data_dir.join(TASKS_FILE))?;
        Ok(())
    }

    /// Delete a user and every task they own. Returns the number of tasks removed.
    pub fn delete_user(&self, user_id: Uuid) -> Result<usize> {
        self.users
            .remove(user_id)
            .ok_or_else(|| KairosError::user_not_found(user_id))?;
        let removed = self.tasks.delete_owned_by(user_id);
        info!("Deleted user '{}' and {} owned tasks", user_id, removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use kairos_core::TaskInput;

    use super::*;

    #[test]
    fn test_delete_user_cascades() {
        let repo = Repository::new();
        let alice = repo.users.insert("alice@example.com", "h".into()).unwrap();
        let bob = repo.users.insert("bob@example.com", "h".into()).unwrap();
        repo.tasks.create(TaskInput::new("Alice task"), Some(alice.id));
        repo.tasks.create(TaskInput::new("Alice task 2"), Some(alice.id));
        let kept = repo.tasks.create(TaskInput::new("Bob task"), Some(bob.id));

        assert_eq!(repo.delete_user(alice.id).unwrap(), 2);
        assert!(repo.users.get(alice.id).is_none());
        assert_eq!(repo.tasks.list(None), vec![kept]);
    }

    #[test]
    fn test_delete_unknown_user() {
        let repo = Repository::new();
        let err = repo.delete_user(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, KairosError::NotFound { kind: "User", .. }));
    }

    #[test]
    fn test_save_and_load_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::new();
        let user = repo.users.insert("p@example.com", "h".into()).unwrap();
        let task = repo.tasks.create(TaskInput::new("Persisted"), Some(user.id));
        repo.save(tmp.path()).unwrap();

        let loaded = Repository::load(tmp.path()).unwrap();
        assert_eq!(loaded.users.get(user.id).unwrap(), user);
        assert_eq!(loaded.tasks.get(task.id).unwrap(), task);
    }

    #[test]
    fn test_load_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::load(tmp.path()).unwrap();
        assert!(repo.tasks.is_empty());
        assert!(repo.users.is_empty());
    }
}
