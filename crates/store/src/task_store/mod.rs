//! [`TaskStore`]: in-memory task repository with per-record write locks.
//!
//! Every record sits behind its own mutex. Reads and in-place updates only take
//! the map lock shared, so patches to different tasks proceed in parallel while
//! patches to the same task are serialized. Insert and delete take the map lock
//! exclusively. Everything handed out is a clone; callers can never reach the
//! stored value.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use kairos_core::{Result, Task, TaskInput, TaskPatch, TaskPriority, TaskStatus};

use crate::snapshot::{load_records, save_records};

#[derive(Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<Uuid, Arc<Mutex<Task>>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new task. Assigns a fresh id and timestamps.
    pub fn create(&self, input: TaskInput, owner_id: Option<Uuid>) -> Task {
        let task = Task::from_input(input, owner_id, Utc::now());
        self.tasks
            .write()
            .insert(task.id, Arc::new(Mutex::new(task.clone())));
        info!("Added task '{}' ({})", task.title, task.id);
        task
    }

    /// List tasks, optionally restricted to one owner, oldest first.
    pub fn list(&self, owner_id: Option<Uuid>) -> Vec<Task> {
        let map = self.tasks.read();
        let mut tasks: Vec<Task> = map
            .values()
            .map(|entry| entry.lock().clone())
            .filter(|t| owner_id.is_none() || t.owner_id == owner_id)
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        tasks
    }

    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().get(&id).map(|entry| entry.lock().clone())
    }

    /// Apply a partial update and bump `updated_at`. Returns `None` for unknown ids.
    pub fn update(&self, id: Uuid, patch: TaskPatch, status: Option<TaskStatus>) -> Option<Task> {
        let map = self.tasks.read();
        let entry = map.get(&id)?;
        let mut task = entry.lock();
        task.apply_patch(patch, status, Utc::now());
        info!("Updated task '{}'", id);
        Some(task.clone())
    }

    /// Overwrite only the priority, and only while the stored owner still
    /// matches `expected_owner`. Used by the ranker; last writer wins.
    pub fn set_priority(&self, id: Uuid, expected_owner: Option<Uuid>, priority: TaskPriority) -> Option<Task> {
        let map = self.tasks.read();
        let entry = map.get(&id)?;
        let mut task = entry.lock();
        if task.owner_id != expected_owner {
            return None;
        }
        if task.priority != priority {
            debug!("Task '{}' priority {} -> {}", id, task.priority, priority);
            task.priority = priority;
            task.updated_at = Utc::now();
        }
        Some(task.clone())
    }

    pub fn delete(&self, id: Uuid) -> bool {
        let removed = self.tasks.write().remove(&id).is_some();
        if removed {
            info!("Deleted task '{}'", id);
        }
        removed
    }

    /// Remove every task owned by `owner_id`. Returns how many were removed.
    pub fn delete_owned_by(&self, owner_id: Uuid) -> usize {
        let mut map = self.tasks.write();
        let before = map.len();
        map.retain(|_, entry| entry.lock().owner_id != Some(owner_id));
        before - map.len()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Snapshots ─────────────────────────────────────────────────

    pub fn snapshot(&self) -> Vec<Task> {
        self.list(None)
    }

    /// Replace the whole store with `records`.
    pub fn restore(&self, records: Vec<Task>) {
        let map = records
            .into_iter()
            .map(|t| (t.id, Arc::new(Mutex::new(t))))
            .collect();
        *self.tasks.write() = map;
    }

    pub fn load_from(&self, path: &Path) -> Result<usize> {
        let records: Vec<Task> = load_records(path)?;
        let count = records.len();
        self.restore(records);
        info!("Loaded {} tasks from {}", count, path.display());
        Ok(count)
    }

    pub fn save_to(&self, path: &Path) -> Result<usize> {
        let records = self.snapshot();
        save_records(path, &records)?;
        info!("Saved {} tasks to {}", records.len(), path.display());
        Ok(records.len())
    }
}
