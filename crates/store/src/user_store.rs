//! In-memory user accounts indexed by id and by normalized email.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use kairos_core::{KairosError, Result, User};

use crate::snapshot::{load_records, save_records};

#[derive(Default)]
struct Inner {
    by_id: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct UserStore {
    inner: RwLock<Inner>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new account. `email` must already be normalized.
    pub fn insert(&self, email: &str, password_hash: String) -> Result<User> {
        let mut inner = self.inner.write();
        if inner.by_email.contains_key(email) {
            return Err(KairosError::EmailTaken);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };
        inner.by_email.insert(user.email.clone(), user.id);
        inner.by_id.insert(user.id, user.clone());
        info!("Registered user '{}'", user.id);
        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read();
        inner
            .by_email
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned()
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.inner.read().by_id.get(&id).cloned()
    }

    pub fn remove(&self, id: Uuid) -> Option<User> {
        let mut inner = self.inner.write();
        let user = inner.by_id.remove(&id)?;
        inner.by_email.remove(&user.email);
        Some(user)
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Snapshots ─────────────────────────────────────────────────

    pub fn snapshot(&self) -> Vec<User> {
        let mut users: Vec<User> = self.inner.read().by_id.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        users
    }

    pub fn restore(&self, records: Vec<User>) {
        let mut inner = Inner::default();
        for user in records {
            inner.by_email.insert(user.email.clone(), user.id);
            inner.by_id.insert(user.id, user);
        }
        *self.inner.write() = inner;
    }

    pub fn load_from(&self, path: &Path) -> Result<usize> {
        let records: Vec<User> = load_records(path)?;
        let count = records.len();
        self.restore(records);
        info!("Loaded {} users from {}", count, path.display());
        Ok(count)
    }

    pub fn save_to(&self, path: &Path) -> Result<usize> {
        let records = self.snapshot();
        save_records(path, &records)?;
        info!("Saved {} users to {}", records.len(), path.display());
        Ok(records.len())
    }
}
