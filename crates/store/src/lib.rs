//! In-memory persistence for tasks and users.
//!
//! Stores are explicit objects owned by the caller; nothing here is global.
//! Optional JSON snapshots let a server survive restarts.

pub mod repository;
pub mod snapshot;
pub mod task_store;
pub mod user_store;

pub use repository::Repository;
pub use task_store::TaskStore;
pub use user_store::UserStore;
