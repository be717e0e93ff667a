pub mod config;
pub mod error;
pub mod task;
pub mod timestamp;
pub mod user;

pub use config::Config;
pub use error::*;
pub use task::*;
pub use user::*;
