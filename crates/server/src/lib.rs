//! Kairos HTTP surface: axum router, handlers, startup and CLI.

pub mod api;
pub mod app_config;
pub mod cli;
pub mod extract;
pub mod router;
pub mod startup;
pub mod state;

pub use router::build_router;
pub use startup::build_app_state;
pub use state::AppState;
