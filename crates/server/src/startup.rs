//! Server startup: shared state construction and snapshot persistence.

use std::sync::Arc;

use tracing::{info, warn};

use kairos_auth::AuthService;
use kairos_core::config::ScorerConfig;
use kairos_core::Config;
use kairos_ranker::{create_scorer, RuleScorer, ScheduleRanker, Scorer};
use kairos_store::Repository;

use crate::state::AppState;

/// Pick the configured scorer, falling back to the rule scorer if it cannot be built.
pub fn select_scorer(config: &ScorerConfig) -> Arc<dyn Scorer> {
    match create_scorer(config) {
        Ok(scorer) => {
            info!("Scorer ready: {}", scorer.name());
            scorer
        }
        Err(e) => {
            warn!("Scorer '{}' unavailable: {}; using rule scorer", config.kind, e);
            Arc::new(RuleScorer::new())
        }
    }
}

/// Load snapshots when persistence is on, otherwise start empty.
pub fn load_repository(config: &Config) -> anyhow::Result<Repository> {
    if !config.storage.persist {
        return Ok(Repository::new());
    }
    let repo = Repository::load(&config.storage.data_dir)?;
    info!(
        "Restored {} users and {} tasks from {}",
        repo.users.len(),
        repo.tasks.len(),
        config.storage.data_dir.display()
    );
    Ok(repo)
}

pub fn build_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    if config.auth.uses_dev_secret() {
        warn!("SECRET_KEY not set; signing tokens with the development key");
    }

    let repo = Arc::new(load_repository(config)?);
    let auth = Arc::new(AuthService::from_config(repo.clone(), &config.auth)?);
    let ranker = ScheduleRanker::new(select_scorer(&config.scorer), config.scorer.timeout());

    Ok(Arc::new(AppState {
        config: config.clone(),
        repo,
        auth,
        ranker,
    }))
}

/// Write snapshots if persistence is on.
pub fn persist(state: &AppState) -> anyhow::Result<()> {
    if !state.config.storage.persist {
        return Ok(());
    }
    state.repo.save(&state.config.storage.data_dir)?;
    info!("Snapshots written to {}", state.config.storage.data_dir.display());
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl_c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!("Failed to register SIGTERM handler: {}", e);
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;

    info!("Shutdown signal received");
}
