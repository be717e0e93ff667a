//! CLI argument parsing and subcommand dispatch.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use kairos_core::{Config, TaskCategory, TaskPriority};
use kairos_ranker::{ScoreFeatures, Scorer, TrainedScorer};

use crate::router::build_router;
use crate::startup::{build_app_state, persist, select_scorer, shutdown_signal};

/// Kairos task scheduling server.
#[derive(Parser, Debug)]
#[command(name = "kairos-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default).
    Serve,
    /// Load a model artifact and report its shape, or why it is unusable.
    CheckModel {
        path: PathBuf,
    },
    /// Score one feature vector with the configured scorer.
    Score {
        /// Days until due. Omit for a task without a due date.
        #[arg(long, allow_negative_numbers = true)]
        days: Option<i64>,
        #[arg(long, default_value_t = 60)]
        minutes: u32,
        #[arg(long, default_value_t = 3)]
        difficulty: u8,
        #[arg(long, default_value = "work")]
        category: String,
        /// Declared priority, read only by the priority scorer.
        #[arg(long, default_value = "medium")]
        priority: String,
    },
}

pub async fn dispatch(config: &Config, cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::CheckModel { path } => check_model(&path),
        Command::Score {
            days,
            minutes,
            difficulty,
            category,
            priority,
        } => {
            let features = score_features(days, minutes, difficulty, &category, &priority)?;
            score(config, &features).await
        }
    }
}

fn score_features(
    days: Option<i64>,
    minutes: u32,
    difficulty: u8,
    category: &str,
    priority: &str,
) -> anyhow::Result<ScoreFeatures> {
    Ok(ScoreFeatures {
        days_until_due: days,
        estimated_minutes: minutes,
        difficulty,
        category: category.parse::<TaskCategory>()?,
        declared_priority: priority.parse::<TaskPriority>()?,
    })
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    config.log_summary();
    let state = build_app_state(config)?;
    let app = build_router(state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    persist(&state)?;
    info!("Server stopped");
    Ok(())
}

fn check_model(path: &Path) -> anyhow::Result<()> {
    let scorer = TrainedScorer::load(path)?;
    println!("model:      {}", path.display());
    println!("trees:      {}", scorer.tree_count());
    println!("categories: {}", scorer.categories().join(", "));
    Ok(())
}

async fn score(config: &Config, features: &ScoreFeatures) -> anyhow::Result<()> {
    let scorer = select_scorer(&config.scorer);
    let score = tokio::time::timeout(config.scorer.timeout(), scorer.score(features)).await??;
    println!(
        "{} -> {} (class {}, scorer {})",
        describe(features),
        score.to_priority(),
        score.class(),
        scorer.name()
    );
    Ok(())
}

fn describe(f: &ScoreFeatures) -> String {
    let due = f
        .days_until_due
        .map(|d| format!("due in {}d", d))
        .unwrap_or_else(|| "no due date".into());
    format!(
        "{}, {}min, difficulty {}, {}",
        due, f.estimated_minutes, f.difficulty, f.category
    )
}
