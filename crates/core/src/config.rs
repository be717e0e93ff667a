use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Signing secret used when `SECRET_KEY` is not set. Fine for local runs only.
pub const DEV_SECRET_KEY: &str = "kairos-dev-secret-change-me";

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_EXPIRE_MINUTES: u64 = 60 * 24 * 365;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub scorer: ScorerConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `KAIROS_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("KAIROS_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            storage: StorageConfig::from_env_profiled(p),
            auth: AuthConfig::from_env_profiled(p),
            scorer: ScorerConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:   {}:{} (cors origin {})", self.server.host, self.server.port, self.server.cors_origin);
        tracing::info!("  storage:  data_dir={}, persist={}", self.storage.data_dir.display(), self.storage.persist);
        tracing::info!(
            "  auth:     token_ttl={}m, secret={}",
            self.auth.token_expire_minutes,
            if self.auth.uses_dev_secret() { "(dev default)" } else { "(set)" }
        );
        tracing::info!(
            "  scorer:   kind={}, model={}, timeout={}ms",
            self.scorer.kind,
            self.scorer.model_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(none)".into()),
            self.scorer.timeout_ms
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            scorer: ScorerConfig::default(),
        }
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            cors_origin: "*".into(),
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Load JSON snapshots at startup and write them back on shutdown.
    pub persist: bool,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            data_dir: PathBuf::from(profiled_env_or(p, "DATA_DIR", "data")),
            persist: profiled_env_bool(p, "PERSIST", false),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            persist: false,
        }
    }
}

// ── Auth ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub secret_key: String,
    pub token_expire_minutes: u64,
    pub min_password_length: usize,
}

impl AuthConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            secret_key: profiled_env_or(p, "SECRET_KEY", DEV_SECRET_KEY),
            token_expire_minutes: profiled_env_u64(p, "TOKEN_EXPIRE_MINUTES", 30),
            min_password_length: profiled_env_u64(p, "MIN_PASSWORD_LENGTH", 8) as usize,
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }

    /// Token lifetime in minutes, capped at [`MAX_TOKEN_EXPIRE_MINUTES`].
    pub fn token_ttl_minutes(&self) -> i64 {
        if self.token_expire_minutes > MAX_TOKEN_EXPIRE_MINUTES {
            tracing::warn!(
                "TOKEN_EXPIRE_MINUTES={} exceeds {}; using the maximum",
                self.token_expire_minutes,
                MAX_TOKEN_EXPIRE_MINUTES
            );
            return MAX_TOKEN_EXPIRE_MINUTES as i64;
        }
        self.token_expire_minutes as i64
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEV_SECRET_KEY.into(),
            token_expire_minutes: 30,
            min_password_length: 8,
        }
    }
}

// ── Scorer ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// "rule", "priority" or "model".
    pub kind: String,
    pub model_path: Option<PathBuf>,
    pub timeout_ms: u64,
}

impl ScorerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            kind: profiled_env_or(p, "SCORER", "rule").to_lowercase(),
            model_path: profiled_env_opt(p, "MODEL_PATH").map(PathBuf::from),
            timeout_ms: profiled_env_u64(p, "SCORER_TIMEOUT_MS", 250),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            kind: "rule".into(),
            model_path: None,
            timeout_ms: 250,
        }
    }
}
