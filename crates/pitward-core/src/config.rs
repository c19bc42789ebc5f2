use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// How long the archival engine idles when no pit is eligible (seconds).
pub const DEFAULT_IDLE_BACKOFF_SECS: u64 = 60;
/// How long the archival engine holds off after a store or transport failure (seconds).
pub const DEFAULT_RETRY_BACKOFF_SECS: u64 = 30;

/// Top-level config (pitward.toml + PITWARD_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitwardConfig {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub archival: ArchivalConfig,
}

/// Discord-side identifiers the archival subsystem acts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token. REST-only access is enough — no gateway connection is opened.
    pub token: String,
    /// Guild hosting the pits. Doubles as the @everyone role id.
    pub guild_id: u64,
    /// Category active pit channels live under.
    pub pit_category_id: u64,
    /// Category archived pit channels are moved into.
    pub archive_category_id: u64,
    /// Role that keeps visibility on archived pits.
    pub counselors_role_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Archival engine pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivalConfig {
    /// Sleep between selection passes while no pit is eligible.
    #[serde(default = "default_idle_backoff")]
    pub idle_backoff_secs: u64,
    /// Sleep before re-selecting after a failed pass.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: u64,
}

impl Default for ArchivalConfig {
    fn default() -> Self {
        Self {
            idle_backoff_secs: default_idle_backoff(),
            retry_backoff_secs: default_retry_backoff(),
        }
    }
}

impl PitwardConfig {
    /// Load config from `config_path`, falling back to `~/.pitward/pitward.toml`,
    /// with `PITWARD_*` environment overrides applied on top.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: PitwardConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("PITWARD_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.pitward/pitward.toml", home)
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.pitward/pitward.db", home)
}

fn default_idle_backoff() -> u64 {
    DEFAULT_IDLE_BACKOFF_SECS
}

fn default_retry_backoff() -> u64 {
    DEFAULT_RETRY_BACKOFF_SECS
}
