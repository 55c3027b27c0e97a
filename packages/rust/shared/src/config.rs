//! Application configuration for LeadScout.
//!
//! User config lives at `~/.leadscout/leadscout.toml`.
//! The agent base URL may be overridden via the `LEADSCOUT_AGENT_URL`
//! environment variable; CLI flags override both.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LeadScoutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "leadscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".leadscout";

/// Environment variable overriding the configured agent base URL.
pub const AGENT_URL_ENV: &str = "LEADSCOUT_AGENT_URL";

// ---------------------------------------------------------------------------
// Config structs (matching leadscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote agent settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Pipeline behavior.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// `[agent]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the remote agent service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for the extraction call (seconds).
    #[serde(default = "default_extract_timeout")]
    pub extract_timeout_secs: u64,

    /// Timeout for the enrichment and bulk-synthesis calls (seconds).
    /// These run multi-source lookups per record and legitimately take
    /// minutes — the short extract timeout must not be applied to them.
    #[serde(default = "default_enrich_timeout")]
    pub enrich_timeout_secs: u64,

    /// Timeout for a single-record strategy call (seconds).
    #[serde(default = "default_strategy_timeout")]
    pub strategy_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            extract_timeout_secs: default_extract_timeout(),
            enrich_timeout_secs: default_enrich_timeout(),
            strategy_timeout_secs: default_strategy_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_extract_timeout() -> u64 {
    60
}
fn default_enrich_timeout() -> u64 {
    600
}
fn default_strategy_timeout() -> u64 {
    120
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Whether the bulk-synthesis stage makes a network call. When false the
    /// pipeline still transitions through the stage so observers see a
    /// consistent three-stage sequence.
    #[serde(default)]
    pub bulk_synthesis: bool,

    /// Minimum time a completed stage is held before auto-advancing, in ms.
    /// Purely an observability affordance; 0 disables the pause.
    #[serde(default = "default_stage_dwell_ms")]
    pub stage_dwell_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bulk_synthesis: false,
            stage_dwell_ms: default_stage_dwell_ms(),
        }
    }
}

fn default_stage_dwell_ms() -> u64 {
    500
}

// ---------------------------------------------------------------------------
// Gateway config (runtime, merged from config + environment)
// ---------------------------------------------------------------------------

/// Runtime gateway configuration — config file merged with the
/// `LEADSCOUT_AGENT_URL` environment override.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the remote agent service.
    pub base_url: String,
    /// Extraction timeout (seconds).
    pub extract_timeout_secs: u64,
    /// Enrichment / bulk-synthesis timeout (seconds).
    pub enrich_timeout_secs: u64,
    /// Single-record strategy timeout (seconds).
    pub strategy_timeout_secs: u64,
}

impl From<&AppConfig> for GatewayConfig {
    fn from(config: &AppConfig) -> Self {
        let base_url = std::env::var(AGENT_URL_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| config.agent.base_url.clone());

        Self {
            base_url,
            extract_timeout_secs: config.agent.extract_timeout_secs,
            enrich_timeout_secs: config.agent.enrich_timeout_secs,
            strategy_timeout_secs: config.agent.strategy_timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.leadscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LeadScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.leadscout/leadscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LeadScoutError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LeadScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LeadScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LeadScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LeadScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the resolved agent base URL parses as an absolute HTTP(S) URL.
pub fn validate_agent_url(gateway: &GatewayConfig) -> Result<()> {
    let parsed = url::Url::parse(&gateway.base_url).map_err(|e| {
        LeadScoutError::config(format!("invalid agent URL '{}': {e}", gateway.base_url))
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(LeadScoutError::config(format!(
            "agent URL must be http or https, got '{other}'"
        ))),
    }
}
