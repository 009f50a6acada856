use crate::agent::research::DEFAULT_AGENT_SEARCH_RESULTS;
use crate::providers::compatible::DEFAULT_BASE_URL;
use crate::search::brightdata::{DEFAULT_API_URL, DEFAULT_ZONE};
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DEEP_RESEARCH_CONFIG";

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration, loaded from `config.toml`.
///
/// Every section is optional in the file; missing keys take their defaults
/// and environment variables are applied last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from, if any. Computed, not serialized.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

// ── Completion provider ─────────────────────────────────────────

/// OpenAI-compatible completion backend (`[provider]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Bearer token. Overridden by `ZEABUR_API_TOKEN`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL or full `/chat/completions` endpoint.
    #[serde(default = "default_provider_api_url")]
    pub api_url: String,
    /// Model name. Overridden by `ZEABUR_MODEL`.
    #[serde(default = "default_provider_model")]
    pub model: String,
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_api_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_provider_model() -> String {
    "gpt-4o-mini".into()
}

fn default_provider_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_provider_api_url(),
            model: default_provider_model(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

// ── Web search ──────────────────────────────────────────────────

/// BrightData SERP backend (`[search]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Bearer token. Overridden by `BRIGHTDATA_API_TOKEN`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_search_api_url")]
    pub api_url: String,
    /// SERP zone configured in the BrightData account.
    #[serde(default = "default_search_zone")]
    pub zone: String,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_api_url() -> String {
    DEFAULT_API_URL.into()
}

fn default_search_zone() -> String {
    DEFAULT_ZONE.into()
}

fn default_search_timeout_secs() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_search_api_url(),
            zone: default_search_zone(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

// ── Research agent ──────────────────────────────────────────────

/// Research orchestration (`[agent]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Results requested per web search.
    #[serde(default = "default_agent_search_results")]
    pub search_results: usize,
}

fn default_agent_search_results() -> usize {
    DEFAULT_AGENT_SEARCH_RESULTS
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            search_results: default_agent_search_results(),
        }
    }
}

// ── Gateway ─────────────────────────────────────────────────────

/// HTTP gateway (`[gateway]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind host. Overridden by `DEEP_RESEARCH_HOST`.
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Bind port. Overridden by `DEEP_RESEARCH_PORT`.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Browser origins allowed by CORS. Overridden by `CORS_ORIGINS`
    /// (comma separated).
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_gateway_host() -> String {
    "0.0.0.0".into()
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".into(),
        "http://localhost:5173".into(),
    ]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn default_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().join(".deep-research").join("config.toml"))
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    /// Load configuration.
    ///
    /// Lookup order: `path` (must exist), `$DEEP_RESEARCH_CONFIG` (must
    /// exist), `~/.deep-research/config.toml` if present, else defaults.
    /// Environment overrides are applied and the result validated.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| env_value(CONFIG_PATH_ENV).map(PathBuf::from));

        let source = match explicit {
            Some(path) => Some(path),
            None => default_config_path().filter(|path| path.exists()),
        };

        let mut config = match source {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    async fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Apply environment variable overrides. Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = env_value("ZEABUR_API_TOKEN") {
            self.provider.api_key = Some(key);
        }
        if let Some(model) = env_value("ZEABUR_MODEL") {
            self.provider.model = model;
        }

        if let Some(key) = env_value("BRIGHTDATA_API_TOKEN") {
            self.search.api_key = Some(key);
        }

        if let Some(host) = env_value("DEEP_RESEARCH_HOST") {
            self.gateway.host = host;
        }
        if let Some(port) = env_value("DEEP_RESEARCH_PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!("Ignoring invalid DEEP_RESEARCH_PORT value: {port}"),
            }
        }
        if let Some(origins) = env_value("CORS_ORIGINS") {
            self.gateway.cors_origins = parse_origins(&origins);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.model.trim().is_empty() {
            anyhow::bail!("provider.model must not be empty");
        }
        if self.provider.timeout_secs == 0 {
            anyhow::bail!("provider.timeout_secs must be greater than 0");
        }
        if self.search.timeout_secs == 0 {
            anyhow::bail!("search.timeout_secs must be greater than 0");
        }
        if self.agent.search_results == 0 {
            anyhow::bail!("agent.search_results must be greater than 0");
        }
        if self.gateway.host.trim().is_empty() {
            anyhow::bail!("gateway.host must not be empty");
        }
        Ok(())
    }
}
