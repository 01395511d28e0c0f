use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub scenarios: ScenarioSourceConfig,
    #[serde(default)]
    pub cards: CardSourceConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("arkham-horror-mcp/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioSourceConfig {
    #[serde(default = "default_list_url")]
    pub list_url: String,
    /// Only anchors whose `href` starts with this prefix count as scenarios.
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,
    /// Class of the element holding the scenario body on a detail page.
    #[serde(default = "default_content_class")]
    pub content_class: String,
}

impl Default for ScenarioSourceConfig {
    fn default() -> Self {
        Self {
            list_url: default_list_url(),
            link_prefix: default_link_prefix(),
            content_class: default_content_class(),
        }
    }
}

fn default_list_url() -> String {
    "https://arkhamcentral.com/index.php/fan-created-content-arkham-horror-lcg/".to_string()
}
fn default_link_prefix() -> String {
    "https://arkhamcentral.com/index.php/".to_string()
}
fn default_content_class() -> String {
    "scenario-content".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CardSourceConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for CardSourceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

fn default_api_url() -> String {
    "https://arkhamdb.com/api/public/cards/".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_min_similarity")]
    pub default_min_similarity: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            default_min_similarity: default_min_similarity(),
        }
    }
}

fn default_max_results() -> usize {
    50
}
fn default_min_similarity() -> f64 {
    0.6
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

/// Load from `path` when given, otherwise use built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.http.timeout_secs == 0 {
        anyhow::bail!("http.timeout_secs must be > 0");
    }

    if config.search.max_results < 1 {
        anyhow::bail!("search.max_results must be >= 1");
    }

    if !(0.0..=1.0).contains(&config.search.default_min_similarity) {
        anyhow::bail!("search.default_min_similarity must be in [0.0, 1.0]");
    }

    if config.scenarios.list_url.trim().is_empty() {
        anyhow::bail!("scenarios.list_url must not be empty");
    }
    if config.cards.api_url.trim().is_empty() {
        anyhow::bail!("cards.api_url must not be empty");
    }

    Ok(())
}
