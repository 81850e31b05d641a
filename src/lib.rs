//! Elevate Matchmaker
//!
//! Startup-ecosystem matchmaking backend with:
//! - a single-table item store (Neo4j-backed) holding Startup and Enabler
//!   profiles split across typed sub-records
//! - reconstruction of typed profiles from unordered sub-records
//! - LLM-driven partnership suggestions with a coverage retry round
//! - a suggestion feed (suggested and saved profiles) over HTTP and CLI

pub mod api;
pub mod entity;
pub mod error;
pub mod feed;
pub mod llm;
pub mod orchestrator;
pub mod store;
pub mod suggestion;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub llm: LlmConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "matchmaker123".into(),
        }
    }
}

/// Matchmaking model configuration (YAML section and runtime value)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    /// Extra attempts after schema-non-conforming output
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-3-5-haiku-20241022".into(),
            api_key: None,
            max_tokens: 4096,
            max_retries: 2,
            timeout_secs: 120,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub server_port: u16,
    pub llm: LlmConfig,
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.parse().ok())
}

impl Config {
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);
        let llm = yaml.llm;

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            server_port: env_parse("SERVER_PORT").unwrap_or(yaml.server.port),
            llm: LlmConfig {
                url: std::env::var("LLM_URL").unwrap_or(llm.url),
                model: std::env::var("LLM_MODEL").unwrap_or(llm.model),
                api_key: std::env::var("LLM_API_KEY")
                    .or_else(|_| std::env::var("ANTHROPIC_API_KEY"))
                    .ok()
                    .filter(|k| !k.is_empty())
                    .or(llm.api_key),
                max_tokens: env_parse("LLM_MAX_TOKENS").unwrap_or(llm.max_tokens),
                max_retries: llm.max_retries,
                timeout_secs: env_parse("LLM_TIMEOUT_SECS").unwrap_or(llm.timeout_secs),
            },
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn store::ItemStore>,
    pub matchmaker: Arc<dyn llm::Matchmaker>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j and build the model adapter
    pub async fn new(config: Config) -> Result<Self> {
        let store = Arc::new(
            store::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        let provider = Arc::new(llm::AnthropicProvider::from_config(&config.llm)?);
        let matchmaker = Arc::new(llm::MatchmakingAdapter::new(
            provider,
            config.llm.max_retries,
        ));

        Ok(Self {
            store,
            matchmaker,
            config: Arc::new(config),
        })
    }

    pub fn orchestrator(&self) -> orchestrator::SuggestionOrchestrator {
        orchestrator::SuggestionOrchestrator::new(self.store.clone(), self.matchmaker.clone())
    }

    pub fn feed(&self) -> feed::SuggestionFeed {
        feed::SuggestionFeed::new(self.store.clone())
    }

    pub fn entities(&self) -> entity::EntityRepository {
        entity::EntityRepository::new(self.store.clone())
    }
}

/// Connect, build the router and serve until the listener closes
pub async fn start_server(config: Config) -> Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let state = AppState::new(config).await?;
    tracing::info!("Connected to item store");

    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
