//! Layered configuration: defaults, optional TOML file, then environment

use crate::context::reasoning::{DEFAULT_CLOSE_TAG, DEFAULT_OPEN_TAG};
use crate::context::CompactionPolicy;
use crate::error::{ChatError, Result};
use crate::llm::OllamaConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prefix for environment overrides, e.g. `CHAT_MEMORY__MEMORY__TOKEN_LIMIT=4000`
pub const ENV_PREFIX: &str = "CHAT_MEMORY";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Conversation memory tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Turns per summarization chunk; also the size gate of the trigger
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// History token estimate above which compaction runs
    #[serde(default = "default_token_limit")]
    pub token_limit: usize,

    /// Deadline for each completion call, none when unset
    #[serde(default)]
    pub completion_timeout_ms: Option<u64>,

    #[serde(default = "default_open_tag")]
    pub reasoning_open_tag: String,

    #[serde(default = "default_close_tag")]
    pub reasoning_close_tag: String,
}

fn default_chunk_size() -> usize { 5 }
fn default_token_limit() -> usize { 8000 }
fn default_open_tag() -> String { DEFAULT_OPEN_TAG.to_string() }
fn default_close_tag() -> String { DEFAULT_CLOSE_TAG.to_string() }

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            token_limit: default_token_limit(),
            completion_timeout_ms: None,
            reasoning_open_tag: default_open_tag(),
            reasoning_close_tag: default_close_tag(),
        }
    }
}

impl MemoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChatError::Configuration(
                "memory.chunk_size must be at least 1".to_string(),
            ));
        }
        if self.reasoning_open_tag.is_empty() || self.reasoning_close_tag.is_empty() {
            return Err(ChatError::Configuration(
                "reasoning tags must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn compaction_policy(&self) -> CompactionPolicy {
        CompactionPolicy {
            chunk_size: self.chunk_size,
            token_limit: self.token_limit,
        }
    }

    pub fn completion_timeout(&self) -> Option<Duration> {
        self.completion_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load from an optional TOML file, then `CHAT_MEMORY__*` environment variables
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&str>, env_prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let config: Config = builder
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.memory.validate()?;
        Ok(config)
    }

    /// Load from a TOML string, used for embedded and test configs
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.memory.validate()?;
        Ok(config)
    }
}
