//! Configuration management for the CLI.
//!
//! Credentials and endpoints live in `~/.sintese/config.toml`. The file
//! is read-only during a run; `config set` is the only writer.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use sintese_llm::GatewayConfig;
use std::fs;
use std::path::PathBuf;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend used when `run` is given no `--backend`
    #[serde(default = "default_backend")]
    pub default_backend: String,

    /// Ollama endpoint
    #[serde(default)]
    pub ollama_host: String,

    /// Local model identifier
    #[serde(default)]
    pub local_model: String,

    /// Google API key
    #[serde(default)]
    pub google_key: String,

    /// Anthropic API key
    #[serde(default)]
    pub anthropic_key: String,

    /// OpenAI API key
    #[serde(default)]
    pub openai_key: String,

    /// xAI API key
    #[serde(default)]
    pub xai_key: String,

    /// Chunk token budget for the local backend (0 = built-in default)
    #[serde(default)]
    pub local_chunk_tokens: usize,

    /// Chunk token budget for cloud backends (0 = built-in default)
    #[serde(default)]
    pub cloud_chunk_tokens: usize,

    /// Chars-per-token ratio for budget conversion (0 = built-in default)
    #[serde(default)]
    pub chars_per_token: usize,
}

fn default_backend() -> String {
    "local".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_backend: default_backend(),
            ollama_host: String::new(),
            local_model: String::new(),
            google_key: String::new(),
            anthropic_key: String::new(),
            openai_key: String::new(),
            xai_key: String::new(),
            local_chunk_tokens: 0,
            cloud_chunk_tokens: 0,
            chars_per_token: 0,
        }
    }
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".sintese").join("config.toml"))
    }

    /// Load configuration from file or create default.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Set one configuration key by name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_backend" => {
                value
                    .parse::<sintese_llm::BackendId>()
                    .map_err(CliError::InvalidInput)?;
                self.default_backend = value.to_string();
            }
            "ollama_host" => self.ollama_host = value.to_string(),
            "local_model" => self.local_model = value.to_string(),
            "google_key" => self.google_key = value.to_string(),
            "anthropic_key" => self.anthropic_key = value.to_string(),
            "openai_key" => self.openai_key = value.to_string(),
            "xai_key" => self.xai_key = value.to_string(),
            "local_chunk_tokens" => {
                self.local_chunk_tokens = value
                    .parse()
                    .map_err(|_| CliError::InvalidInput(format!("not a number: '{value}'")))?;
            }
            "cloud_chunk_tokens" => {
                self.cloud_chunk_tokens = value
                    .parse()
                    .map_err(|_| CliError::InvalidInput(format!("not a number: '{value}'")))?;
            }
            "chars_per_token" => {
                self.chars_per_token = value
                    .parse()
                    .map_err(|_| CliError::InvalidInput(format!("not a number: '{value}'")))?;
            }
            other => {
                return Err(CliError::InvalidInput(format!(
                    "unknown configuration key '{other}'"
                )))
            }
        }
        Ok(())
    }

    /// The gateway's view of this configuration.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            anthropic_key: self.anthropic_key.clone(),
            openai_key: self.openai_key.clone(),
            google_key: self.google_key.clone(),
            xai_key: self.xai_key.clone(),
            ollama_host: self.ollama_host.clone(),
            local_model: self.local_model.clone(),
        }
    }

    /// Human-readable dump with credentials masked.
    pub fn masked(&self) -> String {
        fn mask(key: &str) -> String {
            if key.is_empty() {
                return "(not set)".to_string();
            }
            // Keep the last four characters, not bytes; keys are not
            // guaranteed to be ASCII
            let skip = key.chars().count().saturating_sub(4);
            let tail: String = key.chars().skip(skip).collect();
            format!("****{tail}")
        }

        format!(
            "default_backend = {}\nollama_host = {}\nlocal_model = {}\n\
             google_key = {}\nanthropic_key = {}\nopenai_key = {}\nxai_key = {}",
            self.default_backend,
            if self.ollama_host.is_empty() {
                "(default)"
            } else {
                &self.ollama_host
            },
            if self.local_model.is_empty() {
                "(default)"
            } else {
                &self.local_model
            },
            mask(&self.google_key),
            mask(&self.anthropic_key),
            mask(&self.openai_key),
            mask(&self.xai_key),
        )
    }
}
