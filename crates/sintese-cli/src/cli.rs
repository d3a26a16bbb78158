//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Sintese CLI - factual synthesis of Brazilian court case folders.
#[derive(Debug, Parser)]
#[command(name = "sintese")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a case folder and write the report
    Run(RunArgs),

    /// Show or update configuration
    Config(ConfigArgs),
}

/// Arguments of the `run` command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Folder containing the case's page-text documents
    pub folder: PathBuf,

    /// Backend to use (local, google, anthropic, openai, xai);
    /// defaults to the configured default_backend
    pub backend: Option<String>,
}

/// Arguments of the `config` command.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration with credentials masked
    Show,

    /// Set one configuration key
    Set {
        /// One of: default_backend, ollama_host, local_model,
        /// google_key, anthropic_key, openai_key, xai_key,
        /// local_chunk_tokens, cloud_chunk_tokens, chars_per_token
        key: String,
        /// The new value
        value: String,
    },
}
