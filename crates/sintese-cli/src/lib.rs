//! Sintese CLI library.
//!
//! The thin outer surface of the synthesis pipeline: argument parsing,
//! configuration management, folder ingestion and Markdown report
//! rendering. All extraction semantics live in `sintese-extract`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod ingest;
pub mod report;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
