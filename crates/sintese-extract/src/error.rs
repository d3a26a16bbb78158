//! Error types for the extraction pipeline.

use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Chunk-level failures (rate limit exhausted, malformed reply) are *not*
/// here: they are surfaced as diagnostics and the chunk is skipped.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Backend-level failure that makes the selected backend unusable
    /// (missing/rejected credential, local server unreachable).
    #[error("Backend error: {0}")]
    Backend(#[from] sintese_llm::LlmError),

    /// No input document yielded any extractable text.
    #[error("No extractable text in any input document")]
    NoText,

    /// Invalid pipeline configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}
