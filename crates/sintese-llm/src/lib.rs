//! Sintese LLM Backend Layer
//!
//! Uniform invocation contract over the supported model backends: one local
//! Ollama backend and four cloud providers (Google Gemini, Anthropic,
//! OpenAI, xAI).
//!
//! # Architecture
//!
//! The [`Gateway`] owns the transport details of every backend — endpoint,
//! auth header shape, request envelope, timeout — plus the client-side rate
//! limiter for the one backend with a strict free-tier quota, and an
//! explicit bounded [`RetryPolicy`]. Callers see a single contract:
//!
//! ```text
//! generate(prompt) -> reply text | AuthError / RateLimited / Timeout / ServerError / EmptyResponse
//! ```
//!
//! All limiter and retry state is constructed per [`Gateway`], i.e. per
//! pipeline run; there is no process-wide ambient state.

#![warn(missing_docs)]

pub mod cloud;
pub mod gateway;
pub mod limiter;
pub mod ollama;
pub mod retry;

use std::collections::VecDeque;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gateway::{Gateway, GatewayConfig};
pub use limiter::RateLimiter;
pub use ollama::OllamaBackend;
pub use retry::RetryPolicy;

/// Errors that can occur during a backend invocation.
#[derive(Error, Debug)]
pub enum LlmError {
    /// No credential configured for the selected backend. Detected before
    /// any network call is attempted.
    #[error("No API key configured for backend '{0}'")]
    MissingCredential(&'static str),

    /// The backend rejected the configured credential.
    #[error("Backend rejected credential: {0}")]
    Auth(String),

    /// HTTP 429 from the provider, after retries were exhausted.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The request did not complete within the backend's timeout.
    #[error("Request timed out")]
    Timeout,

    /// Transport failure or non-success HTTP status other than 429.
    #[error("Server error: {0}")]
    Server(String),

    /// The backend answered but carried no text.
    #[error("Empty response from backend")]
    EmptyResponse,

    /// The response envelope did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Identifier of one model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendId {
    /// Local inference via Ollama
    Local,
    /// Google Gemini
    Google,
    /// Anthropic Claude
    Anthropic,
    /// OpenAI GPT
    OpenAi,
    /// xAI Grok
    Xai,
}

impl BackendId {
    /// Stable lowercase identifier, as used in configuration and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Local => "local",
            BackendId::Google => "google",
            BackendId::Anthropic => "anthropic",
            BackendId::OpenAi => "openai",
            BackendId::Xai => "xai",
        }
    }

    /// Cloud backends get the larger chunk budget; the local backend a
    /// smaller one to respect smaller context windows.
    pub fn is_cloud(&self) -> bool {
        !matches!(self, BackendId::Local)
    }
}

impl FromStr for BackendId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "ollama" => Ok(BackendId::Local),
            "google" | "gemini" => Ok(BackendId::Google),
            "anthropic" | "claude" => Ok(BackendId::Anthropic),
            "openai" | "gpt" => Ok(BackendId::OpenAi),
            "xai" | "grok" => Ok(BackendId::Xai),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The invocation seam the pipeline depends on.
///
/// [`Gateway`] is the production implementation; [`MockBackend`] the test
/// one. Returned futures are `Send` so callers may run invocations
/// concurrently on the runtime.
pub trait TextGenerator: Send + Sync {
    /// Send one prompt to the backend and return the raw reply text.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Cheap reachability/credential check, run once before any chunk is
    /// processed.
    fn preflight(&self) -> impl Future<Output = Result<(), LlmError>> + Send;
}

/// Deterministic mock backend for tests.
///
/// Replies are scripted in order; once the script is exhausted the default
/// reply is returned. `Err` entries surface as [`LlmError::Server`].
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_reply: String,
    script: Arc<Mutex<VecDeque<Result<String, String>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockBackend {
    /// Create a mock that answers every prompt with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            default_reply: reply.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a successful reply for the next unscripted call.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(reply.into()));
    }

    /// Queue a failure for the next unscripted call.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.into()));
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl TextGenerator for MockBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap() += 1;

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(LlmError::Server(message)),
            None => Ok(self.default_reply.clone()),
        }
    }

    async fn preflight(&self) -> Result<(), LlmError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_id_round_trip() {
        for id in [
            BackendId::Local,
            BackendId::Google,
            BackendId::Anthropic,
            BackendId::OpenAi,
            BackendId::Xai,
        ] {
            assert_eq!(id.as_str().parse::<BackendId>().unwrap(), id);
        }
    }

    #[test]
    fn test_backend_id_aliases_and_unknown() {
        assert_eq!("gemini".parse::<BackendId>().unwrap(), BackendId::Google);
        assert_eq!("OLLAMA".parse::<BackendId>().unwrap(), BackendId::Local);
        assert!("bard".parse::<BackendId>().is_err());
    }

    #[test]
    fn test_only_local_is_not_cloud() {
        assert!(!BackendId::Local.is_cloud());
        assert!(BackendId::Google.is_cloud());
    }

    #[tokio::test]
    async fn test_mock_scripted_then_default() {
        let mock = MockBackend::new("default");
        mock.push_reply("first");
        mock.push_failure("boom");

        assert_eq!(mock.generate("p").await.unwrap(), "first");
        assert!(matches!(
            mock.generate("p").await,
            Err(LlmError::Server(_))
        ));
        assert_eq!(mock.generate("p").await.unwrap(), "default");
        assert_eq!(mock.call_count(), 3);
    }
}
