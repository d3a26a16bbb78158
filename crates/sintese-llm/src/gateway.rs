//! The backend gateway: one entry point over all five backends.
//!
//! Owns the HTTP client, the per-run rate limiter for the quota-capped
//! Gemini backend, and the bounded retry loop for rate limits and
//! timeouts. Missing credentials are rejected here, before any network
//! call is made.

use crate::cloud;
use crate::limiter::RateLimiter;
use crate::ollama::{OllamaBackend, DEFAULT_HOST};
use crate::retry::RetryPolicy;
use crate::{BackendId, LlmError, TextGenerator};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Gemini free tier allows 15 requests/minute; stay one under for margin.
const GOOGLE_WINDOW_LIMIT: u32 = 14;
const GOOGLE_WINDOW: Duration = Duration::from_secs(60);
const GOOGLE_MIN_SPACING: Duration = Duration::from_secs(4);

/// Credentials and endpoints for every backend.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// Anthropic API key
    pub anthropic_key: String,
    /// OpenAI API key
    pub openai_key: String,
    /// Google API key
    pub google_key: String,
    /// xAI API key
    pub xai_key: String,
    /// Ollama endpoint, e.g. `http://localhost:11434`
    pub ollama_host: String,
    /// Local model identifier
    pub local_model: String,
}

impl GatewayConfig {
    /// Fill in the built-in local defaults for unset endpoint fields.
    pub fn with_defaults(mut self) -> Self {
        if self.ollama_host.is_empty() {
            self.ollama_host = DEFAULT_HOST.to_string();
        }
        if self.local_model.is_empty() {
            self.local_model = "llama3.1:8b-instruct-q4_K_M".to_string();
        }
        self
    }
}

/// Uniform invocation layer over the configured backend.
///
/// Constructed once per pipeline run; limiter and retry state live and die
/// with it.
pub struct Gateway {
    backend: BackendId,
    config: GatewayConfig,
    client: reqwest::Client,
    ollama: OllamaBackend,
    limiter: Mutex<RateLimiter>,
    retry: RetryPolicy,
}

impl Gateway {
    /// Create a gateway that sends every prompt to `backend`.
    pub fn new(backend: BackendId, config: GatewayConfig) -> Self {
        let config = config.with_defaults();
        let ollama = OllamaBackend::new(&config.ollama_host, &config.local_model);
        Self {
            backend,
            config,
            client: reqwest::Client::new(),
            ollama,
            limiter: Mutex::new(RateLimiter::new(
                GOOGLE_WINDOW_LIMIT,
                GOOGLE_WINDOW,
                GOOGLE_MIN_SPACING,
            )),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The backend this gateway targets.
    pub fn backend(&self) -> BackendId {
        self.backend
    }

    fn credential(&self) -> Result<&str, LlmError> {
        let (key, name) = match self.backend {
            BackendId::Local => return Ok(""),
            BackendId::Google => (&self.config.google_key, "google"),
            BackendId::Anthropic => (&self.config.anthropic_key, "anthropic"),
            BackendId::OpenAi => (&self.config.openai_key, "openai"),
            BackendId::Xai => (&self.config.xai_key, "xai"),
        };
        if key.is_empty() {
            Err(LlmError::MissingCredential(name))
        } else {
            Ok(key)
        }
    }

    /// Wait until the client-side limiter admits the next Gemini request.
    /// All concurrent callers serialize through the same limiter state:
    /// delay computation and slot reservation happen under one lock, so
    /// two callers can never claim the same send slot.
    async fn wait_for_limiter(&self) {
        let delay = {
            let mut limiter = self.limiter.lock().unwrap();
            let now = Instant::now();
            let delay = limiter.delay_before_next(now);
            limiter.record(now + delay);
            delay
        };
        if !delay.is_zero() {
            debug!("rate limiter: waiting {:.0}s", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
    }

    async fn call_once(&self, key: &str, prompt: &str) -> Result<String, LlmError> {
        match self.backend {
            BackendId::Local => self.ollama.generate(prompt).await,
            BackendId::Google => cloud::call_google(&self.client, key, prompt).await,
            BackendId::Anthropic => cloud::call_anthropic(&self.client, key, prompt).await,
            BackendId::OpenAi => cloud::call_openai(&self.client, key, prompt).await,
            BackendId::Xai => cloud::call_xai(&self.client, key, prompt).await,
        }
    }

    async fn generate_inner(&self, prompt: &str) -> Result<String, LlmError> {
        let key = self.credential()?.to_string();

        // Local mode: single call, no retry. Connectivity problems are
        // caught by the pre-flight check before any chunk is processed.
        if self.backend == BackendId::Local {
            return self.ollama.generate(prompt).await;
        }

        let mut rate_limit_attempts = 0;
        let mut timeout_attempts = 0;

        loop {
            if self.backend == BackendId::Google {
                self.wait_for_limiter().await;
            }

            match self.call_once(&key, prompt).await {
                Ok(text) => return Ok(text),
                Err(LlmError::RateLimited) if rate_limit_attempts < self.retry.max_rate_limit_retries => {
                    rate_limit_attempts += 1;
                    warn!(
                        "backend {} rate limited, backing off {:.0}s (attempt {}/{})",
                        self.backend,
                        self.retry.rate_limit_backoff.as_secs_f64(),
                        rate_limit_attempts,
                        self.retry.max_rate_limit_retries
                    );
                    tokio::time::sleep(self.retry.rate_limit_backoff).await;
                    self.limiter.lock().unwrap().reset(Instant::now());
                }
                Err(LlmError::Timeout) if timeout_attempts < self.retry.max_timeout_retries => {
                    timeout_attempts += 1;
                    warn!(
                        "backend {} timed out, retrying (attempt {}/{})",
                        self.backend, timeout_attempts, self.retry.max_timeout_retries
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl TextGenerator for Gateway {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_inner(prompt).await
    }

    async fn preflight(&self) -> Result<(), LlmError> {
        match self.backend {
            BackendId::Local => self.ollama.ping().await,
            _ => self.credential().map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_detected_before_any_call() {
        let gateway = Gateway::new(BackendId::Google, GatewayConfig::default());
        let result = gateway.preflight().await;
        assert!(matches!(result, Err(LlmError::MissingCredential("google"))));

        let result = gateway.generate_inner("prompt").await;
        assert!(matches!(result, Err(LlmError::MissingCredential("google"))));
    }

    #[tokio::test]
    async fn test_cloud_preflight_passes_with_key() {
        let config = GatewayConfig {
            anthropic_key: "sk-test".to_string(),
            ..Default::default()
        };
        let gateway = Gateway::new(BackendId::Anthropic, config);
        assert!(gateway.preflight().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_serialize_through_limiter() {
        use std::sync::Arc;

        let config = GatewayConfig {
            google_key: "k".to_string(),
            ..Default::default()
        };
        let gateway = Arc::new(Gateway::new(BackendId::Google, config));

        let started = tokio::time::Instant::now();
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..3 {
            let gateway = Arc::clone(&gateway);
            tasks.spawn(async move { gateway.wait_for_limiter().await });
        }
        while tasks.join_next().await.is_some() {}

        // Three sends need two minimum-spacing gaps between them; leave
        // a small margin for real-clock drift between lock acquisitions
        let elapsed = started.elapsed();
        assert!(
            elapsed >= GOOGLE_MIN_SPACING * 2 - Duration::from_millis(50),
            "elapsed {elapsed:?}"
        );
    }

    #[test]
    fn test_config_defaults_fill_local_endpoint() {
        let config = GatewayConfig::default().with_defaults();
        assert_eq!(config.ollama_host, DEFAULT_HOST);
        assert!(!config.local_model.is_empty());
    }
}
