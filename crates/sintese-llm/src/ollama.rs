//! Local inference backend via the Ollama API.
//!
//! A single blocking call per prompt, no retry: if the local server cannot
//! be reached, local mode is not usable for the run at all, which the
//! pre-flight check surfaces before any chunk is processed.

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Generation timeout; local models on modest hardware are slow
const GENERATE_TIMEOUT: Duration = Duration::from_secs(180);

/// Pre-flight reachability timeout
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Ollama local backend.
pub struct OllamaBackend {
    host: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaBackend {
    /// Create a backend for `model` served at `host`
    /// (e.g. `http://localhost:11434`).
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Check that the server is up and answering.
    pub async fn ping(&self) -> Result<(), LlmError> {
        let url = format!("{}/api/tags", self.host);
        let response = self
            .client
            .get(&url)
            .timeout(PING_TIMEOUT)
            .send()
            .await
            .map_err(|e| LlmError::Server(format!("Ollama unreachable at {}: {e}", self.host)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LlmError::Server(format!(
                "Ollama answered HTTP {}",
                response.status()
            )))
        }
    }

    /// Generate text for one prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.host);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: 0.2,
                num_predict: 2000,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(GENERATE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Server(format!("Ollama request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(LlmError::Server(format!(
                "Ollama answered HTTP {}",
                response.status()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("bad Ollama envelope: {e}")))?;

        let text = parsed.response.trim().to_string();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_construction() {
        let backend = OllamaBackend::new(DEFAULT_HOST, "llama3.1:8b-instruct-q4_K_M");
        assert_eq!(backend.host, DEFAULT_HOST);
        assert_eq!(backend.model, "llama3.1:8b-instruct-q4_K_M");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_server_error() {
        let backend = OllamaBackend::new("http://127.0.0.1:1", "llama3");
        let result = backend.ping().await;
        assert!(matches!(result, Err(LlmError::Server(_))));
    }
}
