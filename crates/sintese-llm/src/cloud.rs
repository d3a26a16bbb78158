//! Cloud provider transports: request envelopes, auth headers, response
//! extraction.
//!
//! Each provider owns its payload shape and timeout; status handling is
//! shared — 401/403 is an auth failure, 429 a rate limit, anything else
//! non-success a server error. OpenAI and xAI speak the same
//! chat-completions envelope and share types.

use crate::LlmError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const GOOGLE_MODEL: &str = "gemini-2.5-flash";
const ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const OPENAI_MODEL: &str = "gpt-4o";
const XAI_MODEL: &str = "grok-beta";

/// Gemini gets a longer timeout; its free tier queues large requests.
const GOOGLE_TIMEOUT: Duration = Duration::from_secs(180);
const CLOUD_TIMEOUT: Duration = Duration::from_secs(120);

fn classify_status(status: reqwest::StatusCode, body: &str) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::Auth(format!("HTTP {status}: {}", truncate(body, 200))),
        429 => LlmError::RateLimited,
        _ => LlmError::Server(format!("HTTP {status}: {}", truncate(body, 200))),
    }
}

fn transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Server(format!("request failed: {e}"))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn non_empty(text: String) -> Result<String, LlmError> {
    let trimmed = text.trim().to_string();
    if trimmed.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(trimmed)
    }
}

// --- Google Gemini -----------------------------------------------------

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

/// One call to the Gemini generateContent API.
pub async fn call_google(
    client: &reqwest::Client,
    key: &str,
    prompt: &str,
) -> Result<String, LlmError> {
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{GOOGLE_MODEL}:generateContent?key={key}"
    );
    let body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "temperature": 0.2,
            "maxOutputTokens": 8000,
            // Nudges the model toward well-formed JSON replies
            "responseMimeType": "application/json",
        },
    });

    let response = client
        .post(&url)
        .json(&body)
        .timeout(GOOGLE_TIMEOUT)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(classify_status(status, &text));
    }

    let parsed: GeminiResponse = response
        .json()
        .await
        .map_err(|e| LlmError::InvalidResponse(format!("bad Gemini envelope: {e}")))?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or(LlmError::EmptyResponse)?;
    non_empty(text)
}

// --- Anthropic ---------------------------------------------------------

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: String,
}

/// One call to the Anthropic messages API.
pub async fn call_anthropic(
    client: &reqwest::Client,
    key: &str,
    prompt: &str,
) -> Result<String, LlmError> {
    let body = json!({
        "model": ANTHROPIC_MODEL,
        "max_tokens": 4000,
        "messages": [{ "role": "user", "content": prompt }],
    });

    let response = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", key)
        .header("anthropic-version", "2023-06-01")
        .json(&body)
        .timeout(CLOUD_TIMEOUT)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(classify_status(status, &text));
    }

    let parsed: AnthropicResponse = response
        .json()
        .await
        .map_err(|e| LlmError::InvalidResponse(format!("bad Anthropic envelope: {e}")))?;

    let text = parsed
        .content
        .into_iter()
        .next()
        .map(|c| c.text)
        .ok_or(LlmError::EmptyResponse)?;
    non_empty(text)
}

// --- OpenAI / xAI (chat-completions envelope) --------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

async fn call_chat_completions(
    client: &reqwest::Client,
    url: &str,
    key: &str,
    model: &str,
    prompt: &str,
) -> Result<String, LlmError> {
    let body = ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        temperature: 0.2,
        max_tokens: 4000,
    };

    let response = client
        .post(url)
        .bearer_auth(key)
        .json(&body)
        .timeout(CLOUD_TIMEOUT)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(classify_status(status, &text));
    }

    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|e| LlmError::InvalidResponse(format!("bad chat envelope: {e}")))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or(LlmError::EmptyResponse)?;
    non_empty(text)
}

/// One call to the OpenAI chat-completions API.
pub async fn call_openai(
    client: &reqwest::Client,
    key: &str,
    prompt: &str,
) -> Result<String, LlmError> {
    call_chat_completions(
        client,
        "https://api.openai.com/v1/chat/completions",
        key,
        OPENAI_MODEL,
        prompt,
    )
    .await
}

/// One call to the xAI chat-completions API.
pub async fn call_xai(
    client: &reqwest::Client,
    key: &str,
    prompt: &str,
) -> Result<String, LlmError> {
    call_chat_completions(
        client,
        "https://api.x.ai/v1/chat/completions",
        key,
        XAI_MODEL,
        prompt,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            classify_status(reqwest::StatusCode::UNAUTHORIZED, "nope"),
            LlmError::Auth(_)
        ));
        assert!(matches!(
            classify_status(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            LlmError::RateLimited
        ));
        assert!(matches!(
            classify_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            LlmError::Server(_)
        ));
    }

    #[test]
    fn test_gemini_envelope_extraction() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.candidates[0].content.parts[0].text.clone();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_chat_envelope_extraction() {
        let raw = r#"{"choices":[{"message":{"content":"hi"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "hi");
    }

    #[test]
    fn test_non_empty_rejects_whitespace() {
        assert!(matches!(
            non_empty("  \n ".to_string()),
            Err(LlmError::EmptyResponse)
        ));
        assert_eq!(non_empty(" ok ".to_string()).unwrap(), "ok");
    }
}
