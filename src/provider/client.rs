//! OpenAI-compatible chat-completions client.
//!
//! DeepSeek, OpenAI and Grok all expose the same `/chat/completions` shape,
//! so one client serves all three; only base URL, model and key differ.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::ProviderKind;
use crate::errors::ProviderError;

/// Result of one chat-completions call.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub content: String,
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: Option<u64>,
}

pub struct LlmClient {
    kind: ProviderKind,
    model: String,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
    max_tokens: u32,
    temperature: Option<f32>,
    client: Client,
    tokens_used: Arc<AtomicU64>,
}

impl LlmClient {
    pub fn new(
        kind: ProviderKind,
        model: String,
        base_url: String,
        api_key: Option<String>,
        api_key_env: String,
    ) -> Self {
        Self {
            kind,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_key_env,
            max_tokens: 4096,
            temperature: None,
            client: Client::new(),
            tokens_used: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Share a token counter with other clients.
    pub fn with_token_counter(mut self, counter: Arc<AtomicU64>) -> Self {
        self.tokens_used = counter;
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tokens_used(&self) -> u64 {
        self.tokens_used.load(Ordering::Relaxed)
    }

    /// Send one system + user exchange. With `json_mode` the provider is
    /// asked to return a JSON object.
    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        json_mode: bool,
    ) -> Result<ChatCompletion, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingApiKey {
                provider: self.kind.display_name().to_string(),
                env_var: self.api_key_env.clone(),
            })?;

        let url = format!("{}/chat/completions", self.base_url);
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": self.max_tokens,
        });
        if let Some(temp) = self.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if json_mode {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        let start = Instant::now();
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ProviderError::RateLimited { retry_after_secs });
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CompletionResponse = resp.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("Missing content".to_string()))?;

        let total_tokens = parsed.usage.and_then(|u| u.total_tokens);
        if let Some(tokens) = total_tokens {
            self.tokens_used.fetch_add(tokens, Ordering::Relaxed);
        }

        tracing::debug!(
            provider = %self.kind,
            model = %self.model,
            latency_ms,
            tokens = total_tokens.unwrap_or(0),
            "chat completion finished"
        );

        Ok(ChatCompletion {
            content,
            total_tokens,
        })
    }
}
