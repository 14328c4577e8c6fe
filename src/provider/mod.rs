//! Content provider seam.
//!
//! The orchestrator talks to LLMs only through [`ContentProvider`]. Each
//! method is one request/response call; none of them retries, and none
//! imposes a timeout. Real implementation: [`HttpContentProvider`]. Test
//! double: `MockProvider` in the orchestrator tests.

pub mod client;
pub mod http;
pub mod parse;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::content::{CopyBody, GeoScore, PromptEvaluation, ScoreData, SeoMetadata};
use crate::errors::ProviderError;
use crate::request::GenerationRequest;

pub use client::{ChatCompletion, LlmClient};
pub use http::HttpContentProvider;

/// Callback a provider uses to report what it is doing.
pub type ProgressFn<'a> = dyn Fn(&str) + Send + Sync + 'a;

/// Which LLM backend serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    DeepSeek,
    OpenAI,
    Grok,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::DeepSeek, ProviderKind::OpenAI, ProviderKind::Grok];

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Grok => "Grok",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "https://api.deepseek.com/v1",
            ProviderKind::OpenAI => "https://api.openai.com/v1",
            ProviderKind::Grok => "https://api.x.ai/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::OpenAI => "gpt-4o",
            ProviderKind::Grok => "grok-3-mini",
        }
    }

    pub fn default_api_key_env(self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Grok => "XAI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::DeepSeek => write!(f, "deepseek"),
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::Grok => write!(f, "grok"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "openai" | "gpt" => Ok(ProviderKind::OpenAI),
            "grok" | "xai" => Ok(ProviderKind::Grok),
            _ => anyhow::bail!(
                "Invalid model provider '{}'. Valid values: deepseek, openai, grok",
                s
            ),
        }
    }
}

/// Copy returned by a generation call, with a GEO score when the provider
/// computed one inline.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyOutput {
    pub content: CopyBody,
    pub geo_score: Option<GeoScore>,
}

impl CopyOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: CopyBody::Text(content.into()),
            geo_score: None,
        }
    }
}

/// Calls the orchestrator makes against an LLM backend.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Primary copy for the request.
    async fn generate_copy(
        &self,
        request: &GenerationRequest,
        progress: &ProgressFn<'_>,
    ) -> Result<CopyOutput, ProviderError>;

    /// One alternative version of `base`. `index` is the zero-based position
    /// in the alternatives loop, used to vary the angle.
    async fn generate_alternative_copy(
        &self,
        request: &GenerationRequest,
        base: &str,
        index: usize,
        progress: &ProgressFn<'_>,
    ) -> Result<CopyOutput, ProviderError>;

    async fn generate_headlines(
        &self,
        request: &GenerationRequest,
        base: &str,
        count: u32,
        progress: &ProgressFn<'_>,
    ) -> Result<Vec<String>, ProviderError>;

    async fn generate_seo_metadata(
        &self,
        request: &GenerationRequest,
        base: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<SeoMetadata, ProviderError>;

    /// Score `text` against `reference` (the user's original input).
    async fn generate_content_scores(
        &self,
        request: &GenerationRequest,
        text: &str,
        reference: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<ScoreData, ProviderError>;

    async fn restyle_copy_with_persona(
        &self,
        request: &GenerationRequest,
        text: &str,
        persona: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<String, ProviderError>;

    async fn humanize_copy(
        &self,
        request: &GenerationRequest,
        text: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<String, ProviderError>;

    async fn generate_geo_score(
        &self,
        request: &GenerationRequest,
        text: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<GeoScore, ProviderError>;

    async fn evaluate_prompt(
        &self,
        request: &GenerationRequest,
        progress: &ProgressFn<'_>,
    ) -> Result<PromptEvaluation, ProviderError>;

    /// Total tokens consumed by this provider so far.
    fn tokens_used(&self) -> u64 {
        0
    }
}
