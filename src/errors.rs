//! Typed error hierarchy for copysmith.
//!
//! Three top-level enums cover the three subsystems:
//! - `ProviderError` — failures talking to an LLM content provider
//! - `GenerationError` — orchestrator preconditions and stage failures
//! - `StoreError` — session and template persistence failures

use thiserror::Error;

/// Errors from a content provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("No API key configured for {provider} (set {env_var})")]
    MissingApiKey { provider: String, env_var: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Provider rejected the API key")]
    Unauthorized,

    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by the generation orchestrator.
///
/// The first group are precondition errors detected before any remote call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Please log in to generate copy")]
    NotAuthenticated,

    /// Carries the access collaborator's message verbatim.
    #[error("{0}")]
    AccessDenied(String),

    #[error("No content to score")]
    NoContentToScore,

    #[error("Content of type {kind} cannot be restyled")]
    UnsupportedRestyleSource { kind: String },

    #[error("Content item {id} not found")]
    ItemNotFound { id: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generation cancelled")]
    Cancelled,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl GenerationError {
    /// Precondition errors are raised before any provider call is made.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, GenerationError::Provider(_) | GenerationError::Cancelled)
    }
}

/// Errors from the session and template stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Session {id} not found")]
    SessionNotFound { id: String },

    #[error("Template '{name}' not found")]
    TemplateNotFound { name: String },

    #[error("Invalid template name '{name}': use letters, digits, '-' or '_'")]
    InvalidTemplateName { name: String },
}
