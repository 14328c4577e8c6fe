use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::client::LlmClient;
use super::parse::{clean_text, parse_copy, parse_json_payload};
use super::prompts::{self, Prompt};
use super::{ContentProvider, CopyOutput, ProgressFn, ProviderKind};
use crate::content::{GeoScore, PromptEvaluation, ScoreData, SeoMetadata};
use crate::errors::ProviderError;
use crate::request::GenerationRequest;

/// [`ContentProvider`] backed by OpenAI-compatible HTTP endpoints.
///
/// Holds one client per configured backend and routes each call by the
/// request's `model` field. All clients share one token counter.
pub struct HttpContentProvider {
    clients: HashMap<ProviderKind, LlmClient>,
    tokens_used: Arc<AtomicU64>,
}

#[derive(Debug, Deserialize)]
struct HeadlinesPayload {
    #[serde(default)]
    headlines: Vec<String>,
}

impl HttpContentProvider {
    pub fn new(clients: Vec<LlmClient>) -> Self {
        let tokens_used = Arc::new(AtomicU64::new(0));
        let clients = clients
            .into_iter()
            .map(|c| (c.kind(), c.with_token_counter(tokens_used.clone())))
            .collect();
        Self {
            clients,
            tokens_used,
        }
    }

    fn client(&self, kind: ProviderKind) -> Result<&LlmClient, ProviderError> {
        self.clients
            .get(&kind)
            .ok_or_else(|| ProviderError::MissingApiKey {
                provider: kind.display_name().to_string(),
                env_var: kind.default_api_key_env().to_string(),
            })
    }

    async fn send(
        &self,
        request: &GenerationRequest,
        prompt: Prompt,
        json_mode: bool,
        activity: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<String, ProviderError> {
        let client = self.client(request.model)?;
        progress(&format!(
            "{} with {} ({})...",
            activity,
            request.model.display_name(),
            client.model()
        ));
        let completion = client.chat(&prompt.system, &prompt.user, json_mode).await?;
        if let Some(tokens) = completion.total_tokens {
            progress(&format!("{} done ({} tokens)", activity, tokens));
        }
        Ok(completion.content)
    }
}

#[async_trait]
impl ContentProvider for HttpContentProvider {
    async fn generate_copy(
        &self,
        request: &GenerationRequest,
        progress: &ProgressFn<'_>,
    ) -> Result<CopyOutput, ProviderError> {
        let raw = self
            .send(request, prompts::copy_prompt(request), true, "Generating copy", progress)
            .await?;
        let (content, geo_score) = parse_copy(&raw)?;
        Ok(CopyOutput { content, geo_score })
    }

    async fn generate_alternative_copy(
        &self,
        request: &GenerationRequest,
        base: &str,
        index: usize,
        progress: &ProgressFn<'_>,
    ) -> Result<CopyOutput, ProviderError> {
        let raw = self
            .send(
                request,
                prompts::alternative_prompt(request, base, index),
                true,
                "Generating alternative",
                progress,
            )
            .await?;
        let (content, geo_score) = parse_copy(&raw)?;
        Ok(CopyOutput { content, geo_score })
    }

    async fn generate_headlines(
        &self,
        request: &GenerationRequest,
        base: &str,
        count: u32,
        progress: &ProgressFn<'_>,
    ) -> Result<Vec<String>, ProviderError> {
        let raw = self
            .send(
                request,
                prompts::headlines_prompt(request, base, count),
                true,
                "Generating headlines",
                progress,
            )
            .await?;
        let payload: HeadlinesPayload = parse_json_payload(&raw, "headlines")?;
        let headlines: Vec<String> = payload
            .headlines
            .into_iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .take(count as usize)
            .collect();
        if headlines.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "Provider returned no headlines".to_string(),
            ));
        }
        Ok(headlines)
    }

    async fn generate_seo_metadata(
        &self,
        request: &GenerationRequest,
        base: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<SeoMetadata, ProviderError> {
        let raw = self
            .send(
                request,
                prompts::seo_prompt(request, base),
                true,
                "Generating SEO metadata",
                progress,
            )
            .await?;
        parse_json_payload(&raw, "SEO metadata")
    }

    async fn generate_content_scores(
        &self,
        request: &GenerationRequest,
        text: &str,
        reference: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<ScoreData, ProviderError> {
        let raw = self
            .send(
                request,
                prompts::score_prompt(request, text, reference),
                true,
                "Scoring content",
                progress,
            )
            .await?;
        parse_json_payload(&raw, "score")
    }

    async fn restyle_copy_with_persona(
        &self,
        request: &GenerationRequest,
        text: &str,
        persona: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<String, ProviderError> {
        let raw = self
            .send(
                request,
                prompts::restyle_prompt(request, text, persona),
                false,
                &format!("Restyling as {}", persona),
                progress,
            )
            .await?;
        non_empty(clean_text(&raw), "restyled copy")
    }

    async fn humanize_copy(
        &self,
        request: &GenerationRequest,
        text: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<String, ProviderError> {
        let raw = self
            .send(
                request,
                prompts::humanize_prompt(request, text),
                false,
                "Humanizing copy",
                progress,
            )
            .await?;
        non_empty(clean_text(&raw), "humanized copy")
    }

    async fn generate_geo_score(
        &self,
        request: &GenerationRequest,
        text: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<GeoScore, ProviderError> {
        let raw = self
            .send(
                request,
                prompts::geo_prompt(text),
                true,
                "Calculating GEO score",
                progress,
            )
            .await?;
        parse_json_payload(&raw, "GEO score")
    }

    async fn evaluate_prompt(
        &self,
        request: &GenerationRequest,
        progress: &ProgressFn<'_>,
    ) -> Result<PromptEvaluation, ProviderError> {
        let raw = self
            .send(
                request,
                prompts::evaluate_prompt(request),
                true,
                "Evaluating brief",
                progress,
            )
            .await?;
        parse_json_payload(&raw, "evaluation")
    }

    fn tokens_used(&self) -> u64 {
        self.tokens_used.load(Ordering::Relaxed)
    }
}

fn non_empty(text: String, what: &str) -> Result<String, ProviderError> {
    if text.is_empty() {
        Err(ProviderError::InvalidResponse(format!("Provider returned empty {}", what)))
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::CopyBody;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": content } }],
            "usage": { "total_tokens": 10 }
        }))
    }

    fn provider_for(server: &MockServer, kind: ProviderKind) -> HttpContentProvider {
        HttpContentProvider::new(vec![LlmClient::new(
            kind,
            kind.default_model().to_string(),
            server.uri(),
            Some("sk-test".to_string()),
            kind.default_api_key_env().to_string(),
        )])
    }

    fn request(kind: ProviderKind) -> GenerationRequest {
        GenerationRequest {
            input_text: "Neighbourhood coffee roaster".into(),
            model: kind,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generate_copy_parses_json_and_reports_progress() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion(r#"{"content": "Roasted this week, brewed today."}"#))
            .mount(&server)
            .await;

        let provider = provider_for(&server, ProviderKind::Grok);
        let log = Mutex::new(Vec::new());
        let progress = |m: &str| log.lock().unwrap().push(m.to_string());

        let output = provider
            .generate_copy(&request(ProviderKind::Grok), &progress)
            .await
            .unwrap();
        assert_eq!(
            output.content,
            CopyBody::Text("Roasted this week, brewed today.".into())
        );
        assert_eq!(provider.tokens_used(), 10);

        let log = log.lock().unwrap();
        assert!(log[0].starts_with("Generating copy with Grok"));
    }

    #[tokio::test]
    async fn test_unconfigured_backend_is_missing_key() {
        let server = MockServer::start().await;
        let provider = provider_for(&server, ProviderKind::DeepSeek);
        let err = provider
            .generate_copy(&request(ProviderKind::OpenAI), &|_: &str| {})
            .await
            .unwrap_err();
        match err {
            ProviderError::MissingApiKey { env_var, .. } => assert_eq!(env_var, "OPENAI_API_KEY"),
            other => panic!("Expected MissingApiKey, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_headlines_are_trimmed_and_capped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion(
                r#"{"headlines": [" Wake up to better coffee ", "", "Roasted nearby", "Third"]}"#,
            ))
            .mount(&server)
            .await;

        let provider = provider_for(&server, ProviderKind::DeepSeek);
        let headlines = provider
            .generate_headlines(&request(ProviderKind::DeepSeek), "base", 2, &|_: &str| {})
            .await
            .unwrap();
        assert_eq!(headlines, vec!["Wake up to better coffee", "Roasted nearby"]);
    }

    #[tokio::test]
    async fn test_restyle_returns_clean_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("\"Arr, the finest beans on the seven seas.\""))
            .mount(&server)
            .await;

        let provider = provider_for(&server, ProviderKind::DeepSeek);
        let text = provider
            .restyle_copy_with_persona(&request(ProviderKind::DeepSeek), "copy", "Pirate", &|_: &str| {})
            .await
            .unwrap();
        assert_eq!(text, "Arr, the finest beans on the seven seas.");
    }

    #[tokio::test]
    async fn test_seo_metadata_invalid_json_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("I cannot help with that."))
            .mount(&server)
            .await;

        let provider = provider_for(&server, ProviderKind::DeepSeek);
        let err = provider
            .generate_seo_metadata(&request(ProviderKind::DeepSeek), "base", &|_: &str| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
