use std::sync::Arc;
use uuid::Uuid;

use super::notify::{Notifier, Toast};
use super::state::{SessionEvent, SessionHandle};
use crate::access::{AccessControl, UserIdentity};
use crate::content::{
    ContentKind, ContentVariant, GeneratedContentItem, PromptEvaluation, SourceRef,
};
use crate::errors::GenerationError;
use crate::provider::ContentProvider;
use crate::request::GenerationRequest;
use crate::ui::GenerationUI;

/// Persona that routes a restyle to the dedicated humanization call.
pub const HUMANIZE_PERSONA: &str = "Humanize";

/// Secondary action a user triggers against an existing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnDemandAction {
    Alternative,
    Score,
    Restyle(String),
}

impl OnDemandAction {
    fn is_humanize(&self) -> bool {
        matches!(self, OnDemandAction::Restyle(p) if p == HUMANIZE_PERSONA)
    }

    fn label(&self) -> &'static str {
        match self {
            OnDemandAction::Alternative => "Alternative",
            OnDemandAction::Score => "Score",
            OnDemandAction::Restyle(_) if self.is_humanize() => "Humanized copy",
            OnDemandAction::Restyle(_) => "Restyled copy",
        }
    }

    fn success_message(&self) -> String {
        if self.is_humanize() {
            "Content humanized successfully".to_string()
        } else {
            format!("{} generated successfully", self.label())
        }
    }
}

impl std::fmt::Display for OnDemandAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnDemandAction::Alternative => write!(f, "alternative"),
            OnDemandAction::Score => write!(f, "score"),
            OnDemandAction::Restyle(persona) => write!(f, "restyle ({})", persona),
        }
    }
}

/// Sequential generation pipeline.
///
/// Every public entry point brackets its work with `Begin`/`Finish` on the
/// session, so the busy flag is released on every exit path, and reports
/// at most one error toast.
pub struct Orchestrator {
    provider: Arc<dyn ContentProvider>,
    access: Arc<dyn AccessControl>,
    notifier: Arc<dyn Notifier>,
    session: SessionHandle,
    ui: Option<Arc<GenerationUI>>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        access: Arc<dyn AccessControl>,
        notifier: Arc<dyn Notifier>,
        session: SessionHandle,
    ) -> Self {
        Self {
            provider,
            access,
            notifier,
            session,
            ui: None,
        }
    }

    pub fn with_ui(mut self, ui: Arc<GenerationUI>) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Append a progress message to the session log.
    fn report(&self, message: &str) {
        tracing::info!(target: "copysmith::progress", "{}", message);
        self.session
            .apply(SessionEvent::Progress(message.to_string()));
        if let Some(ref ui) = self.ui {
            ui.log_step(message);
        }
    }

    fn checkpoint(&self) -> Result<(), GenerationError> {
        if self.session.cancellation().is_cancelled() {
            return Err(GenerationError::Cancelled);
        }
        Ok(())
    }

    fn begin(&self, label: &str) -> u64 {
        self.session.apply(SessionEvent::Begin);
        if let Some(ref ui) = self.ui {
            ui.start(label);
        }
        self.provider.tokens_used()
    }

    fn finish(&self, tokens_at_start: u64, success: bool) {
        let spent = self.provider.tokens_used().saturating_sub(tokens_at_start);
        self.session.apply(SessionEvent::RecordTokens(spent));
        self.session.apply(SessionEvent::Finish);
        if let Some(ref ui) = self.ui {
            ui.finish(success);
        }
    }

    /// Toast for a failed operation. Preconditions show their own message,
    /// everything else is prefixed with what was being attempted.
    fn notify_failure(&self, what: &str, err: &GenerationError) {
        match err {
            GenerationError::Cancelled => self.notifier.notify(Toast::info(err.to_string())),
            e if e.is_precondition() => self.notifier.notify(Toast::error(e.to_string())),
            e => self
                .notifier
                .notify(Toast::error(format!("Error generating {}: {}", what, e))),
        }
    }

    /// Primary generation run.
    ///
    /// Produces an `Improved` item and, per the request's toggles, scores,
    /// alternatives, headlines and SEO metadata. Stages run strictly in that
    /// order; the first failure aborts the rest while items already appended
    /// stay visible.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        user: Option<&UserIdentity>,
    ) -> Result<(), GenerationError> {
        if user.is_none() {
            let err = GenerationError::NotAuthenticated;
            self.notify_failure("copy", &err);
            return Err(err);
        }
        if let Err(e) = request.validate() {
            let err = GenerationError::InvalidRequest(e.to_string());
            self.notify_failure("copy", &err);
            return Err(err);
        }

        let _operation = self.session.enter_operation();
        let tokens_at_start = self.begin("Generating copy");
        self.session.apply(SessionEvent::ClearItems);

        let result = self.run_generate(request).await;

        self.finish(tokens_at_start, result.is_ok());
        match &result {
            Ok(()) => self.notifier.notify(Toast::success("Copy generated successfully")),
            Err(e) => {
                tracing::warn!(error = %e, "copy generation failed");
                self.notify_failure("copy", e);
            }
        }
        result
    }

    async fn run_generate(&self, request: &GenerationRequest) -> Result<(), GenerationError> {
        let progress = |msg: &str| self.report(msg);

        self.report(&format!(
            "Starting {} run ({} words, {})",
            request.mode,
            request.target_word_count(),
            request.model.display_name()
        ));

        self.checkpoint()?;
        let output = self.provider.generate_copy(request, &progress).await?;
        let mut primary = GeneratedContentItem::new(
            ContentVariant::Improved {
                content: output.content,
            },
            None,
        );
        primary.geo_score = output.geo_score;
        let primary_id = primary.id;
        let primary_text = primary.text().unwrap_or_default();
        let primary_ref = primary.as_source(None);
        self.session.apply(SessionEvent::Append(primary));
        self.report("Improved copy generated");

        if request.generate_scores {
            self.checkpoint()?;
            self.report("Scoring improved copy...");
            let score = self
                .provider
                .generate_content_scores(request, &primary_text, &request.input_text, &progress)
                .await?;
            self.session.apply(SessionEvent::AttachScore {
                id: primary_id,
                score,
            });
        }

        let alternatives = request.alternative_count() as usize;
        for index in 0..alternatives {
            self.checkpoint()?;
            self.report(&format!(
                "Generating alternative {}/{}...",
                index + 1,
                alternatives
            ));
            let output = self
                .provider
                .generate_alternative_copy(request, &primary_text, index, &progress)
                .await?;
            let mut alt = GeneratedContentItem::new(
                ContentVariant::Alternative {
                    content: output.content,
                },
                Some(SourceRef {
                    index: Some(index),
                    ..primary_ref
                }),
            );
            alt.geo_score = output.geo_score;
            let alt_id = alt.id;
            let alt_text = alt.text().unwrap_or_default();
            self.session.apply(SessionEvent::Append(alt));

            if request.generate_scores {
                self.checkpoint()?;
                self.report(&format!("Scoring alternative {}...", index + 1));
                let score = self
                    .provider
                    .generate_content_scores(request, &alt_text, &request.input_text, &progress)
                    .await?;
                self.session
                    .apply(SessionEvent::AttachScore { id: alt_id, score });
            }
        }

        let headline_count = request.headline_count();
        if headline_count > 0 {
            self.checkpoint()?;
            self.report(&format!("Generating {} headlines...", headline_count));
            let headlines = self
                .provider
                .generate_headlines(request, &primary_text, headline_count, &progress)
                .await?;
            self.session.apply(SessionEvent::Append(GeneratedContentItem::new(
                ContentVariant::Headlines { headlines },
                Some(primary_ref),
            )));
        }

        if request.generate_seo_metadata {
            self.checkpoint()?;
            self.report("Generating SEO metadata...");
            let metadata = self
                .provider
                .generate_seo_metadata(request, &primary_text, &progress)
                .await?;
            self.session.apply(SessionEvent::Append(GeneratedContentItem::new(
                ContentVariant::SeoMetadata { metadata },
                Some(primary_ref),
            )));
        }

        self.report("Generation complete");
        Ok(())
    }

    /// Run a secondary action against the item `source_id`.
    ///
    /// Returns the id of the new item, or of the scored item for
    /// [`OnDemandAction::Score`].
    pub async fn on_demand(
        &self,
        action: OnDemandAction,
        source_id: Uuid,
        request: &GenerationRequest,
        user: Option<&UserIdentity>,
    ) -> Result<Uuid, GenerationError> {
        let what = action.label().to_lowercase();
        let Some(user) = user else {
            let err = GenerationError::NotAuthenticated;
            self.notify_failure(&what, &err);
            return Err(err);
        };

        let check = self.access.check_user_access(&user.id, &user.email).await;
        if !check.has_access {
            let err = GenerationError::AccessDenied(check.message);
            self.notify_failure(&what, &err);
            return Err(err);
        }

        let Some(source) = self.session.item(source_id) else {
            let err = GenerationError::ItemNotFound {
                id: source_id.to_string(),
            };
            self.notify_failure(&what, &err);
            return Err(err);
        };

        let _operation = self.session.enter_operation();
        let tokens_at_start = self.begin(&format!("Generating {}", what));

        let result = self.run_on_demand(&action, &source, request).await;

        self.finish(tokens_at_start, result.is_ok());
        match &result {
            Ok(_) => self.notifier.notify(Toast::success(action.success_message())),
            Err(e) => {
                tracing::warn!(error = %e, action = %action, "on-demand generation failed");
                self.notify_failure(&what, e);
            }
        }
        result
    }

    async fn run_on_demand(
        &self,
        action: &OnDemandAction,
        source: &GeneratedContentItem,
        request: &GenerationRequest,
    ) -> Result<Uuid, GenerationError> {
        let progress = |msg: &str| self.report(msg);
        let source_text = source.text().unwrap_or_default();

        self.checkpoint()?;
        let mut item = match action {
            OnDemandAction::Score => {
                if !source.has_content() {
                    return Err(GenerationError::NoContentToScore);
                }
                self.report(&format!("Scoring {}...", source.kind().label().to_lowercase()));
                let score = self
                    .provider
                    .generate_content_scores(request, &source_text, &request.input_text, &progress)
                    .await?;
                self.session.apply(SessionEvent::AttachScore {
                    id: source.id,
                    score,
                });
                return Ok(source.id);
            }
            OnDemandAction::Alternative => {
                require_text(source)?;
                let index = self
                    .session
                    .snapshot()
                    .items
                    .count_kind(ContentKind::Alternative);
                self.report("Generating alternative version...");
                let output = self
                    .provider
                    .generate_alternative_copy(request, &source_text, index, &progress)
                    .await?;
                let mut item = GeneratedContentItem::new(
                    ContentVariant::Alternative {
                        content: output.content,
                    },
                    Some(source.as_source(None)),
                );
                item.geo_score = output.geo_score;
                item
            }
            OnDemandAction::Restyle(_) if action.is_humanize() => {
                require_text(source)?;
                self.report("Humanizing content...");
                let text = self
                    .provider
                    .humanize_copy(request, &source_text, &progress)
                    .await?;
                GeneratedContentItem::new(
                    ContentVariant::Humanized {
                        content: text.into(),
                    },
                    Some(source.as_source(None)),
                )
            }
            OnDemandAction::Restyle(persona) => {
                let kind = source.kind().restyled().ok_or_else(|| {
                    GenerationError::UnsupportedRestyleSource {
                        kind: source.kind().to_string(),
                    }
                })?;
                require_text(source)?;
                self.report(&format!("Restyling as {}...", persona));
                let text = self
                    .provider
                    .restyle_copy_with_persona(request, &source_text, persona, &progress)
                    .await?;
                let variant = ContentVariant::restyled(kind, text, persona).ok_or_else(|| {
                    GenerationError::UnsupportedRestyleSource {
                        kind: source.kind().to_string(),
                    }
                })?;
                GeneratedContentItem::new(variant, Some(source.as_source(None)))
            }
        };

        let item_text = item.text().unwrap_or_default();

        if request.generate_scores {
            self.checkpoint()?;
            self.report("Scoring new content...");
            let score = self
                .provider
                .generate_content_scores(request, &item_text, &source_text, &progress)
                .await?;
            item.score = Some(score);
        }

        if request.generate_geo_score && item.geo_score.is_none() {
            self.checkpoint()?;
            self.report("Calculating GEO score...");
            match self
                .provider
                .generate_geo_score(request, &item_text, &progress)
                .await
            {
                Ok(geo) => item.geo_score = Some(geo),
                Err(e) => {
                    tracing::warn!(error = %e, "GEO score failed");
                    self.report(&format!("GEO score unavailable: {}", e));
                }
            }
        }

        let id = item.id;
        self.session.apply(SessionEvent::Append(item));
        self.report("Done");
        Ok(id)
    }

    /// Ask the provider how well the request is specified.
    pub async fn evaluate(
        &self,
        request: &GenerationRequest,
        user: Option<&UserIdentity>,
    ) -> Result<PromptEvaluation, GenerationError> {
        if user.is_none() {
            let err = GenerationError::NotAuthenticated;
            self.notify_failure("evaluation", &err);
            return Err(err);
        }

        let tokens_at_start = self.begin("Evaluating brief");
        let progress = |msg: &str| self.report(msg);
        let result = self
            .provider
            .evaluate_prompt(request, &progress)
            .await
            .map_err(GenerationError::from);

        self.finish(tokens_at_start, result.is_ok());
        match &result {
            Ok(eval) => self
                .notifier
                .notify(Toast::success(format!("Brief scored {}/100", eval.score))),
            Err(e) => self.notify_failure("evaluation", e),
        }
        result
    }
}

fn require_text(source: &GeneratedContentItem) -> Result<(), GenerationError> {
    if source.has_content() {
        Ok(())
    } else {
        Err(GenerationError::InvalidRequest(format!(
            "{} has no text to work from",
            source.kind().label()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessCheck, ConfigAccess};
    use crate::content::{CopyBody, GeoScore, ScoreData, SeoMetadata};
    use crate::errors::ProviderError;
    use crate::orchestrator::notify::{RecordingNotifier, ToastLevel};
    use crate::orchestrator::state::{CancellationToken, SessionState};
    use crate::provider::{CopyOutput, ProgressFn};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockProvider {
        calls: Mutex<Vec<String>>,
        fail_copy: bool,
        fail_alternative_at: Option<usize>,
        fail_scores: bool,
        fail_geo: bool,
        inline_geo: bool,
        cancel_during_copy: Option<CancellationToken>,
    }

    impl MockProvider {
        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn boom(what: &str) -> ProviderError {
            ProviderError::Api {
                status: 500,
                message: format!("{} exploded", what),
            }
        }
    }

    fn geo(overall: u32) -> GeoScore {
        GeoScore {
            overall,
            breakdown: Default::default(),
            suggestions: vec![],
        }
    }

    #[async_trait]
    impl ContentProvider for MockProvider {
        async fn generate_copy(
            &self,
            _request: &GenerationRequest,
            progress: &ProgressFn<'_>,
        ) -> Result<CopyOutput, ProviderError> {
            self.record("copy");
            progress("mock: generating copy");
            if let Some(token) = &self.cancel_during_copy {
                token.cancel();
            }
            if self.fail_copy {
                return Err(Self::boom("copy"));
            }
            Ok(CopyOutput {
                content: CopyBody::Text("Improved bakery copy".into()),
                geo_score: self.inline_geo.then(|| geo(64)),
            })
        }

        async fn generate_alternative_copy(
            &self,
            _request: &GenerationRequest,
            base: &str,
            index: usize,
            _progress: &ProgressFn<'_>,
        ) -> Result<CopyOutput, ProviderError> {
            self.record(&format!("alternative:{}", index));
            if self.fail_alternative_at == Some(index) {
                return Err(Self::boom("alternative"));
            }
            Ok(CopyOutput::text(format!("{} (alt {})", base, index)))
        }

        async fn generate_headlines(
            &self,
            _request: &GenerationRequest,
            _base: &str,
            count: u32,
            _progress: &ProgressFn<'_>,
        ) -> Result<Vec<String>, ProviderError> {
            self.record("headlines");
            Ok((0..count).map(|i| format!("Headline {}", i + 1)).collect())
        }

        async fn generate_seo_metadata(
            &self,
            _request: &GenerationRequest,
            _base: &str,
            _progress: &ProgressFn<'_>,
        ) -> Result<SeoMetadata, ProviderError> {
            self.record("seo");
            Ok(SeoMetadata {
                url_slugs: vec!["fresh-bread".into()],
                ..Default::default()
            })
        }

        async fn generate_content_scores(
            &self,
            _request: &GenerationRequest,
            _text: &str,
            reference: &str,
            _progress: &ProgressFn<'_>,
        ) -> Result<ScoreData, ProviderError> {
            self.record(&format!("score:{}", reference));
            if self.fail_scores {
                return Err(Self::boom("score"));
            }
            Ok(ScoreData {
                overall: 81.0,
                clarity: 80.0,
                persuasiveness: 82.0,
                originality: 70.0,
                engagement: 90.0,
                word_count_accuracy: Some(95.0),
                improvement_explanation: "Sharper CTA".into(),
            })
        }

        async fn restyle_copy_with_persona(
            &self,
            _request: &GenerationRequest,
            text: &str,
            persona: &str,
            _progress: &ProgressFn<'_>,
        ) -> Result<String, ProviderError> {
            self.record(&format!("restyle:{}", persona));
            Ok(format!("{} as {}", text, persona))
        }

        async fn humanize_copy(
            &self,
            _request: &GenerationRequest,
            text: &str,
            _progress: &ProgressFn<'_>,
        ) -> Result<String, ProviderError> {
            self.record("humanize");
            Ok(format!("{}, but human", text))
        }

        async fn generate_geo_score(
            &self,
            _request: &GenerationRequest,
            _text: &str,
            _progress: &ProgressFn<'_>,
        ) -> Result<GeoScore, ProviderError> {
            self.record("geo");
            if self.fail_geo {
                return Err(Self::boom("geo"));
            }
            Ok(geo(77))
        }

        async fn evaluate_prompt(
            &self,
            _request: &GenerationRequest,
            _progress: &ProgressFn<'_>,
        ) -> Result<PromptEvaluation, ProviderError> {
            self.record("evaluate");
            Ok(PromptEvaluation {
                score: 68,
                tips: vec!["Name your audience".into()],
            })
        }
    }

    struct DenyAll;

    #[async_trait]
    impl AccessControl for DenyAll {
        async fn check_user_access(&self, _user_id: &str, _email: &str) -> AccessCheck {
            AccessCheck::denied("Upgrade to Pro to use this feature")
        }
    }

    struct Harness {
        orchestrator: Orchestrator,
        provider: Arc<MockProvider>,
        notifier: Arc<RecordingNotifier>,
    }

    impl Harness {
        fn new(provider: MockProvider) -> Self {
            Self::with_state(provider, SessionState::default())
        }

        fn with_state(provider: MockProvider, state: SessionState) -> Self {
            Self::build(provider, state, Arc::new(ConfigAccess::allow_all()))
        }

        fn build(
            provider: MockProvider,
            state: SessionState,
            access: Arc<dyn AccessControl>,
        ) -> Self {
            let provider = Arc::new(provider);
            let notifier = Arc::new(RecordingNotifier::default());
            let orchestrator = Orchestrator::new(
                provider.clone(),
                access,
                notifier.clone(),
                SessionHandle::new(state),
            );
            Self {
                orchestrator,
                provider,
                notifier,
            }
        }

        fn items(&self) -> Vec<GeneratedContentItem> {
            self.orchestrator.session().items()
        }

        fn count(&self, kind: ContentKind) -> usize {
            self.items().iter().filter(|i| i.kind() == kind).count()
        }
    }

    fn user() -> UserIdentity {
        UserIdentity {
            id: "user-1".into(),
            email: "owner@bakery.test".into(),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            input_text: "Family bakery in York".into(),
            ..Default::default()
        }
    }

    fn source_item(variant: ContentVariant) -> GeneratedContentItem {
        GeneratedContentItem::new(variant, None)
    }

    fn improved(text: &str) -> GeneratedContentItem {
        source_item(ContentVariant::Improved {
            content: text.into(),
        })
    }

    // -- primary generation ------------------------------------------------

    #[tokio::test]
    async fn test_generate_requires_login() {
        let h = Harness::new(MockProvider::default());
        let err = h.orchestrator.generate(&request(), None).await.unwrap_err();
        assert!(matches!(err, GenerationError::NotAuthenticated));
        assert!(h.provider.calls().is_empty());
        assert_eq!(
            h.notifier.errors()[0].message,
            "Please log in to generate copy"
        );
        assert!(!h.orchestrator.session().is_busy());
    }

    #[tokio::test]
    async fn test_generate_without_alternatives_yields_single_improved() {
        let h = Harness::new(MockProvider::default());
        h.orchestrator.generate(&request(), Some(&user())).await.unwrap();

        assert_eq!(h.items().len(), 1);
        assert_eq!(h.count(ContentKind::Improved), 1);
        assert_eq!(h.count(ContentKind::Alternative), 0);
        assert!(!h.orchestrator.session().is_busy());
        assert_eq!(h.notifier.toasts()[0].level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn test_generate_clears_previous_items() {
        let state = SessionState::with_items(vec![improved("stale")]);
        let h = Harness::with_state(MockProvider::default(), state);
        h.orchestrator.generate(&request(), Some(&user())).await.unwrap();
        assert_eq!(h.items().len(), 1);
        assert_ne!(h.items()[0].text().as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn test_generate_alternatives_reference_primary_and_index() {
        let h = Harness::new(MockProvider::default());
        let mut req = request();
        req.generate_alternative = true;
        req.number_of_alternative_versions = 3;

        h.orchestrator.generate(&req, Some(&user())).await.unwrap();

        let items = h.items();
        let primary = &items[0];
        assert_eq!(primary.kind(), ContentKind::Improved);
        let alts: Vec<_> = items
            .iter()
            .filter(|i| i.kind() == ContentKind::Alternative)
            .collect();
        assert_eq!(alts.len(), 3);
        for (pos, alt) in alts.iter().enumerate() {
            let source = alt.source.unwrap();
            assert_eq!(source.id, primary.id);
            assert_eq!(source.kind, ContentKind::Improved);
            assert_eq!(source.index, Some(pos));
        }
        assert_eq!(
            h.provider.calls(),
            vec!["copy", "alternative:0", "alternative:1", "alternative:2"]
        );
    }

    #[tokio::test]
    async fn test_generate_full_pipeline_order() {
        let h = Harness::new(MockProvider::default());
        let mut req = request();
        req.generate_scores = true;
        req.generate_alternative = true;
        req.number_of_alternative_versions = 1;
        req.generate_headlines = true;
        req.number_of_headlines = 2;
        req.generate_seo_metadata = true;

        h.orchestrator.generate(&req, Some(&user())).await.unwrap();

        let reference = format!("score:{}", req.input_text);
        assert_eq!(
            h.provider.calls(),
            vec![
                "copy".to_string(),
                reference.clone(),
                "alternative:0".to_string(),
                reference,
                "headlines".to_string(),
                "seo".to_string(),
            ]
        );
        let kinds: Vec<_> = h.items().iter().map(|i| i.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ContentKind::Improved,
                ContentKind::Alternative,
                ContentKind::Headlines,
                ContentKind::SeoMetadata,
            ]
        );
        assert!(h.items()[0].score.is_some());
        assert!(h.items()[1].score.is_some());
        assert_eq!(h.items()[3].source.unwrap().id, h.items()[0].id);
    }

    #[tokio::test]
    async fn test_generate_attaches_inline_geo_score() {
        let h = Harness::new(MockProvider {
            inline_geo: true,
            ..Default::default()
        });
        h.orchestrator.generate(&request(), Some(&user())).await.unwrap();
        assert_eq!(h.items()[0].geo_score.as_ref().unwrap().overall, 64);
    }

    #[tokio::test]
    async fn test_generate_primary_failure_leaves_store_empty() {
        let h = Harness::new(MockProvider {
            fail_copy: true,
            ..Default::default()
        });
        let mut req = request();
        req.generate_alternative = true;
        req.number_of_alternative_versions = 2;

        let err = h.orchestrator.generate(&req, Some(&user())).await.unwrap_err();
        assert!(matches!(err, GenerationError::Provider(_)));
        assert!(h.items().is_empty());
        assert!(!h.orchestrator.session().is_busy());

        let errors = h.notifier.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Error generating copy:"));
        assert!(errors[0].message.contains("copy exploded"));
        assert_eq!(h.notifier.toasts().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_alternative_failure_keeps_earlier_items() {
        let h = Harness::new(MockProvider {
            fail_alternative_at: Some(1),
            ..Default::default()
        });
        let mut req = request();
        req.generate_alternative = true;
        req.number_of_alternative_versions = 3;
        req.generate_seo_metadata = true;

        assert!(h.orchestrator.generate(&req, Some(&user())).await.is_err());

        let alts: Vec<_> = h
            .items()
            .into_iter()
            .filter(|i| i.kind() == ContentKind::Alternative)
            .collect();
        assert_eq!(alts.len(), 1);
        assert_eq!(alts[0].source.unwrap().index, Some(0));
        assert_eq!(h.count(ContentKind::SeoMetadata), 0);
        assert!(!h.provider.calls().contains(&"alternative:2".to_string()));
        assert!(!h.orchestrator.session().is_busy());
        assert_eq!(h.notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_score_failure_aborts_but_keeps_primary() {
        let h = Harness::new(MockProvider {
            fail_scores: true,
            ..Default::default()
        });
        let mut req = request();
        req.generate_scores = true;
        req.generate_alternative = true;
        req.number_of_alternative_versions = 2;

        assert!(h.orchestrator.generate(&req, Some(&user())).await.is_err());
        assert_eq!(h.items().len(), 1);
        assert!(h.items()[0].score.is_none());
        assert_eq!(h.count(ContentKind::Alternative), 0);
        assert_eq!(h.notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_request_before_provider() {
        let h = Harness::new(MockProvider::default());
        let req = GenerationRequest::default();
        let err = h.orchestrator.generate(&req, Some(&user())).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRequest(_)));
        assert!(h.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_lets_inflight_result_land_then_stops() {
        let session = SessionHandle::default();
        let provider = Arc::new(MockProvider {
            cancel_during_copy: Some(session.cancellation()),
            ..Default::default()
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let orchestrator = Orchestrator::new(
            provider.clone(),
            Arc::new(ConfigAccess::allow_all()),
            notifier.clone(),
            session.clone(),
        );
        let mut req = request();
        req.generate_alternative = true;
        req.number_of_alternative_versions = 2;

        let err = orchestrator.generate(&req, Some(&user())).await.unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled));

        let items = session.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind(), ContentKind::Improved);
        assert_eq!(provider.calls(), vec!["copy"]);
        assert!(!session.is_busy());
        assert!(notifier.errors().is_empty());
        assert_eq!(notifier.toasts()[0].level, ToastLevel::Info);
    }

    #[tokio::test]
    async fn test_progress_log_records_provider_messages() {
        let h = Harness::new(MockProvider::default());
        h.orchestrator.generate(&request(), Some(&user())).await.unwrap();
        let progress = h.orchestrator.session().progress();
        assert!(progress.iter().any(|p| p == "mock: generating copy"));
        assert_eq!(progress.last().map(String::as_str), Some("Generation complete"));
    }

    // -- on-demand generation ----------------------------------------------

    #[tokio::test]
    async fn test_on_demand_requires_access() {
        let source = improved("Bread");
        let id = source.id;
        let h = Harness::build(
            MockProvider::default(),
            SessionState::with_items(vec![source]),
            Arc::new(DenyAll),
        );

        let err = h
            .orchestrator
            .on_demand(OnDemandAction::Alternative, id, &request(), Some(&user()))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::AccessDenied(_)));
        assert_eq!(
            h.notifier.errors()[0].message,
            "Upgrade to Pro to use this feature"
        );
        assert!(h.provider.calls().is_empty());
        assert_eq!(h.items().len(), 1);
    }

    #[tokio::test]
    async fn test_on_demand_requires_login() {
        let source = improved("Bread");
        let id = source.id;
        let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![source]));
        let err = h
            .orchestrator
            .on_demand(OnDemandAction::Score, id, &request(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_on_demand_unknown_item() {
        let h = Harness::new(MockProvider::default());
        let err = h
            .orchestrator
            .on_demand(OnDemandAction::Score, Uuid::new_v4(), &request(), Some(&user()))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::ItemNotFound { .. }));
    }

    #[tokio::test]
    async fn test_score_empty_content_aborts_without_mutation() {
        let source = improved("");
        let id = source.id;
        let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![source.clone()]));

        let err = h
            .orchestrator
            .on_demand(OnDemandAction::Score, id, &request(), Some(&user()))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::NoContentToScore));
        assert_eq!(h.items(), vec![source]);
        assert!(h.provider.calls().is_empty());
        assert!(!h.orchestrator.session().is_busy());
        assert_eq!(h.notifier.errors()[0].message, "No content to score");
    }

    #[tokio::test]
    async fn test_score_updates_item_in_place() {
        let source = improved("Crusty sourdough, baked at dawn.");
        let id = source.id;
        let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![source]));
        let mut req = request();
        req.generate_geo_score = true;

        let scored = h
            .orchestrator
            .on_demand(OnDemandAction::Score, id, &req, Some(&user()))
            .await
            .unwrap();

        assert_eq!(scored, id);
        let items = h.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].score.as_ref().unwrap().overall, 81.0);
        // the score branch returns before the GEO step
        assert!(!h.provider.calls().contains(&"geo".to_string()));
        assert_eq!(h.notifier.toasts()[0].message, "Score generated successfully");
    }

    #[tokio::test]
    async fn test_on_demand_alternative_copies_back_reference() {
        let source = improved("Original");
        let id = source.id;
        let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![source]));

        let new_id = h
            .orchestrator
            .on_demand(OnDemandAction::Alternative, id, &request(), Some(&user()))
            .await
            .unwrap();

        let items = h.items();
        assert_eq!(items.len(), 2);
        let alt = &items[1];
        assert_eq!(alt.id, new_id);
        assert_eq!(alt.kind(), ContentKind::Alternative);
        let src = alt.source.unwrap();
        assert_eq!(src.id, id);
        assert_eq!(src.kind, ContentKind::Improved);
        assert_eq!(src.index, None);
        assert_eq!(
            h.notifier.toasts()[0].message,
            "Alternative generated successfully"
        );
    }

    #[tokio::test]
    async fn test_humanize_always_produces_humanized() {
        for variant in [
            ContentVariant::Improved {
                content: "a".into(),
            },
            ContentVariant::Alternative {
                content: "b".into(),
            },
            ContentVariant::Headlines {
                headlines: vec!["c".into()],
            },
        ] {
            let source = source_item(variant);
            let id = source.id;
            let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![source]));
            h.orchestrator
                .on_demand(
                    OnDemandAction::Restyle(HUMANIZE_PERSONA.into()),
                    id,
                    &request(),
                    Some(&user()),
                )
                .await
                .unwrap();
            let items = h.items();
            assert_eq!(items[1].kind(), ContentKind::Humanized);
            assert_eq!(h.provider.calls(), vec!["humanize"]);
            assert_eq!(
                h.notifier.toasts()[0].message,
                "Content humanized successfully"
            );
        }
    }

    #[tokio::test]
    async fn test_restyle_kind_follows_source_kind() {
        let cases = [
            (
                ContentVariant::Improved {
                    content: "a".into(),
                },
                ContentKind::RestyledImproved,
            ),
            (
                ContentVariant::Alternative {
                    content: "b".into(),
                },
                ContentKind::RestyledAlternative,
            ),
            (
                ContentVariant::Headlines {
                    headlines: vec!["One".into(), "Two".into()],
                },
                ContentKind::RestyledHeadlines,
            ),
        ];
        for (variant, expected) in cases {
            let source = source_item(variant);
            let id = source.id;
            let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![source]));
            h.orchestrator
                .on_demand(
                    OnDemandAction::Restyle("Pirate".into()),
                    id,
                    &request(),
                    Some(&user()),
                )
                .await
                .unwrap();
            let restyled = &h.items()[1];
            assert_eq!(restyled.kind(), expected);
            assert_eq!(restyled.persona(), Some("Pirate"));
        }
    }

    #[tokio::test]
    async fn test_restyle_unsupported_source_rejected() {
        let source = source_item(ContentVariant::SeoMetadata {
            metadata: SeoMetadata::default(),
        });
        let id = source.id;
        let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![source]));
        let err = h
            .orchestrator
            .on_demand(
                OnDemandAction::Restyle("Pirate".into()),
                id,
                &request(),
                Some(&user()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedRestyleSource { .. }));
        assert!(h.provider.calls().is_empty());
        assert_eq!(h.items().len(), 1);
    }

    #[tokio::test]
    async fn test_geo_failure_is_isolated_during_restyle() {
        let source = improved("Original");
        let id = source.id;
        let h = Harness::with_state(
            MockProvider {
                fail_geo: true,
                ..Default::default()
            },
            SessionState::with_items(vec![source]),
        );
        let mut req = request();
        req.generate_geo_score = true;

        h.orchestrator
            .on_demand(
                OnDemandAction::Restyle("Poet".into()),
                id,
                &req,
                Some(&user()),
            )
            .await
            .unwrap();

        let items = h.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].kind(), ContentKind::RestyledImproved);
        assert!(items[1].geo_score.is_none());
        assert!(h.notifier.errors().is_empty());
        assert!(
            h.orchestrator
                .session()
                .progress()
                .iter()
                .any(|p| p.starts_with("GEO score unavailable"))
        );
    }

    #[tokio::test]
    async fn test_on_demand_enrichment_uses_source_as_reference() {
        let source = improved("Original");
        let id = source.id;
        let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![source]));
        let mut req = request();
        req.generate_scores = true;
        req.generate_geo_score = true;

        h.orchestrator
            .on_demand(OnDemandAction::Alternative, id, &req, Some(&user()))
            .await
            .unwrap();

        assert_eq!(
            h.provider.calls(),
            vec!["alternative:0", "score:Original", "geo"]
        );
        let alt = &h.items()[1];
        assert!(alt.score.is_some());
        assert_eq!(alt.geo_score.as_ref().unwrap().overall, 77);
    }

    #[tokio::test]
    async fn test_on_demand_score_failure_is_not_isolated() {
        let source = improved("Original");
        let id = source.id;
        let h = Harness::with_state(
            MockProvider {
                fail_scores: true,
                ..Default::default()
            },
            SessionState::with_items(vec![source]),
        );
        let mut req = request();
        req.generate_scores = true;

        let err = h
            .orchestrator
            .on_demand(OnDemandAction::Alternative, id, &req, Some(&user()))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Provider(_)));
        assert_eq!(h.items().len(), 1);
        assert!(
            h.notifier.errors()[0]
                .message
                .starts_with("Error generating alternative:")
        );
        assert!(!h.orchestrator.session().is_busy());
    }

    #[tokio::test]
    async fn test_interleaved_operations_keep_all_appends() {
        let a = improved("First");
        let b = improved("Second");
        let (a_id, b_id) = (a.id, b.id);
        let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![a, b]));
        let req = request();
        let u = user();

        let (first, second) = tokio::join!(
            h.orchestrator
                .on_demand(OnDemandAction::Alternative, a_id, &req, Some(&u)),
            h.orchestrator
                .on_demand(OnDemandAction::Score, b_id, &req, Some(&u)),
        );
        first.unwrap();
        second.unwrap();

        let items = h.items();
        assert_eq!(items.len(), 3);
        assert!(items.iter().find(|i| i.id == b_id).unwrap().score.is_some());
    }

    #[tokio::test]
    async fn test_on_demand_keeps_cancel_pending_for_running_operation() {
        let a = improved("Fresh bread daily");
        let a_id = a.id;
        let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![a]));
        let session = h.orchestrator.session().clone();

        let running = session.enter_operation();
        session.cancel();

        let err = h
            .orchestrator
            .on_demand(OnDemandAction::Alternative, a_id, &request(), Some(&user()))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled));
        assert!(session.cancellation().is_cancelled());
        assert!(h.provider.calls().is_empty());
        assert_eq!(h.items().len(), 1);
        drop(running);
    }

    #[tokio::test]
    async fn test_on_demand_clears_cancel_left_by_finished_run() {
        let a = improved("Fresh bread daily");
        let a_id = a.id;
        let h = Harness::with_state(MockProvider::default(), SessionState::with_items(vec![a]));
        h.orchestrator.session().cancel();

        h.orchestrator
            .on_demand(OnDemandAction::Alternative, a_id, &request(), Some(&user()))
            .await
            .unwrap();
        assert_eq!(h.count(ContentKind::Alternative), 1);
        assert_eq!(h.orchestrator.session().active_operations(), 0);
    }

    #[tokio::test]
    async fn test_evaluate_returns_provider_result() {
        let h = Harness::new(MockProvider::default());
        let eval = h
            .orchestrator
            .evaluate(&request(), Some(&user()))
            .await
            .unwrap();
        assert_eq!(eval.score, 68);
        assert_eq!(h.notifier.toasts()[0].message, "Brief scored 68/100");
        assert!(!h.orchestrator.session().is_busy());
    }
}
