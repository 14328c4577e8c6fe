//! Primary generation and prompt evaluation: `copysmith generate`, `copysmith evaluate`.

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use copysmith::orchestrator::SessionHandle;
use copysmith::request::GenerationRequest;
use copysmith::store::{SessionRecord, SessionStore, TemplateStore};
use copysmith::ui::display::print_items;
use copysmith::ui::icons::{SPARKLE, TARGET};

use super::super::{GenerateOverrides, RequestSource};
use super::{build_orchestrator, load_config, load_request, with_cancel_prompt};

/// Apply CLI toggles on top of the loaded request.
pub fn apply_overrides(request: &mut GenerationRequest, overrides: &GenerateOverrides) -> Result<()> {
    if let Some(n) = overrides.alternatives {
        request.generate_alternative = n > 0;
        request.number_of_alternative_versions = n;
    }
    if let Some(n) = overrides.headlines {
        request.generate_headlines = n > 0;
        request.number_of_headlines = n;
    }
    if overrides.seo {
        request.generate_seo_metadata = true;
    }
    if overrides.scores {
        request.generate_scores = true;
    }
    if let Some(ref model) = overrides.model {
        request.model = model.parse()?;
    }
    Ok(())
}

fn login_hint() {
    eprintln!(
        "{}",
        style("Set [user] email in .copysmith/copysmith.toml or COPYSMITH_USER_EMAIL.").dim()
    );
}

pub async fn cmd_generate(
    project_dir: &Path,
    verbose: bool,
    source: &RequestSource,
    save_template: Option<&str>,
    overrides: &GenerateOverrides,
) -> Result<()> {
    let config = load_config(project_dir, verbose)?;
    let mut request = load_request(&config, source)?;
    config.apply_defaults(&mut request);
    apply_overrides(&mut request, overrides)?;

    if let Some(name) = save_template {
        let path = TemplateStore::new(&config.templates_dir).save(name, &request)?;
        println!("Saved template '{}' to {}", name, path.display());
    }

    let user = config.user();
    if user.is_none() {
        login_hint();
    }

    let session = SessionHandle::default();
    let orchestrator = build_orchestrator(&config, session.clone());
    let result = with_cancel_prompt(
        &session,
        orchestrator.generate(&request, user.as_ref()),
    )
    .await;

    let state = session.snapshot();
    if !state.items.is_empty() {
        print_items(state.items.items());

        config.ensure_directories()?;
        let mut record = SessionRecord::new(request);
        record.update_from(&state);
        SessionStore::new(&config.sessions_dir)
            .save(&mut record)
            .context("Failed to save session")?;
        println!(
            "{}Session {} saved ({} items, {} tokens)",
            SPARKLE,
            style(record.short_id()).bold(),
            record.items.len(),
            record.tokens_used
        );
        println!(
            "{}",
            style("Use 'copysmith alternative|score|restyle <item-id>' to keep working on it.")
                .dim()
        );
    }

    result.map_err(anyhow::Error::from)
}

pub async fn cmd_evaluate(project_dir: &Path, verbose: bool, source: &RequestSource) -> Result<()> {
    let config = load_config(project_dir, verbose)?;
    let mut request = load_request(&config, source)?;
    config.apply_defaults(&mut request);

    let user = config.user();
    if user.is_none() {
        login_hint();
    }

    let session = SessionHandle::default();
    let orchestrator = build_orchestrator(&config, session.clone());
    let evaluation = with_cancel_prompt(&session, orchestrator.evaluate(&request, user.as_ref()))
        .await?;

    println!();
    println!(
        "{}Brief score: {}",
        TARGET,
        style(format!("{}/100", evaluation.score)).cyan().bold()
    );
    if !evaluation.tips.is_empty() {
        println!();
        println!("Tips:");
        for tip in &evaluation.tips {
            println!("  - {}", tip);
        }
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use copysmith::provider::ProviderKind;

    #[test]
    fn test_apply_overrides() {
        let mut request = GenerationRequest::default();
        let overrides = GenerateOverrides {
            alternatives: Some(3),
            headlines: Some(0),
            seo: true,
            scores: false,
            model: Some("grok".into()),
        };
        apply_overrides(&mut request, &overrides).unwrap();
        assert!(request.generate_alternative);
        assert_eq!(request.number_of_alternative_versions, 3);
        assert!(!request.generate_headlines);
        assert!(request.generate_seo_metadata);
        assert!(!request.generate_scores);
        assert_eq!(request.model, ProviderKind::Grok);
    }

    #[test]
    fn test_apply_overrides_rejects_unknown_model() {
        let mut request = GenerationRequest::default();
        let overrides = GenerateOverrides {
            model: Some("llama".into()),
            ..Default::default()
        };
        assert!(apply_overrides(&mut request, &overrides).is_err());
    }
}
