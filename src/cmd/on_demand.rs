//! On-demand actions against a saved session: `alternative`, `score`, `restyle`.

use anyhow::{Context, Result, anyhow};
use std::path::Path;

use copysmith::config::Config;
use copysmith::orchestrator::{OnDemandAction, SessionHandle};
use copysmith::store::{SessionRecord, SessionStore};
use copysmith::ui::display::{render_item, wrap_width};

use super::super::OnDemandTarget;
use super::{build_orchestrator, load_config, require_initialized, with_cancel_prompt};

fn load_session(config: &Config, id: Option<&str>) -> Result<SessionRecord> {
    let store = SessionStore::new(&config.sessions_dir);
    match id {
        Some(id) => Ok(store.load(id)?),
        None => store
            .latest()?
            .ok_or_else(|| anyhow!("No saved sessions. Run 'copysmith generate' first.")),
    }
}

pub async fn cmd_on_demand(
    project_dir: &Path,
    verbose: bool,
    action: OnDemandAction,
    target: &OnDemandTarget,
) -> Result<()> {
    let config = load_config(project_dir, verbose)?;
    require_initialized(&config)?;

    let mut record = load_session(&config, target.session.as_deref())?;
    let state = record.to_state();
    let source_id = state
        .items
        .find_by_prefix(&target.item_id)
        .map(|item| item.id)
        .ok_or_else(|| {
            anyhow!(
                "No unique item matching '{}' in session {}",
                target.item_id,
                record.short_id()
            )
        })?;

    let mut request = record.request.clone();
    config.apply_defaults(&mut request);

    let session = SessionHandle::new(state);
    let orchestrator = build_orchestrator(&config, session.clone());
    let user = config.user();
    let result = with_cancel_prompt(
        &session,
        orchestrator.on_demand(action, source_id, &request, user.as_ref()),
    )
    .await;

    // Items appended before a failure are kept too.
    record.update_from(&session.snapshot());
    SessionStore::new(&config.sessions_dir)
        .save(&mut record)
        .context("Failed to save session")?;

    let id = result?;
    if let Some(item) = session.item(id) {
        println!();
        print!("{}", render_item(&item, wrap_width()));
        println!();
    }
    Ok(())
}
