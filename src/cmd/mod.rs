//! CLI command implementations.
//!
//! | Module      | Commands handled                         |
//! |-------------|------------------------------------------|
//! | `project`   | `Init`, `Target`                         |
//! | `generate`  | `Generate`, `Evaluate`                   |
//! | `on_demand` | `Alternative`, `Score`, `Restyle`        |
//! | `sessions`  | `Sessions`                               |
//! | `templates` | `Templates`                              |
//! | `config`    | `Config`                                 |

pub mod config;
pub mod generate;
pub mod on_demand;
pub mod project;
pub mod sessions;
pub mod templates;

pub use config::cmd_config;
pub use generate::{cmd_evaluate, cmd_generate};
pub use on_demand::cmd_on_demand;
pub use project::{cmd_init, cmd_target};
pub use sessions::cmd_sessions;
pub use templates::cmd_templates;

use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::oneshot;

use copysmith::config::Config;
use copysmith::orchestrator::{Orchestrator, SessionHandle, TerminalNotifier};
use copysmith::request::GenerationRequest;
use copysmith::store::TemplateStore;
use copysmith::ui::GenerationUI;

use super::RequestSource;

/// Orchestrator wired to the configured providers, the terminal notifier
/// and a spinner.
fn build_orchestrator(config: &Config, session: SessionHandle) -> Orchestrator {
    Orchestrator::new(
        config.provider(),
        Arc::new(config.access()),
        Arc::new(TerminalNotifier),
        session,
    )
    .with_ui(Arc::new(GenerationUI::new(config.verbose)))
}

/// Load the request from a file or template.
fn load_request(config: &Config, source: &RequestSource) -> Result<GenerationRequest> {
    match (&source.request, &source.template) {
        (Some(path), _) => GenerationRequest::load(path),
        (None, Some(name)) => TemplateStore::new(&config.templates_dir)
            .load(name)
            .with_context(|| format!("Failed to load template '{}'", name)),
        (None, None) => anyhow::bail!("Provide --request FILE or --template NAME"),
    }
}

/// Run a blocking prompt on a detached thread.
///
/// Unlike `spawn_blocking`, the runtime does not wait for it on shutdown, so
/// an unanswered prompt never keeps the process alive.
fn ask_detached<F>(prompt: F) -> oneshot::Receiver<bool>
where
    F: FnOnce() -> bool + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let _ = tx.send(prompt());
    });
    rx
}

/// Run `fut` while a Ctrl-C watcher offers to cancel the session.
///
/// Confirming sets the session's cancellation token. The provider call in
/// flight still completes; the next stage does not start.
async fn with_cancel_prompt<F, T>(session: &SessionHandle, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let watched = session.clone();
    let prompt_open = Arc::new(AtomicBool::new(false));
    let open = prompt_open.clone();
    let watcher = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            open.store(true, Ordering::SeqCst);
            let confirmed = ask_detached(|| {
                dialoguer::Confirm::new()
                    .with_prompt("Cancel the running generation?")
                    .default(true)
                    .interact()
                    .unwrap_or(true)
            })
            .await
            .unwrap_or(true);
            open.store(false, Ordering::SeqCst);
            if confirmed {
                watched.cancel();
                break;
            }
        }
    });

    let output = fut.await;
    watcher.abort();
    if prompt_open.load(Ordering::SeqCst) {
        eprintln!();
        eprintln!(
            "{}",
            style("Generation already finished; the cancel prompt was ignored.").dim()
        );
    }
    output
}

fn require_initialized(config: &Config) -> Result<()> {
    if !config.is_initialized() {
        anyhow::bail!(
            "No .copysmith directory in {}. Run 'copysmith init' first.",
            config.project_dir.display()
        );
    }
    Ok(())
}

fn load_config(project_dir: &Path, verbose: bool) -> Result<Config> {
    Config::new(project_dir.to_path_buf(), verbose)
}
