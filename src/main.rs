use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use copysmith::orchestrator::OnDemandAction;
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "copysmith")]
#[command(version, about = "Marketing copy generator driven by LLM providers")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where a request comes from: a file or a saved template.
#[derive(Args, Clone, Debug)]
#[group(required = true, multiple = false)]
pub struct RequestSource {
    /// Request file (.json, .yaml or .toml)
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    /// Saved template name
    #[arg(short, long)]
    pub template: Option<String>,
}

/// Per-run overrides for the request toggles.
#[derive(Args, Clone, Debug, Default)]
pub struct GenerateOverrides {
    /// Generate N alternative versions
    #[arg(long, value_name = "N")]
    pub alternatives: Option<u32>,

    /// Generate SEO metadata
    #[arg(long)]
    pub seo: bool,

    /// Score every generated version
    #[arg(long)]
    pub scores: bool,

    /// Generate N headlines
    #[arg(long, value_name = "N")]
    pub headlines: Option<u32>,

    /// Model family: deepseek, openai or grok
    #[arg(long)]
    pub model: Option<String>,
}

/// Options shared by the on-demand commands.
#[derive(Args, Clone, Debug)]
pub struct OnDemandTarget {
    /// Item id (a unique prefix is enough)
    pub item_id: String,

    /// Session id; defaults to the most recent session
    #[arg(short, long)]
    pub session: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a copysmith project in the current directory
    Init,
    /// Generate copy (improved version plus requested extras)
    Generate {
        #[command(flatten)]
        source: RequestSource,

        /// Save the effective request as a template
        #[arg(long, value_name = "NAME")]
        save_template: Option<String>,

        #[command(flatten)]
        overrides: GenerateOverrides,
    },
    /// Generate an alternative version of an item
    Alternative {
        #[command(flatten)]
        target: OnDemandTarget,
    },
    /// Score an item
    Score {
        #[command(flatten)]
        target: OnDemandTarget,
    },
    /// Restyle an item in a persona's voice ("Humanize" humanizes it)
    Restyle {
        #[command(flatten)]
        target: OnDemandTarget,

        #[arg(short, long)]
        persona: String,
    },
    /// Rate how well a request is specified
    Evaluate {
        #[command(flatten)]
        source: RequestSource,
    },
    /// Show the target word count a request resolves to
    Target {
        #[command(flatten)]
        source: RequestSource,
    },
    /// List or show saved sessions
    Sessions {
        #[command(subcommand)]
        command: Option<SessionsCommands>,
    },
    /// Manage request templates
    Templates {
        #[command(subcommand)]
        command: Option<TemplatesCommands>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum SessionsCommands {
    /// List saved sessions, newest first
    List,
    /// Show a session's items
    Show { id: String },
}

#[derive(Subcommand, Clone)]
pub enum TemplatesCommands {
    /// List saved templates
    List,
    /// Show a template's request
    Show { name: String },
    /// Delete a template
    Delete {
        name: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default copysmith.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Warning: failed to load .env: {}", e);
    }
    let log_dir = copysmith::init::get_copysmith_dir(&project_dir).join("logs");
    let _log_guard = copysmith::logging::init(Some(&log_dir), cli.verbose);

    match cli.command {
        Commands::Init => cmd::cmd_init(&project_dir)?,
        Commands::Generate {
            source,
            save_template,
            overrides,
        } => {
            cmd::cmd_generate(
                &project_dir,
                cli.verbose,
                &source,
                save_template.as_deref(),
                &overrides,
            )
            .await?
        }
        Commands::Alternative { target } => {
            cmd::cmd_on_demand(&project_dir, cli.verbose, OnDemandAction::Alternative, &target)
                .await?
        }
        Commands::Score { target } => {
            cmd::cmd_on_demand(&project_dir, cli.verbose, OnDemandAction::Score, &target).await?
        }
        Commands::Restyle { target, persona } => {
            cmd::cmd_on_demand(
                &project_dir,
                cli.verbose,
                OnDemandAction::Restyle(persona),
                &target,
            )
            .await?
        }
        Commands::Evaluate { source } => {
            cmd::cmd_evaluate(&project_dir, cli.verbose, &source).await?
        }
        Commands::Target { source } => cmd::cmd_target(&project_dir, &source)?,
        Commands::Sessions { command } => cmd::cmd_sessions(&project_dir, command)?,
        Commands::Templates { command } => cmd::cmd_templates(&project_dir, command)?,
        Commands::Config { command } => cmd::cmd_config(&project_dir, command)?,
    }

    Ok(())
}
