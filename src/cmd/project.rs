//! Project initialization and word-count preview: `copysmith init`, `copysmith target`.

use anyhow::Result;
use std::path::Path;

use copysmith::request::{WordCountPreset, structural_word_total};

use super::super::RequestSource;
use super::{load_config, load_request};

pub fn cmd_init(project_dir: &Path) -> Result<()> {
    use copysmith::init::{EXAMPLE_REQUEST_FILE, init_project};

    let result = init_project(project_dir)?;

    if result.created {
        println!(
            "Initialized copysmith project at {}",
            result.copysmith_dir.display()
        );
        println!();
        println!("Created directory structure:");
        println!("  .copysmith/");
        println!("  ├── copysmith.toml        # Providers, user and access settings");
        println!("  ├── {}  # Annotated request", EXAMPLE_REQUEST_FILE);
        println!("  ├── sessions/             # Saved generation sessions");
        println!("  ├── templates/            # Named request templates");
        println!("  └── logs/                 # Daily logs");
        println!();
        println!("Next steps:");
        println!("  1. Export DEEPSEEK_API_KEY (or OPENAI_API_KEY / XAI_API_KEY)");
        println!("  2. Set [user] email in .copysmith/copysmith.toml");
        println!(
            "  3. Run `copysmith generate --request .copysmith/{}`",
            EXAMPLE_REQUEST_FILE
        );
    } else {
        println!(
            "Copysmith project already initialized at {}",
            result.copysmith_dir.display()
        );
        if result.config_written {
            println!("Restored missing copysmith.toml.");
        }
        println!("Directory structure verified.");
    }

    Ok(())
}

pub fn cmd_target(project_dir: &Path, source: &RequestSource) -> Result<()> {
    let config = load_config(project_dir, false)?;
    let request = load_request(&config, source)?;

    let preset = match request.word_count {
        WordCountPreset::Custom => format!(
            "custom ({})",
            request
                .custom_word_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unset".to_string())
        ),
        other => format!("{} ({})", other, other.target().unwrap_or_default()),
    };
    let sections = structural_word_total(&request);

    println!("Preset:            {}", preset);
    println!(
        "Sections total:    {} ({} sections)",
        sections,
        request.sections.len()
    );
    println!("Prioritize count:  {}", request.prioritize_word_count);
    println!("Target word count: {}", request.target_word_count());
    Ok(())
}
