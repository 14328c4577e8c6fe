//! `copysmith init`: create the `.copysmith/` directory structure.
//!
//! ```text
//! .copysmith/
//! ├── copysmith.toml         # Project configuration
//! ├── request.example.yaml   # Annotated request to copy from
//! ├── sessions/              # Saved generation sessions
//! ├── templates/             # Named request templates
//! └── logs/                  # Daily log files
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::PROJECT_DIR_NAME;
use crate::copy_config::{CONFIG_FILE_NAME, ConfigToml};

pub const EXAMPLE_REQUEST_FILE: &str = "request.example.yaml";

const EXAMPLE_REQUEST: &str = r#"# Copy this file and point `copysmith generate --request` at it.
mode: create            # create | improve
input_text: >
  Family-run sourdough bakery in York. Everything is baked before sunrise
  from organic flour milled twenty miles away.
language: English
tone: Warm
target_audience: Busy local professionals
key_message: Real bread, baked this morning
call_to_action: Pre-order for pickup
keywords: [sourdough, york bakery, organic bread]
model: deepseek         # deepseek | openai | grok
word_count: medium      # short | medium | long | custom
# custom_word_count: 220
# sections:
#   - name: Hero
#     word_count: 40
#   - name: Story
#     word_count: 120
generate_scores: true
generate_alternative: true
number_of_alternative_versions: 2
generate_headlines: true
number_of_headlines: 5
generate_seo_metadata: false
"#;

/// Result of initializing a project.
#[derive(Debug)]
pub struct InitResult {
    pub copysmith_dir: PathBuf,
    /// False if the directory already existed
    pub created: bool,
    /// True if a default `copysmith.toml` was written
    pub config_written: bool,
}

pub fn init_project(project_dir: &Path) -> Result<InitResult> {
    let copysmith_dir = get_copysmith_dir(project_dir);
    let created = !copysmith_dir.exists();

    for sub in ["sessions", "templates", "logs"] {
        let dir = copysmith_dir.join(sub);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }

    let config_file = copysmith_dir.join(CONFIG_FILE_NAME);
    let config_written = if config_file.exists() {
        false
    } else {
        ConfigToml::default().save(&config_file)?;
        true
    };

    let example = copysmith_dir.join(EXAMPLE_REQUEST_FILE);
    if !example.exists() {
        std::fs::write(&example, EXAMPLE_REQUEST)
            .with_context(|| format!("Failed to write {}", example.display()))?;
    }

    tracing::info!(dir = %copysmith_dir.display(), created, "initialized project");
    Ok(InitResult {
        copysmith_dir,
        created,
        config_written,
    })
}

pub fn is_initialized(project_dir: &Path) -> bool {
    get_copysmith_dir(project_dir).exists()
}

pub fn get_copysmith_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::GenerationRequest;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_layout() {
        let dir = tempdir().unwrap();
        let result = init_project(dir.path()).unwrap();

        assert!(result.created);
        assert!(result.config_written);
        assert!(is_initialized(dir.path()));
        for sub in ["sessions", "templates", "logs"] {
            assert!(result.copysmith_dir.join(sub).is_dir(), "missing {}", sub);
        }
        let toml = ConfigToml::load(&result.copysmith_dir.join(CONFIG_FILE_NAME)).unwrap();
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_init_is_idempotent_and_keeps_config() {
        let dir = tempdir().unwrap();
        let first = init_project(dir.path()).unwrap();
        let config = first.copysmith_dir.join(CONFIG_FILE_NAME);
        std::fs::write(&config, "[defaults]\nmodel = \"grok\"\n").unwrap();

        let second = init_project(dir.path()).unwrap();
        assert!(!second.created);
        assert!(!second.config_written);
        let toml = ConfigToml::load(&config).unwrap();
        assert_eq!(toml.defaults.model, "grok");
    }

    #[test]
    fn test_example_request_parses() {
        let dir = tempdir().unwrap();
        let result = init_project(dir.path()).unwrap();
        let request =
            GenerationRequest::load(&result.copysmith_dir.join(EXAMPLE_REQUEST_FILE)).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.number_of_alternative_versions, 2);
        assert_eq!(request.tone, "Warm");
    }
}
