use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::access::{ConfigAccess, UserIdentity};
use crate::copy_config::{CONFIG_FILE_NAME, ConfigToml};
use crate::provider::{HttpContentProvider, LlmClient, ProviderKind};
use crate::request::GenerationRequest;

pub const PROJECT_DIR_NAME: &str = ".copysmith";

/// Runtime configuration.
///
/// Resolves the project layout under `.copysmith/` and wires the parsed
/// `copysmith.toml` into providers, access control and the user identity.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    pub copysmith_dir: PathBuf,
    pub config_file: PathBuf,
    pub sessions_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub log_dir: PathBuf,
    pub verbose: bool,
    pub toml: ConfigToml,
}

/// Fallback config file in the user's config directory.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("copysmith").join(CONFIG_FILE_NAME))
}

impl Config {
    pub fn new(project_dir: PathBuf, verbose: bool) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let copysmith_dir = project_dir.join(PROJECT_DIR_NAME);
        let config_file = copysmith_dir.join(CONFIG_FILE_NAME);

        let toml = if config_file.exists() {
            ConfigToml::load(&config_file)?
        } else {
            match global_config_path().filter(|p| p.exists()) {
                Some(path) => ConfigToml::load(&path)?,
                None => ConfigToml::default(),
            }
        };

        Ok(Self {
            sessions_dir: copysmith_dir.join("sessions"),
            templates_dir: copysmith_dir.join("templates"),
            log_dir: copysmith_dir.join("logs"),
            config_file,
            copysmith_dir,
            project_dir,
            verbose,
            toml,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.copysmith_dir.exists()
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.sessions_dir, &self.templates_dir, &self.log_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Signed-in user, if both id and email are configured.
    pub fn user(&self) -> Option<UserIdentity> {
        let email = self.toml.user_email()?;
        let id = self.toml.user_id().unwrap_or_else(|| email.clone());
        Some(UserIdentity { id, email })
    }

    pub fn access(&self) -> ConfigAccess {
        ConfigAccess::new(
            self.toml.access.allowed_emails.clone(),
            self.toml.access.denied_message.clone(),
        )
    }

    fn client(&self, kind: ProviderKind) -> LlmClient {
        let resolved = self.toml.provider(kind);
        let api_key = std::env::var(&resolved.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        tracing::debug!(
            provider = %kind,
            model = %resolved.model,
            has_key = api_key.is_some(),
            "configured provider"
        );
        LlmClient::new(
            kind,
            resolved.model,
            resolved.base_url,
            api_key,
            resolved.api_key_env,
        )
        .with_max_tokens(resolved.max_tokens)
        .with_temperature(resolved.temperature)
    }

    /// Provider with a client for every backend. Backends without a key
    /// fail with a missing-key error when first used.
    pub fn provider(&self) -> Arc<HttpContentProvider> {
        let clients = ProviderKind::ALL.iter().map(|k| self.client(*k)).collect();
        Arc::new(HttpContentProvider::new(clients))
    }

    /// Fill request fields the file sets defaults for. Only fields still at
    /// their built-in default are touched.
    pub fn apply_defaults(&self, request: &mut GenerationRequest) {
        let builtin = GenerationRequest::default();
        let defaults = &self.toml.defaults;
        if request.model == builtin.model {
            request.model = self.toml.default_model();
        }
        if request.language == builtin.language
            && let Some(ref language) = defaults.language
        {
            request.language = language.clone();
        }
        if request.tone == builtin.tone
            && let Some(ref tone) = defaults.tone
        {
            request.tone = tone.clone();
        }
        request.generate_scores |= defaults.generate_scores;
        request.generate_geo_score |= defaults.generate_geo_score;
    }
}
