//! Project configuration file, `.copysmith/copysmith.toml`.
//!
//! Values are layered file → environment → CLI. API keys are never read from
//! the file; each provider names the environment variable holding its key.
//!
//! ```toml
//! [user]
//! id = "local"
//! email = "owner@bakery.test"
//!
//! [defaults]
//! model = "deepseek"
//! language = "English"
//! tone = "Friendly"
//! generate_scores = true
//!
//! [providers.openai]
//! model = "gpt-4o-mini"
//! temperature = 0.7
//! api_key_env = "OPENAI_API_KEY"
//!
//! [access]
//! allowed_emails = ["owner@bakery.test"]
//! denied_message = "Ask an admin for access"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::provider::ProviderKind;

pub const CONFIG_FILE_NAME: &str = "copysmith.toml";

/// Identity used for the authentication and access checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Defaults applied to every request that does not set them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsSection {
    /// Model family name: deepseek, openai or grok
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub generate_scores: bool,
    #[serde(default)]
    pub generate_geo_score: bool,
}

fn default_model() -> String {
    ProviderKind::default().to_string()
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            language: None,
            tone: None,
            generate_scores: false,
            generate_geo_score: false,
        }
    }
}

/// Per-backend overrides. Unset fields fall back to the backend defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSection {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
}

/// Email allow-list for on-demand actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessSection {
    /// Empty means everyone is allowed
    #[serde(default)]
    pub allowed_emails: Vec<String>,
    #[serde(default)]
    pub denied_message: Option<String>,
}

/// The complete copysmith.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigToml {
    #[serde(default)]
    pub user: UserSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    /// Keyed by backend name (deepseek, openai, grok)
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSection>,
    #[serde(default)]
    pub access: AccessSection,
}

/// Backend settings after applying file overrides to the built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProvider {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub api_key_env: String,
}

pub const DEFAULT_MAX_TOKENS: u32 = 4096;

impl ConfigToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse copysmith.toml")
    }

    /// Load `copysmith.toml` from `dir`, or defaults if it does not exist.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize copysmith.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Default model family, falling back to DeepSeek if the file names an
    /// unknown one.
    pub fn default_model(&self) -> ProviderKind {
        self.defaults.model.parse().unwrap_or_default()
    }

    /// User id: env `COPYSMITH_USER_ID` wins over the file.
    pub fn user_id(&self) -> Option<String> {
        std::env::var("COPYSMITH_USER_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.user.id.clone())
    }

    /// User email: env `COPYSMITH_USER_EMAIL` wins over the file.
    pub fn user_email(&self) -> Option<String> {
        std::env::var("COPYSMITH_USER_EMAIL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.user.email.clone())
    }

    pub fn provider(&self, kind: ProviderKind) -> ResolvedProvider {
        let section = self
            .providers
            .get(&kind.to_string())
            .cloned()
            .unwrap_or_default();
        ResolvedProvider {
            kind,
            model: section
                .model
                .unwrap_or_else(|| kind.default_model().to_string()),
            base_url: section
                .base_url
                .unwrap_or_else(|| kind.default_base_url().to_string()),
            max_tokens: section.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: section.temperature,
            api_key_env: section
                .api_key_env
                .unwrap_or_else(|| kind.default_api_key_env().to_string()),
        }
    }

    /// Return human-readable warnings. An empty list means the file is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.defaults.model.parse::<ProviderKind>().is_err() {
            warnings.push(format!(
                "Invalid default model '{}': expected deepseek, openai or grok",
                self.defaults.model
            ));
        }

        for (name, section) in &self.providers {
            if name.parse::<ProviderKind>().is_err() {
                warnings.push(format!("Unknown provider section [providers.{}]", name));
            }
            if let Some(ref model) = section.model
                && model.trim().is_empty()
            {
                warnings.push(format!("Empty model id for provider '{}'", name));
            }
            if let Some(t) = section.temperature
                && !(0.0..=2.0).contains(&t)
            {
                warnings.push(format!(
                    "Temperature {} for provider '{}' is outside 0.0-2.0",
                    t, name
                ));
            }
            if section.max_tokens == Some(0) {
                warnings.push(format!("max_tokens for provider '{}' must be > 0", name));
            }
        }

        for email in &self.access.allowed_emails {
            if !email.contains('@') {
                warnings.push(format!("Allowed email '{}' does not look like an email", email));
            }
        }

        warnings
    }
}
