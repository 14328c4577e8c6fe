//! Generation request model.
//!
//! A `GenerationRequest` is the configuration bag handed to the orchestrator:
//! the text to work from, the voice to write in, the word target and which
//! optional enrichment stages to run. Requests are loaded from JSON, YAML or
//! TOML files, or from saved templates.

pub mod word_count;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::provider::ProviderKind;

pub use word_count::{WordCountPreset, calculate_target_word_count, structural_word_total};

/// Upper bound on alternatives per run.
pub const MAX_ALTERNATIVES: u32 = 10;

/// Upper bound on headlines per run.
pub const MAX_HEADLINES: u32 = 20;

/// Whether the run writes new copy or rewrites existing copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Write from a business description
    #[default]
    Create,
    /// Improve copy the user already has
    Improve,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Create => write!(f, "create"),
            GenerationMode::Improve => write!(f, "improve"),
        }
    }
}

/// One structural directive: a named section with an optional word allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
}

/// Everything the orchestrator needs to know to run a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    pub mode: GenerationMode,
    /// Business description (create) or original copy (improve)
    pub input_text: String,
    pub language: String,
    pub tone: String,
    pub target_audience: Option<String>,
    pub key_message: Option<String>,
    pub call_to_action: Option<String>,
    pub brand_values: Option<String>,
    pub keywords: Vec<String>,
    /// Free-form notes passed through to the prompt
    pub context: Option<String>,
    pub model: ProviderKind,

    pub word_count: WordCountPreset,
    pub custom_word_count: Option<u32>,
    pub sections: Vec<StructureSection>,
    pub prioritize_word_count: bool,

    pub generate_scores: bool,
    pub generate_geo_score: bool,
    pub generate_seo_metadata: bool,
    pub generate_alternative: bool,
    pub number_of_alternative_versions: u32,
    pub generate_headlines: bool,
    pub number_of_headlines: u32,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Create,
            input_text: String::new(),
            language: "English".to_string(),
            tone: "Professional".to_string(),
            target_audience: None,
            key_message: None,
            call_to_action: None,
            brand_values: None,
            keywords: Vec::new(),
            context: None,
            model: ProviderKind::default(),
            word_count: WordCountPreset::Medium,
            custom_word_count: None,
            sections: Vec::new(),
            prioritize_word_count: false,
            generate_scores: false,
            generate_geo_score: false,
            generate_seo_metadata: false,
            generate_alternative: false,
            number_of_alternative_versions: 1,
            generate_headlines: false,
            number_of_headlines: 3,
        }
    }
}

impl GenerationRequest {
    /// Load a request file. The format is picked from the extension
    /// (`.json`, `.yaml`/`.yml`, `.toml`).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file: {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let request: GenerationRequest = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML request: {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML request: {}", path.display()))?,
            _ => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON request: {}", path.display()))?,
        };
        Ok(request)
    }

    /// Check the request is runnable before any provider is contacted.
    pub fn validate(&self) -> Result<()> {
        if self.input_text.trim().is_empty() {
            match self.mode {
                GenerationMode::Create => bail!("A business description is required"),
                GenerationMode::Improve => bail!("Original copy is required to improve it"),
            }
        }
        if self.generate_alternative && self.number_of_alternative_versions > MAX_ALTERNATIVES {
            bail!(
                "At most {} alternative versions can be generated (got {})",
                MAX_ALTERNATIVES,
                self.number_of_alternative_versions
            );
        }
        if self.generate_headlines && self.number_of_headlines > MAX_HEADLINES {
            bail!(
                "At most {} headlines can be generated (got {})",
                MAX_HEADLINES,
                self.number_of_headlines
            );
        }
        Ok(())
    }

    /// Effective word target, see [`calculate_target_word_count`].
    pub fn target_word_count(&self) -> u32 {
        calculate_target_word_count(self)
    }

    /// Number of alternatives the primary run should produce.
    pub fn alternative_count(&self) -> u32 {
        if self.generate_alternative {
            self.number_of_alternative_versions
        } else {
            0
        }
    }

    /// Number of headlines the primary run should produce.
    pub fn headline_count(&self) -> u32 {
        if self.generate_headlines {
            self.number_of_headlines
        } else {
            0
        }
    }
}
