use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Variant tag of a generated item, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Improved,
    Alternative,
    Humanized,
    RestyledImproved,
    RestyledAlternative,
    Headlines,
    RestyledHeadlines,
    SeoMetadata,
}

impl ContentKind {
    /// Human-readable label used in terminal output.
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Improved => "Improved copy",
            ContentKind::Alternative => "Alternative copy",
            ContentKind::Humanized => "Humanized copy",
            ContentKind::RestyledImproved => "Restyled copy",
            ContentKind::RestyledAlternative => "Restyled alternative",
            ContentKind::Headlines => "Headlines",
            ContentKind::RestyledHeadlines => "Restyled headlines",
            ContentKind::SeoMetadata => "SEO metadata",
        }
    }

    /// Kind of item produced by a persona restyle of this kind, if restyling applies.
    pub fn restyled(self) -> Option<ContentKind> {
        match self {
            ContentKind::Improved => Some(ContentKind::RestyledImproved),
            ContentKind::Alternative => Some(ContentKind::RestyledAlternative),
            ContentKind::Headlines => Some(ContentKind::RestyledHeadlines),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContentKind::Improved => "improved",
            ContentKind::Alternative => "alternative",
            ContentKind::Humanized => "humanized",
            ContentKind::RestyledImproved => "restyled_improved",
            ContentKind::RestyledAlternative => "restyled_alternative",
            ContentKind::Headlines => "headlines",
            ContentKind::RestyledHeadlines => "restyled_headlines",
            ContentKind::SeoMetadata => "seo_metadata",
        };
        write!(f, "{}", s)
    }
}

/// A titled block of structured copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopySection {
    pub title: String,
    pub content: String,
}

/// Body of a copy item: plain text, or sections when the request had structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CopyBody {
    Text(String),
    Sections(Vec<CopySection>),
}

impl CopyBody {
    /// Flatten to plain text; sections render as markdown headings.
    pub fn to_plain_text(&self) -> String {
        match self {
            CopyBody::Text(text) => text.clone(),
            CopyBody::Sections(sections) => sections
                .iter()
                .map(|s| format!("## {}\n{}", s.title, s.content))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CopyBody::Text(text) => text.trim().is_empty(),
            CopyBody::Sections(sections) => sections.iter().all(|s| s.content.trim().is_empty()),
        }
    }
}

impl From<&str> for CopyBody {
    fn from(text: &str) -> Self {
        CopyBody::Text(text.to_string())
    }
}

impl From<String> for CopyBody {
    fn from(text: String) -> Self {
        CopyBody::Text(text)
    }
}

/// Quality scores for a piece of copy, 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreData {
    pub overall: f32,
    pub clarity: f32,
    pub persuasiveness: f32,
    pub originality: f32,
    pub engagement: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count_accuracy: Option<f32>,
    #[serde(default)]
    pub improvement_explanation: String,
}

/// Generative Engine Optimization score: how discoverable the copy is
/// to AI assistants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoScore {
    #[serde(deserialize_with = "rounded_score")]
    pub overall: u32,
    #[serde(default, deserialize_with = "rounded_breakdown")]
    pub breakdown: BTreeMap<String, u32>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

// Models sometimes answer 71.5 where 71 was asked for.
fn rounded_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(0.0, 100.0) as u32)
}

fn rounded_breakdown<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, u32>, D::Error> {
    let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(k, v)| (k, v.round().clamp(0.0, 100.0) as u32))
        .collect())
}

/// SEO metadata bundle derived from the primary copy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoMetadata {
    pub url_slugs: Vec<String>,
    pub meta_descriptions: Vec<String>,
    pub h1_variants: Vec<String>,
    pub h2_headings: Vec<String>,
    pub h3_headings: Vec<String>,
    pub og_titles: Vec<String>,
    pub og_descriptions: Vec<String>,
}

/// Feedback on how well a request is specified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptEvaluation {
    pub score: u32,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// Back-reference from a derived item to the item it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: Uuid,
    pub kind: ContentKind,
    /// Loop position for alternatives produced during a primary run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// Variant payloads. Each variant carries only what applies to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentVariant {
    Improved { content: CopyBody },
    Alternative { content: CopyBody },
    Humanized { content: CopyBody },
    RestyledImproved { content: CopyBody, persona: String },
    RestyledAlternative { content: CopyBody, persona: String },
    Headlines { headlines: Vec<String> },
    RestyledHeadlines { headlines: Vec<String>, persona: String },
    SeoMetadata { metadata: SeoMetadata },
}

impl ContentVariant {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentVariant::Improved { .. } => ContentKind::Improved,
            ContentVariant::Alternative { .. } => ContentKind::Alternative,
            ContentVariant::Humanized { .. } => ContentKind::Humanized,
            ContentVariant::RestyledImproved { .. } => ContentKind::RestyledImproved,
            ContentVariant::RestyledAlternative { .. } => ContentKind::RestyledAlternative,
            ContentVariant::Headlines { .. } => ContentKind::Headlines,
            ContentVariant::RestyledHeadlines { .. } => ContentKind::RestyledHeadlines,
            ContentVariant::SeoMetadata { .. } => ContentKind::SeoMetadata,
        }
    }

    /// Build a restyled variant of `kind` from provider output.
    ///
    /// Headline kinds split the text into one headline per non-empty line.
    pub fn restyled(kind: ContentKind, text: String, persona: &str) -> Option<Self> {
        let persona = persona.to_string();
        match kind {
            ContentKind::RestyledImproved => Some(ContentVariant::RestyledImproved {
                content: CopyBody::Text(text),
                persona,
            }),
            ContentKind::RestyledAlternative => Some(ContentVariant::RestyledAlternative {
                content: CopyBody::Text(text),
                persona,
            }),
            ContentKind::RestyledHeadlines => Some(ContentVariant::RestyledHeadlines {
                headlines: split_headlines(&text),
                persona,
            }),
            _ => None,
        }
    }
}

fn split_headlines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect()
}

/// One unit of generated output tracked in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContentItem {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_score: Option<GeoScore>,
    pub variant: ContentVariant,
}

impl GeneratedContentItem {
    /// Create an item with a fresh id and the current timestamp.
    pub fn new(variant: ContentVariant, source: Option<SourceRef>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source,
            score: None,
            geo_score: None,
            variant,
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.variant.kind()
    }

    /// Reference to this item for use as a derived item's source.
    pub fn as_source(&self, index: Option<usize>) -> SourceRef {
        SourceRef {
            id: self.id,
            kind: self.kind(),
            index,
        }
    }

    /// Text of the item, or `None` for SEO metadata.
    ///
    /// Headlines are joined one per line.
    pub fn text(&self) -> Option<String> {
        match &self.variant {
            ContentVariant::Improved { content }
            | ContentVariant::Alternative { content }
            | ContentVariant::Humanized { content }
            | ContentVariant::RestyledImproved { content, .. }
            | ContentVariant::RestyledAlternative { content, .. } => Some(content.to_plain_text()),
            ContentVariant::Headlines { headlines }
            | ContentVariant::RestyledHeadlines { headlines, .. } => Some(headlines.join("\n")),
            ContentVariant::SeoMetadata { .. } => None,
        }
    }

    /// True when the item carries non-blank text.
    pub fn has_content(&self) -> bool {
        self.text().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn persona(&self) -> Option<&str> {
        match &self.variant {
            ContentVariant::RestyledImproved { persona, .. }
            | ContentVariant::RestyledAlternative { persona, .. }
            | ContentVariant::RestyledHeadlines { persona, .. } => Some(persona),
            _ => None,
        }
    }

    /// Short id prefix for display.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}
