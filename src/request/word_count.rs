//! Word-count target resolution.
//!
//! The target is resolved from the request's preset (or custom value) and
//! its structural sections. When `prioritize_word_count` is set and the
//! sections allocate any words, their total wins over the scalar target.

use serde::{Deserialize, Serialize};

use super::GenerationRequest;

/// Target used when a custom word count is missing or zero.
pub const DEFAULT_CUSTOM_WORD_COUNT: u32 = 150;

/// Named word-count presets.
///
/// | Preset   | Range    | Target |
/// |----------|----------|--------|
/// | `Short`  | 50-100   | 75     |
/// | `Medium` | 100-200  | 150    |
/// | `Long`   | 200-400  | 300    |
/// | `Custom` | user set | custom |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordCountPreset {
    Short,
    #[default]
    Medium,
    Long,
    Custom,
}

impl WordCountPreset {
    /// Scalar target for a preset, `None` for `Custom`.
    pub fn target(self) -> Option<u32> {
        match self {
            WordCountPreset::Short => Some(75),
            WordCountPreset::Medium => Some(150),
            WordCountPreset::Long => Some(300),
            WordCountPreset::Custom => None,
        }
    }
}

impl std::fmt::Display for WordCountPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WordCountPreset::Short => write!(f, "short"),
            WordCountPreset::Medium => write!(f, "medium"),
            WordCountPreset::Long => write!(f, "long"),
            WordCountPreset::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for WordCountPreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(WordCountPreset::Short),
            "medium" => Ok(WordCountPreset::Medium),
            "long" => Ok(WordCountPreset::Long),
            "custom" => Ok(WordCountPreset::Custom),
            _ => anyhow::bail!(
                "Invalid word count preset '{}'. Valid values: short, medium, long, custom",
                s
            ),
        }
    }
}

/// Sum of the word allocations across all structural sections.
pub fn structural_word_total(request: &GenerationRequest) -> u32 {
    request
        .sections
        .iter()
        .filter_map(|s| s.word_count)
        .fold(0u32, |acc, n| acc.saturating_add(n))
}

/// Resolve the effective word target for a request.
pub fn calculate_target_word_count(request: &GenerationRequest) -> u32 {
    let structural = structural_word_total(request);
    if request.prioritize_word_count && structural > 0 {
        return structural;
    }

    match request.word_count.target() {
        Some(target) => target,
        None => request
            .custom_word_count
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_CUSTOM_WORD_COUNT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::StructureSection;

    fn section(name: &str, words: Option<u32>) -> StructureSection {
        StructureSection {
            name: name.to_string(),
            word_count: words,
        }
    }

    fn custom(words: u32) -> GenerationRequest {
        GenerationRequest {
            word_count: WordCountPreset::Custom,
            custom_word_count: Some(words),
            ..Default::default()
        }
    }

    #[test]
    fn test_presets_resolve_to_fixed_targets() {
        for (preset, expected) in [
            (WordCountPreset::Short, 75),
            (WordCountPreset::Medium, 150),
            (WordCountPreset::Long, 300),
        ] {
            let req = GenerationRequest {
                word_count: preset,
                ..Default::default()
            };
            assert_eq!(calculate_target_word_count(&req), expected, "{preset}");
        }
    }

    #[test]
    fn test_custom_target_used_verbatim() {
        assert_eq!(calculate_target_word_count(&custom(420)), 420);
    }

    #[test]
    fn test_custom_zero_or_missing_falls_back() {
        assert_eq!(calculate_target_word_count(&custom(0)), DEFAULT_CUSTOM_WORD_COUNT);
        let req = GenerationRequest {
            word_count: WordCountPreset::Custom,
            custom_word_count: None,
            ..Default::default()
        };
        assert_eq!(calculate_target_word_count(&req), DEFAULT_CUSTOM_WORD_COUNT);
    }

    #[test]
    fn test_structural_total_wins_when_prioritized() {
        let mut req = custom(150);
        req.prioritize_word_count = true;
        req.sections = vec![
            section("Hero", Some(100)),
            section("Benefits", Some(150)),
            section("CTA", Some(50)),
        ];
        assert_eq!(calculate_target_word_count(&req), 300);
    }

    #[test]
    fn test_structural_total_ignored_without_priority() {
        let mut req = custom(150);
        req.sections = vec![section("Hero", Some(300))];
        assert_eq!(calculate_target_word_count(&req), 150);
    }

    #[test]
    fn test_zero_structural_total_falls_back_to_scalar() {
        let mut req = GenerationRequest {
            word_count: WordCountPreset::Long,
            prioritize_word_count: true,
            ..Default::default()
        };
        req.sections = vec![section("Hero", None), section("Body", Some(0))];
        assert_eq!(calculate_target_word_count(&req), 300);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut req = custom(150);
        req.prioritize_word_count = true;
        req.sections = vec![section("A", Some(120)), section("B", Some(80))];
        let first = calculate_target_word_count(&req);
        let second = calculate_target_word_count(&req);
        assert_eq!(first, second);
        assert_eq!(first, 200);
    }

    #[test]
    fn test_structural_total_saturates() {
        let mut req = custom(150);
        req.sections = vec![section("A", Some(u32::MAX)), section("B", Some(10))];
        assert_eq!(structural_word_total(&req), u32::MAX);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("LONG".parse::<WordCountPreset>().unwrap(), WordCountPreset::Long);
        assert!("huge".parse::<WordCountPreset>().is_err());
    }
}
