//! Extraction of structured payloads from model output.
//!
//! Models are asked for JSON but may wrap it in prose or markdown fences,
//! so every structured call goes through [`parse_json_payload`].

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

use crate::content::{CopyBody, CopySection, GeoScore};
use crate::errors::ProviderError;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n(.*?)\n?```\s*$").expect("static regex")
    })
}

/// Remove a surrounding markdown code fence, if the whole text is one.
pub fn strip_code_fences(text: &str) -> &str {
    match fence_regex().captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text,
    }
}

/// Clean free-text output: drop fences and surrounding quotes.
pub fn clean_text(text: &str) -> String {
    let text = strip_code_fences(text).trim();
    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    text.trim().to_string()
}

/// Extract a JSON object from text that may contain other content.
///
/// Looks for the outermost `{...}` pattern, skipping braces inside strings.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a typed JSON payload out of model output.
pub fn parse_json_payload<T: DeserializeOwned>(text: &str, what: &str) -> Result<T, ProviderError> {
    let json = extract_json_object(text)
        .ok_or_else(|| ProviderError::InvalidResponse(format!("No JSON object in {} output", what)))?;
    serde_json::from_str(json)
        .map_err(|e| ProviderError::InvalidResponse(format!("Malformed {} JSON: {}", what, e)))
}

#[derive(Debug, serde::Deserialize)]
struct CopyPayload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    sections: Vec<CopySection>,
    #[serde(default)]
    geo_score: Option<serde_json::Value>,
}

impl CopyPayload {
    /// A malformed inline GEO score is dropped; the copy itself is kept.
    fn geo(&mut self) -> Option<GeoScore> {
        let value = self.geo_score.take()?;
        match serde_json::from_value(value) {
            Ok(geo) => Some(geo),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed inline geo_score");
                None
            }
        }
    }
}

/// Parse generated copy. Falls back to the raw text when the model ignored
/// the JSON instruction.
pub fn parse_copy(text: &str) -> Result<(CopyBody, Option<GeoScore>), ProviderError> {
    let payload = extract_json_object(text)
        .and_then(|json| serde_json::from_str::<CopyPayload>(json).ok());

    match payload {
        Some(mut p) if !p.sections.is_empty() => {
            let geo = p.geo();
            Ok((CopyBody::Sections(p.sections), geo))
        }
        Some(mut p) if p.content.as_deref().is_some_and(|c| !c.trim().is_empty()) => {
            let geo = p.geo();
            let content = p.content.unwrap_or_default();
            Ok((CopyBody::Text(content.trim().to_string()), geo))
        }
        _ => {
            let cleaned = clean_text(text);
            if cleaned.is_empty() {
                return Err(ProviderError::InvalidResponse(
                    "Provider returned empty copy".to_string(),
                ));
            }
            Ok((CopyBody::Text(cleaned), None))
        }
    }
}
