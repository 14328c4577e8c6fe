//! Prompt construction for each provider call.
//!
//! Every builder returns a [`Prompt`] pair. Structured calls end with an
//! explicit JSON shape the response parser expects.

use crate::request::{GenerationMode, GenerationRequest, calculate_target_word_count};

/// System + user message pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const COPYWRITER_SYSTEM: &str = "You are an expert marketing copywriter. You write clear, \
persuasive copy that matches the requested tone, language and length exactly.";

const ANALYST_SYSTEM: &str = "You are a senior marketing editor who evaluates copy \
objectively. Respond with JSON only.";

/// Shared brief describing the audience, voice and constraints.
pub fn build_brief(request: &GenerationRequest) -> String {
    let mut brief = String::new();
    brief.push_str(&format!("Language: {}\n", request.language));
    brief.push_str(&format!("Tone: {}\n", request.tone));
    brief.push_str(&format!(
        "Target length: about {} words\n",
        calculate_target_word_count(request)
    ));

    let optional = [
        ("Target audience", &request.target_audience),
        ("Key message", &request.key_message),
        ("Call to action", &request.call_to_action),
        ("Brand values", &request.brand_values),
        ("Additional context", &request.context),
    ];
    for (label, value) in optional {
        if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            brief.push_str(&format!("{}: {}\n", label, v));
        }
    }

    if !request.keywords.is_empty() {
        brief.push_str(&format!("Keywords to include: {}\n", request.keywords.join(", ")));
    }

    if !request.sections.is_empty() {
        brief.push_str("Structure:\n");
        for section in &request.sections {
            match section.word_count {
                Some(n) => brief.push_str(&format!("- {} (~{} words)\n", section.name, n)),
                None => brief.push_str(&format!("- {}\n", section.name)),
            }
        }
    }
    brief
}

fn copy_response_shape(request: &GenerationRequest) -> String {
    let content_shape = if request.sections.is_empty() {
        r#""content": "the full copy""#
    } else {
        r#""sections": [{"title": "section name", "content": "section copy"}]"#
    };
    if request.generate_geo_score {
        format!(
            "Respond with JSON only: {{{}, \"geo_score\": {{\"overall\": 0-100, \"breakdown\": {{\"clarity\": 0-100, \"answerability\": 0-100, \"structure\": 0-100}}, \"suggestions\": [\"...\"]}}}}",
            content_shape
        )
    } else {
        format!("Respond with JSON only: {{{}}}", content_shape)
    }
}

/// Prompt for the primary copy.
pub fn copy_prompt(request: &GenerationRequest) -> Prompt {
    let task = match request.mode {
        GenerationMode::Create => format!(
            "Write marketing copy for the following business.\n\nBusiness description:\n{}",
            request.input_text.trim()
        ),
        GenerationMode::Improve => format!(
            "Improve the following marketing copy. Keep its intent, sharpen the message.\n\nOriginal copy:\n{}",
            request.input_text.trim()
        ),
    };
    Prompt {
        system: COPYWRITER_SYSTEM.to_string(),
        user: format!(
            "{}\n\n{}\n{}",
            task,
            build_brief(request),
            copy_response_shape(request)
        ),
    }
}

/// Angles cycled through when producing alternatives.
pub const ALTERNATIVE_ANGLES: [&str; 5] = [
    "lead with the customer's problem",
    "lead with a bold benefit",
    "tell a short story",
    "use social proof",
    "create urgency",
];

/// Prompt for one alternative version of `base`.
pub fn alternative_prompt(request: &GenerationRequest, base: &str, index: usize) -> Prompt {
    let angle = ALTERNATIVE_ANGLES[index % ALTERNATIVE_ANGLES.len()];
    Prompt {
        system: COPYWRITER_SYSTEM.to_string(),
        user: format!(
            "Write a distinctly different alternative version of this copy. Angle: {}.\n\nCopy:\n{}\n\n{}\n{}",
            angle,
            base.trim(),
            build_brief(request),
            copy_response_shape(request)
        ),
    }
}

pub fn headlines_prompt(request: &GenerationRequest, base: &str, count: u32) -> Prompt {
    Prompt {
        system: COPYWRITER_SYSTEM.to_string(),
        user: format!(
            "Write {} headline options for this copy in {} with a {} tone.\n\nCopy:\n{}\n\nRespond with JSON only: {{\"headlines\": [\"...\"]}}",
            count,
            request.language,
            request.tone,
            base.trim()
        ),
    }
}

pub fn seo_prompt(request: &GenerationRequest, base: &str) -> Prompt {
    let keywords = if request.keywords.is_empty() {
        String::new()
    } else {
        format!("Focus keywords: {}\n", request.keywords.join(", "))
    };
    Prompt {
        system: ANALYST_SYSTEM.to_string(),
        user: format!(
            "Create SEO metadata in {} for this copy.\n{}\nCopy:\n{}\n\nRespond with JSON only: {{\"url_slugs\": [], \"meta_descriptions\": [], \"h1_variants\": [], \"h2_headings\": [], \"h3_headings\": [], \"og_titles\": [], \"og_descriptions\": []}}",
            request.language,
            keywords,
            base.trim()
        ),
    }
}

pub fn score_prompt(request: &GenerationRequest, text: &str, reference: &str) -> Prompt {
    Prompt {
        system: ANALYST_SYSTEM.to_string(),
        user: format!(
            "Score this copy from 0 to 100 on each dimension. Target length is {} words.\n\nCopy:\n{}\n\nOriginal input for reference:\n{}\n\nRespond with JSON only: {{\"overall\": 0, \"clarity\": 0, \"persuasiveness\": 0, \"originality\": 0, \"engagement\": 0, \"word_count_accuracy\": 0, \"improvement_explanation\": \"...\"}}",
            calculate_target_word_count(request),
            text.trim(),
            reference.trim()
        ),
    }
}

pub fn restyle_prompt(request: &GenerationRequest, text: &str, persona: &str) -> Prompt {
    Prompt {
        system: COPYWRITER_SYSTEM.to_string(),
        user: format!(
            "Rewrite this copy in the voice of {}. Keep the language ({}), the facts and roughly the same length. Return only the rewritten copy.\n\nCopy:\n{}",
            persona,
            request.language,
            text.trim()
        ),
    }
}

pub fn humanize_prompt(request: &GenerationRequest, text: &str) -> Prompt {
    Prompt {
        system: COPYWRITER_SYSTEM.to_string(),
        user: format!(
            "Rewrite this copy so it reads as if a person wrote it: vary sentence length, drop clichés and filler, keep the {} tone and the {} language. Return only the rewritten copy.\n\nCopy:\n{}",
            request.tone,
            request.language,
            text.trim()
        ),
    }
}

pub fn geo_prompt(text: &str) -> Prompt {
    Prompt {
        system: ANALYST_SYSTEM.to_string(),
        user: format!(
            "Rate how well AI assistants could find, understand and quote this copy (Generative Engine Optimization).\n\nCopy:\n{}\n\nRespond with JSON only: {{\"overall\": 0-100, \"breakdown\": {{\"clarity\": 0-100, \"answerability\": 0-100, \"structure\": 0-100, \"authority\": 0-100}}, \"suggestions\": [\"...\"]}}",
            text.trim()
        ),
    }
}

pub fn evaluate_prompt(request: &GenerationRequest) -> Prompt {
    Prompt {
        system: ANALYST_SYSTEM.to_string(),
        user: format!(
            "Evaluate how well this copywriting brief is specified, 0 to 100, and give concrete tips to improve it.\n\nMode: {}\nInput:\n{}\n\n{}\nRespond with JSON only: {{\"score\": 0, \"tips\": [\"...\"]}}",
            request.mode,
            request.input_text.trim(),
            build_brief(request)
        ),
    }
}
