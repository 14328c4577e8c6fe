//! Plain-terminal rendering of generated items.

use console::style;

use super::icons::{CHART, GLOBE, PEN, TARGET};
use crate::content::{ContentVariant, GeneratedContentItem, GeoScore, ScoreData, SeoMetadata};

const MAX_WIDTH: usize = 100;

/// Wrap width: terminal width capped at 100 columns.
pub fn wrap_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| (w.0 as usize).saturating_sub(4))
        .unwrap_or(MAX_WIDTH)
        .clamp(40, MAX_WIDTH)
}

fn indent(text: &str, width: usize) -> String {
    let options = textwrap::Options::new(width)
        .initial_indent("    ")
        .subsequent_indent("    ");
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                textwrap::fill(line, &options)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one item as a block of text.
pub fn render_item(item: &GeneratedContentItem, width: usize) -> String {
    let mut out = String::new();
    let mut header = format!(
        "{}{} {}",
        PEN,
        style(item.kind().label()).bold(),
        style(format!("[{}]", item.short_id())).dim()
    );
    if let Some(persona) = item.persona() {
        header.push_str(&format!(" {}", style(format!("as {}", persona)).cyan()));
    }
    if let Some(source) = &item.source {
        let from = match source.index {
            Some(i) => format!("from {} #{}", &source.id.to_string()[..8], i + 1),
            None => format!("from {}", &source.id.to_string()[..8]),
        };
        header.push_str(&format!(" {}", style(from).dim()));
    }
    out.push_str(&header);
    out.push('\n');

    match &item.variant {
        ContentVariant::Headlines { headlines }
        | ContentVariant::RestyledHeadlines { headlines, .. } => {
            for (i, h) in headlines.iter().enumerate() {
                out.push_str(&format!("    {}. {}\n", i + 1, h));
            }
        }
        ContentVariant::SeoMetadata { metadata } => out.push_str(&render_seo(metadata)),
        _ => {
            if let Some(text) = item.text() {
                out.push_str(&indent(&text, width));
                out.push('\n');
            }
        }
    }

    if let Some(score) = &item.score {
        out.push_str(&render_score(score));
    }
    if let Some(geo) = &item.geo_score {
        out.push_str(&render_geo(geo));
    }
    out
}

fn render_score(score: &ScoreData) -> String {
    let mut out = format!(
        "    {}Score {} {}\n",
        CHART,
        style(format!("{:.0}/100", score.overall)).cyan().bold(),
        style(format!(
            "(clarity {:.0}, persuasiveness {:.0}, originality {:.0}, engagement {:.0})",
            score.clarity, score.persuasiveness, score.originality, score.engagement
        ))
        .dim()
    );
    if let Some(acc) = score.word_count_accuracy {
        out.push_str(&format!("    {}Word count accuracy {:.0}\n", TARGET, acc));
    }
    if !score.improvement_explanation.is_empty() {
        out.push_str(&format!(
            "    {}\n",
            style(&score.improvement_explanation).italic()
        ));
    }
    out
}

fn render_geo(geo: &GeoScore) -> String {
    let mut out = format!(
        "    {}GEO {}\n",
        GLOBE,
        style(format!("{}/100", geo.overall)).cyan().bold()
    );
    for (name, value) in &geo.breakdown {
        out.push_str(&format!("      {}: {}\n", name, value));
    }
    for tip in &geo.suggestions {
        out.push_str(&format!("      - {}\n", tip));
    }
    out
}

fn render_seo(meta: &SeoMetadata) -> String {
    let groups: [(&str, &Vec<String>); 7] = [
        ("URL slugs", &meta.url_slugs),
        ("Meta descriptions", &meta.meta_descriptions),
        ("H1", &meta.h1_variants),
        ("H2", &meta.h2_headings),
        ("H3", &meta.h3_headings),
        ("OG titles", &meta.og_titles),
        ("OG descriptions", &meta.og_descriptions),
    ];
    let mut out = String::new();
    for (label, values) in groups {
        if values.is_empty() {
            continue;
        }
        out.push_str(&format!("    {}:\n", style(label).bold()));
        for v in values {
            out.push_str(&format!("      - {}\n", v));
        }
    }
    out
}

/// Print every item, separated by blank lines.
pub fn print_items(items: &[GeneratedContentItem]) {
    let width = wrap_width();
    for item in items {
        println!();
        print!("{}", render_item(item, width));
    }
    println!();
}
