//! Sanitizer — bounds every field of a generation for display.
//!
//! Blank fields get defaults, strings are trimmed and clamped to a per-field
//! character limit (ending in `…` when cut), and collections are capped.

use crate::portfolio::models::{Generation, RawGeneration, RawSection, Section};

pub const ELLIPSIS: char = '…';

pub const NAME_LIMIT: usize = 48;
pub const HEADLINE_LIMIT: usize = 72;
pub const BIO_LIMIT: usize = 220;
pub const SECTION_TITLE_LIMIT: usize = 28;
pub const SECTION_ITEM_LIMIT: usize = 60;
pub const CALL_TO_ACTION_LIMIT: usize = 80;

pub const MAX_SECTIONS: usize = 4;
pub const MAX_SECTION_ITEMS: usize = 3;

pub const DEFAULT_NAME: &str = "Your Name";
pub const DEFAULT_HEADLINE: &str = "Your one-line headline";
pub const DEFAULT_BIO: &str = "A concise bio that highlights your strengths, focus areas, \
    and what you’re looking to build next.";
pub const DEFAULT_SECTION_TITLE: &str = "Section";
pub const DEFAULT_CALL_TO_ACTION: &str = "Get in touch to collaborate.";

/// Trims `value`; if it is longer than `max` characters, keeps the first
/// `max - 1`, trims trailing whitespace and appends the ellipsis.
pub fn clamp(value: &str, max: usize) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= max {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(max.saturating_sub(1)).collect();
    cut.truncate(cut.trim_end().len());
    cut.push(ELLIPSIS);
    cut
}

fn field_or_default(value: Option<&str>, default: &str, max: usize) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => clamp(v, max),
        None => clamp(default, max),
    }
}

pub fn sanitize(raw: RawGeneration) -> Generation {
    Generation {
        name: field_or_default(raw.name.as_deref(), DEFAULT_NAME, NAME_LIMIT),
        headline: field_or_default(raw.headline.as_deref(), DEFAULT_HEADLINE, HEADLINE_LIMIT),
        bio: field_or_default(raw.bio.as_deref(), DEFAULT_BIO, BIO_LIMIT),
        sections: raw
            .sections
            .unwrap_or_default()
            .into_iter()
            .take(MAX_SECTIONS)
            .map(sanitize_section)
            .collect(),
        call_to_action: field_or_default(
            raw.call_to_action.as_deref(),
            DEFAULT_CALL_TO_ACTION,
            CALL_TO_ACTION_LIMIT,
        ),
    }
}

fn sanitize_section(section: RawSection) -> Section {
    Section {
        title: field_or_default(
            section.title.as_deref(),
            DEFAULT_SECTION_TITLE,
            SECTION_TITLE_LIMIT,
        ),
        items: section
            .items
            .unwrap_or_default()
            .iter()
            .map(|item| clamp(item, SECTION_ITEM_LIMIT))
            .filter(|item| !item.is_empty())
            .take(MAX_SECTION_ITEMS)
            .collect(),
    }
}
