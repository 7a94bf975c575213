//! Article page description extraction.
//!
//! Given a parsed article page, derive a short description in priority
//! order: the page-level `<meta name="description">` content if present and
//! non-empty, otherwise the text of the first paragraph inside the main
//! article region (an `article` element, or any `div` whose class name
//! contains "content", case-insensitive). The result is truncated to
//! [`MAX_DESCRIPTION_CHARS`] characters to bound feed payload size.

use crate::utils::truncate_chars;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// Maximum description length, counted in characters rather than bytes.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static ARTICLE_BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Derive a bounded description from a parsed article page.
///
/// Returns `None` when neither a meta description nor a usable first
/// paragraph exists. Pure over the parsed document; fetch failures are the
/// caller's concern.
pub fn extract_description(document: &Html) -> Option<String> {
    if let Some(meta) = document.select(&META_DESCRIPTION).next() {
        if let Some(content) = meta.value().attr("content") {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return Some(truncate_chars(trimmed, MAX_DESCRIPTION_CHARS));
            }
        }
    }

    let body = document.select(&ARTICLE_BODY).next().or_else(|| {
        document.select(&DIV).find(|el| {
            el.value()
                .attr("class")
                .is_some_and(|c| c.to_ascii_lowercase().contains("content"))
        })
    })?;
    let paragraph = body.select(&PARAGRAPH).next()?;
    let text = paragraph.text().collect::<Vec<_>>().join(" ");
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| truncate_chars(trimmed, MAX_DESCRIPTION_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_description_takes_priority() {
        let html = Html::parse_document(
            r#"
            <head><meta name="description" content="From the meta tag"></head>
            <body><article><p>From the body</p></article></body>
        "#,
        );
        assert_eq!(
            extract_description(&html).as_deref(),
            Some("From the meta tag")
        );
    }

    #[test]
    fn test_empty_meta_falls_back_to_first_paragraph() {
        let html = Html::parse_document(
            r#"
            <head><meta name="description" content="  "></head>
            <body><article><p>First paragraph.</p><p>Second.</p></article></body>
        "#,
        );
        assert_eq!(
            extract_description(&html).as_deref(),
            Some("First paragraph.")
        );
    }

    #[test]
    fn test_content_div_matches_case_insensitively() {
        let html = Html::parse_document(
            r#"
            <div class="storyContent"><p>Inside the content div.</p></div>
        "#,
        );
        assert_eq!(
            extract_description(&html).as_deref(),
            Some("Inside the content div.")
        );
    }

    #[test]
    fn test_no_description_anywhere_yields_none() {
        let html = Html::parse_document(
            r#"<div class="sidebar"><p>Unrelated.</p></div>"#,
        );
        assert_eq!(extract_description(&html), None);
    }

    #[test]
    fn test_description_is_truncated_to_char_bound() {
        let long = "چ".repeat(900);
        let html = Html::parse_document(&format!(
            r#"<meta name="description" content="{long}">"#
        ));
        let description = extract_description(&html).unwrap();
        assert_eq!(description.chars().count(), MAX_DESCRIPTION_CHARS);
    }
}
