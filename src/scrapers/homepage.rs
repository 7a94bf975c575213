//! Homepage card extraction.
//!
//! The loksujag.com homepage lays articles out as repeated "card" containers
//! whose class names contain the string `Card`. Each card is reduced to a
//! [`Candidate`] by evaluating a fixed table of field rules against the
//! card element: a story link and a title are required, the author profile
//! link and thumbnail image are optional.
//!
//! # URL Pattern
//!
//! Qualifying links point at `/story/` or `/special-edition/` paths.
//! Relative hrefs are resolved against the site origin before the URL is
//! used as the dedup key.
//!
//! Extraction is pure: it takes an already-parsed document, so it is
//! testable without any network access.

use crate::models::Candidate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// Path fragments that mark a card link as an article link.
const STORY_PATH_PATTERNS: &[&str] = &["/story/", "/special-edition/"];

static CARD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[class*="Card"]"#).unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h4, h5").unwrap());
static AUTHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="/author/"]"#).unwrap());
static THUMB_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"img[alt="thumb"]"#).unwrap());

/// The card fields the rule table can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Link,
    Title,
    Author,
    Thumbnail,
}

/// One extraction rule: which field it fills, whether a card without it is
/// dropped, and how the value is pulled out of the card element.
struct FieldRule {
    field: Field,
    required: bool,
    extract: fn(ElementRef) -> Option<String>,
}

static CARD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Link,
        required: true,
        extract: extract_story_href,
    },
    FieldRule {
        field: Field::Title,
        required: true,
        extract: extract_title,
    },
    FieldRule {
        field: Field::Author,
        required: false,
        extract: extract_author,
    },
    FieldRule {
        field: Field::Thumbnail,
        required: false,
        extract: extract_thumbnail,
    },
];

/// Extract every candidate article from a parsed homepage document.
///
/// Cards missing a required field are skipped, not errors. Candidate order
/// follows document order.
pub fn extract_candidates(document: &Html, base: &Url) -> Vec<Candidate> {
    document
        .select(&CARD_SELECTOR)
        .filter_map(|card| candidate_from_card(card, base))
        .collect()
}

/// Evaluate the rule table against one card container.
fn candidate_from_card(card: ElementRef, base: &Url) -> Option<Candidate> {
    let mut values: Vec<(Field, String)> = Vec::with_capacity(CARD_RULES.len());
    for rule in CARD_RULES {
        match (rule.extract)(card) {
            Some(value) => values.push((rule.field, value)),
            None if rule.required => {
                debug!(field = ?rule.field, "Card missing required field; skipping");
                return None;
            }
            None => {}
        }
    }
    let field =
        |f: Field| -> Option<String> { values.iter().find(|(k, _)| *k == f).map(|(_, v)| v.clone()) };

    let href = field(Field::Link)?;
    let title = field(Field::Title)?;
    // A href the URL parser rejects makes the whole card unusable.
    let url = base.join(&href).ok()?.to_string();
    Some(Candidate {
        url,
        title,
        author: field(Field::Author),
        thumbnail: field(Field::Thumbnail),
        slug: slug_from_href(&href),
    })
}

fn extract_story_href(card: ElementRef) -> Option<String> {
    card.select(&LINK_SELECTOR)
        .filter_map(|el| el.value().attr("href"))
        .find(|href| STORY_PATH_PATTERNS.iter().any(|p| href.contains(p)))
        .map(str::to_string)
}

fn extract_title(card: ElementRef) -> Option<String> {
    let heading = card.select(&TITLE_SELECTOR).next()?;
    let text = heading.text().collect::<Vec<_>>().join(" ");
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn extract_author(card: ElementRef) -> Option<String> {
    let link = card.select(&AUTHOR_SELECTOR).next()?;
    let text = link.text().collect::<Vec<_>>().join(" ");
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn extract_thumbnail(card: ElementRef) -> Option<String> {
    card.select(&THUMB_SELECTOR)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}

/// Last path segment of the article href.
fn slug_from_href(href: &str) -> String {
    href.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
