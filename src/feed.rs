//! Feed rendering and RSS serialization.
//!
//! Every cycle rebuilds the feed from scratch: [`render`] projects the most
//! recent window of the archive into an in-memory [`FeedDocument`]
//! (newest first), and [`write_rss`] serializes that document as RSS 2.0
//! with the site's fixed channel metadata. The feed is never persisted as
//! state of its own.
//!
//! A stored record whose `scraped_at` cannot be parsed is skipped from the
//! feed with a warning; one bad record never aborts the whole render.

use crate::error::Error;
use crate::models::{ArchiveState, ArticleRecord};
use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{debug, instrument, warn};

/// Default number of most recent records rendered into the feed.
pub const DEFAULT_WINDOW: usize = 50;

pub const CHANNEL_TITLE: &str = "Loksujag - لوک سجاگ";
pub const CHANNEL_LINK: &str = "https://loksujag.com";
pub const CHANNEL_DESCRIPTION: &str = "Voices from the margins of power";
pub const CHANNEL_LANGUAGE: &str = "ur";
pub const CHANNEL_LOGO: &str = "https://loksujag.com/assets/logo.png";

/// Thumbnails are served as JPEG; the enclosure type is fixed.
const ENCLOSURE_TYPE: &str = "image/jpeg";

/// One feed entry, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Stable identifier: the record's URL fingerprint.
    pub guid: String,
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub author: Option<String>,
    /// Thumbnail URL carried as an enclosure.
    pub enclosure: Option<String>,
    /// HTTP-date-style publication timestamp, always UTC.
    pub pub_date: String,
}

/// The ephemeral feed model: a newest-first projection of the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    pub entries: Vec<FeedEntry>,
}

/// Project the most recent `window` records of the archive into a feed
/// document, newest first.
#[instrument(level = "info", skip(state), fields(articles = state.articles.len()))]
pub fn render(state: &ArchiveState, window: usize) -> FeedDocument {
    let start = state.articles.len().saturating_sub(window);
    let entries = state.articles[start..]
        .iter()
        .rev()
        .filter_map(|record| match entry_from_record(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(url = %record.url, error = %e, "Skipping record with bad timestamp");
                None
            }
        })
        .collect::<Vec<_>>();
    debug!(entries = entries.len(), "Rendered feed document");
    FeedDocument { entries }
}

fn entry_from_record(record: &ArticleRecord) -> Result<FeedEntry, Error> {
    let scraped_at = parse_scraped_at(record)?;
    Ok(FeedEntry {
        guid: record.fingerprint.clone(),
        title: record.title.clone(),
        link: record.url.clone(),
        description: record.description.clone(),
        author: record.author.clone(),
        enclosure: record.thumbnail.clone(),
        pub_date: scraped_at.format("%a, %d %b %Y %H:%M:%S +0000").to_string(),
    })
}

/// Parse a record's first-observation timestamp.
///
/// RFC 3339 is what this system writes; the offset-less ISO form is
/// accepted as well (older cache files carry it) and read as UTC.
fn parse_scraped_at(record: &ArticleRecord) -> Result<DateTime<Utc>, Error> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(&record.scraped_at) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&record.scraped_at, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    Err(Error::InvalidTimestamp {
        url: record.url.clone(),
        value: record.scraped_at.clone(),
    })
}

/// Serialize a feed document as an RSS 2.0 byte stream.
#[instrument(level = "info", skip_all, fields(entries = document.entries.len()))]
pub fn write_rss(document: &FeedDocument) -> Result<Vec<u8>, Error> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut rss_start = BytesStart::new("rss");
    rss_start.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss_start))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", CHANNEL_TITLE)?;
    write_text_element(&mut writer, "link", CHANNEL_LINK)?;
    write_text_element(&mut writer, "description", CHANNEL_DESCRIPTION)?;
    write_text_element(&mut writer, "language", CHANNEL_LANGUAGE)?;

    writer.write_event(Event::Start(BytesStart::new("image")))?;
    write_text_element(&mut writer, "url", CHANNEL_LOGO)?;
    write_text_element(&mut writer, "title", CHANNEL_TITLE)?;
    write_text_element(&mut writer, "link", CHANNEL_LINK)?;
    writer.write_event(Event::End(BytesEnd::new("image")))?;

    for entry in &document.entries {
        writer.write_event(Event::Start(BytesStart::new("item")))?;

        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "false"));
        writer.write_event(Event::Start(guid))?;
        writer.write_event(Event::Text(BytesText::new(&entry.guid)))?;
        writer.write_event(Event::End(BytesEnd::new("guid")))?;

        write_text_element(&mut writer, "title", &entry.title)?;
        write_text_element(&mut writer, "link", &entry.link)?;
        if let Some(description) = &entry.description {
            write_text_element(&mut writer, "description", description)?;
        }
        if let Some(author) = &entry.author {
            write_text_element(&mut writer, "author", author)?;
        }
        if let Some(enclosure) = &entry.enclosure {
            let mut enc = BytesStart::new("enclosure");
            enc.push_attribute(("url", enclosure.as_str()));
            enc.push_attribute(("length", "0"));
            enc.push_attribute(("type", ENCLOSURE_TYPE));
            writer.write_event(Event::Empty(enc))?;
        }
        write_text_element(&mut writer, "pubDate", &entry.pub_date)?;

        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    Ok(writer.into_inner())
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
