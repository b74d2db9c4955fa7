//! # Feed Parser
//!
//! Parses RSS 2.0 (and RSS 1.0) channels and Atom feeds into a [`FeedSnapshot`]
//! using the `quick-xml` pull reader. Only the fields the bot renders are kept.

use crate::domain::markup::decode_entities;
use crate::domain::types::{Episode, FeedSnapshot};
use chrono::{DateTime, FixedOffset};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("document is not an RSS or Atom feed (root element <{0}>)")]
    NotAFeed(String),
    #[error("feed contains no episodes")]
    NoEpisodes,
}

/// Item fields collected while inside `<item>` / `<entry>`.
#[derive(Default)]
struct ItemBuilder {
    episode: Episode,
    encoded: Option<String>,
    description: Option<String>,
    updated: Option<String>,
}

impl ItemBuilder {
    fn finish(self) -> Episode {
        let mut episode = self.episode;
        if episode.published_raw.is_empty()
            && let Some(updated) = self.updated
        {
            episode.published_raw = updated;
        }
        episode.published = parse_date(&episode.published_raw);
        episode.content = self.encoded.or(self.description).unwrap_or_default();
        episode
    }
}

/// Parses a date the way podcast feeds write them: RFC 2822 for RSS, RFC 3339 for Atom.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

fn qualified_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn local(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

fn is_item(name: &str) -> bool {
    matches!(name, "item" | "entry")
}

fn is_channel(name: &str) -> bool {
    matches!(name, "channel" | "feed")
}

/// Returns `(rel, href)` for `<link href=..>` and `url` for `<enclosure url=..>`.
fn link_attributes(e: &BytesStart) -> (Option<String>, Option<String>) {
    let mut rel = None;
    let mut href = None;
    for attr in e.attributes().flatten() {
        let value = attr.unescape_value().map(|v| v.into_owned()).ok();
        match attr.key.local_name().as_ref() {
            b"rel" => rel = value,
            b"href" | b"url" => href = value,
            _ => {}
        }
    }
    (rel, href)
}

/// Handles the attribute-carrying elements (`<link href>`, `<enclosure url>`).
fn apply_attributes(
    e: &BytesStart,
    name: &str,
    parent: &str,
    snapshot: &mut FeedSnapshot,
    current: &mut Option<ItemBuilder>,
) {
    if name != "link" && name != "enclosure" {
        return;
    }
    let (rel, href) = link_attributes(e);
    let Some(href) = href else {
        return;
    };
    let rel = rel.unwrap_or_else(|| {
        if name == "enclosure" { "enclosure" } else { "alternate" }.to_string()
    });

    match (current.as_mut(), rel.as_str()) {
        (Some(item), "enclosure") if is_item(parent) => {
            item.episode.enclosure.get_or_insert(href);
        }
        (Some(item), "alternate") if is_item(parent) => {
            if item.episode.link.is_empty() {
                item.episode.link = href;
            }
        }
        (None, "alternate") if is_channel(parent) => {
            snapshot.link.get_or_insert(href);
        }
        _ => {}
    }
}

pub fn parse_feed(xml: &str) -> Result<FeedSnapshot, FeedError> {
    let mut reader = Reader::from_str(xml);
    let mut snapshot = FeedSnapshot::default();
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut current: Option<ItemBuilder> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let qname = qualified_name(&e);
                let name = local(&qname).to_string();
                if stack.is_empty() && !matches!(name.as_str(), "rss" | "feed" | "RDF") {
                    return Err(FeedError::NotAFeed(qname));
                }
                if is_item(&name) {
                    current = Some(ItemBuilder::default());
                }
                let parent = stack.last().map(|p| local(p).to_string()).unwrap_or_default();
                apply_attributes(&e, &name, &parent, &mut snapshot, &mut current);
                stack.push(qname);
                text.clear();
            }
            Event::Empty(e) => {
                let qname = qualified_name(&e);
                if stack.is_empty() {
                    return Err(FeedError::NotAFeed(qname));
                }
                let name = local(&qname);
                let parent = stack.last().map(|p| local(p).to_string()).unwrap_or_default();
                apply_attributes(&e, name, &parent, &mut snapshot, &mut current);
            }
            Event::Text(t) => match t.unescape() {
                Ok(s) => text.push_str(&s),
                Err(_) => text.push_str(&decode_entities(&String::from_utf8_lossy(&t))),
            },
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::End(_) => {
                let Some(qname) = stack.pop() else {
                    continue;
                };
                let name = local(&qname);
                let parent = stack.last().map(|p| local(p)).unwrap_or("");
                let value = text.trim().to_string();
                text.clear();

                if is_item(name) {
                    if let Some(item) = current.take() {
                        snapshot.episodes.push(item.finish());
                    }
                    continue;
                }

                if let Some(item) = current.as_mut() {
                    if value.is_empty() {
                        continue;
                    }
                    let direct = is_item(parent);
                    // Unprefixed elements win over namespaced duplicates such as
                    // `itunes:title` or `dc:date`; those only fill gaps.
                    let plain = qname.len() == name.len();
                    match name {
                        "title" if direct && (plain || item.episode.title.is_empty()) => {
                            item.episode.title = value
                        }
                        "link" if direct && (plain || item.episode.link.is_empty()) => item.episode.link = value,
                        "pubDate" | "published" | "date"
                            if direct && (plain || item.episode.published_raw.is_empty()) =>
                        {
                            item.episode.published_raw = value
                        }
                        "updated" if direct => item.updated = Some(value),
                        "encoded" if qname.starts_with("content:") => item.encoded = Some(value),
                        "content" if direct => item.encoded = Some(value),
                        "description" | "summary" if item.description.is_none() => {
                            item.description = Some(value)
                        }
                        _ => {}
                    }
                } else if is_channel(parent) && !value.is_empty() {
                    match name {
                        "title" => {
                            snapshot.title.get_or_insert(value);
                        }
                        "link" => {
                            snapshot.link.get_or_insert(value);
                        }
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if snapshot.episodes.is_empty() {
        return Err(FeedError::NoEpisodes);
    }
    snapshot.fetched_at = chrono::Utc::now().timestamp();
    Ok(snapshot)
}
