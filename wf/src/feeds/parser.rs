//! RSS 2.0 / Atom feed parsing into post records
//!
//! Feeds come from a known generator with a flat structure, so entries and
//! their child elements are located with string scanning and a few regexes
//! rather than a full XML parser. Each record field has its own extraction
//! function so a quirk in one field never loses the others.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use tracing::debug;

use super::PostRecord;

const UNTITLED: &str = "Untitled";

static POSTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"poster=["']([^"']+)["']"#).expect("valid poster regex"));
static IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src=["']([^"']+)["']"#).expect("valid img regex"));
static LIKES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:赞|点赞|likes?)").expect("valid likes regex"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|lt|gt|amp|quot|apos);").expect("valid entity regex")
});
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<link\b[^>]*\bhref=["']([^"']+)["']"#).expect("valid href regex"));

/// Turns raw feed documents into post records
#[derive(Debug, Clone)]
pub struct FeedParser {
    max_entries: usize,
    image_proxy_base: String,
}

impl FeedParser {
    pub fn new(max_entries: usize, image_proxy_base: impl Into<String>) -> Self {
        Self {
            max_entries,
            image_proxy_base: image_proxy_base.into(),
        }
    }

    /// Parse a feed, attributing every record to `author`
    ///
    /// Returns an empty list for documents that are not RSS or Atom.
    pub fn parse(&self, raw: &str, author: &str, author_tags: &[String]) -> Vec<PostRecord> {
        debug!(%author, raw_len = raw.len(), "parse: called");
        let entries = entry_blocks(raw);
        debug!(%author, entries = entries.len(), "parse: entries found");

        entries
            .into_iter()
            .take(self.max_entries)
            .enumerate()
            .map(|(index, block)| self.parse_entry(index, block, author, author_tags))
            .collect()
    }

    fn parse_entry(&self, index: usize, block: &str, author: &str, author_tags: &[String]) -> PostRecord {
        let body = ["description", "summary", "content:encoded", "content"]
            .iter()
            .find_map(|tag| element_text(block, tag).filter(|t| !t.trim().is_empty()))
            .unwrap_or_default();

        let title = element_text(block, "title")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        let link = entry_link(block);
        let upvotes = element_text(block, "upvotes");
        let published = element_text(block, "pubDate").or_else(|| element_text(block, "published"));

        PostRecord {
            id: extract_note_id(&link, index),
            title,
            cover_image: extract_cover_image(&body, &self.image_proxy_base),
            liked_count: extract_liked_count(upvotes.as_deref(), &body),
            published: extract_published(published.as_deref()),
            note_url: link,
            description: body,
            author: author.to_string(),
            author_tags: author_tags.to_vec(),
        }
    }
}

/// Note id from a post link, `note_<index>` when the link has no known marker
pub fn extract_note_id(link: &str, index: usize) -> String {
    for marker in ["/discovery/item/", "/explore/"] {
        if link.contains(marker) {
            let tail = link.rsplit(marker).next().unwrap_or_default();
            return tail.split('?').next().unwrap_or_default().to_string();
        }
    }
    format!("note_{}", index)
}

/// Cover image from a post body: video poster first, then the first `<img>`
pub fn extract_cover_image(body: &str, proxy_base: &str) -> String {
    POSTER_RE
        .captures(body)
        .or_else(|| IMG_RE.captures(body))
        .and_then(|c| c.get(1))
        .map(|m| proxy_image(m.as_str(), proxy_base))
        .unwrap_or_default()
}

/// Like count from the `upvotes` field, else from "123 likes"/"123赞" text in the body
pub fn extract_liked_count(upvotes: Option<&str>, body: &str) -> u64 {
    if let Some(count) = upvotes.and_then(|u| u.trim().parse::<u64>().ok()) {
        return count;
    }
    LIKES_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Publication date as `YYYY-MM-DD` (UTC)
///
/// Unparseable timestamps keep their first ten characters.
pub fn extract_published(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    let parsed = DateTime::parse_from_rfc2822(raw).or_else(|_| DateTime::parse_from_rfc3339(raw));
    match parsed {
        Ok(dt) => Some(dt.with_timezone(&Utc).format("%Y-%m-%d").to_string()),
        Err(_) => Some(raw.chars().take(10).collect()),
    }
}

/// Route an image through the hotlink-avoiding proxy
pub fn proxy_image(url: &str, proxy_base: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    format!("{}{}", proxy_base, urlencoding::encode(url))
}

/// Bodies of `<item>` (RSS) or `<entry>` (Atom) elements
fn entry_blocks(raw: &str) -> Vec<&str> {
    let tag = if raw.contains("<rss") || raw.contains("<rdf:RDF") {
        "item"
    } else if raw.contains("<feed") {
        "entry"
    } else {
        debug!("entry_blocks: no RSS or Atom root");
        return Vec::new();
    };

    let mut blocks = Vec::new();
    let mut rest = raw;
    while let Some((inner, after)) = next_element(rest, tag) {
        blocks.push(inner);
        rest = after;
    }
    blocks
}

/// Find the next `<tag ...>inner</tag>`; returns the inner text and the remainder
fn next_element<'a>(haystack: &'a str, tag: &str) -> Option<(&'a str, &'a str)> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut search_from = 0;

    loop {
        let start = search_from + haystack[search_from..].find(&open)?;
        let after_name = start + open.len();
        // Reject longer names sharing the prefix (`<itemCount`, `<content:encoded` for `content`)
        match haystack[after_name..].chars().next() {
            Some('>') | Some('/') => {}
            Some(c) if c.is_whitespace() => {}
            _ => {
                search_from = after_name;
                continue;
            }
        }

        let tag_end = after_name + haystack[after_name..].find('>')?;
        if haystack[..tag_end].ends_with('/') {
            // Self-closing: no text content
            return Some(("", &haystack[tag_end + 1..]));
        }
        let inner_start = tag_end + 1;
        let inner_end = inner_start + haystack[inner_start..].find(&close)?;
        return Some((&haystack[inner_start..inner_end], &haystack[inner_end + close.len()..]));
    }
}

/// Decoded text of the first `tag` child element
fn element_text(block: &str, tag: &str) -> Option<String> {
    next_element(block, tag).map(|(inner, _)| decode_text(inner))
}

/// Link text (RSS) or the `href` of the first `<link>` (Atom)
fn entry_link(block: &str) -> String {
    let text = element_text(block, "link").unwrap_or_default();
    if !text.trim().is_empty() {
        return text.trim().to_string();
    }
    HREF_RE
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str()))
        .unwrap_or_default()
}

/// Unwrap CDATA sections verbatim and decode entities everywhere else
fn decode_text(raw: &str) -> String {
    const CDATA_OPEN: &str = "<![CDATA[";
    const CDATA_CLOSE: &str = "]]>";

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find(CDATA_OPEN) {
        out.push_str(&decode_entities(&rest[..start]));
        let body = &rest[start + CDATA_OPEN.len()..];
        match body.find(CDATA_CLOSE) {
            Some(end) => {
                out.push_str(&body[..end]);
                rest = &body[end + CDATA_CLOSE.len()..];
            }
            None => {
                out.push_str(body);
                rest = "";
            }
        }
    }
    out.push_str(&decode_entities(rest));
    out
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let numeric = &entity[1..];
                    let code = match numeric.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => numeric.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
