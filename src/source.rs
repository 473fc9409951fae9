//! Locates the story and passage elements in a Twine 2 HTML export.
//!
//! Twine writes one `<tw-storydata>` element holding a `<tw-passagedata>`
//! element per passage, with the passage source as escaped text. The reader
//! hands the parser each passage's content as a DOM's `innerHTML` would
//! serialize it, plus the decoded attribute values.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::SourceError;

static STORY_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<tw-storydata\b([^>]*)>").unwrap());
static STORY_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</tw-storydata\s*>").unwrap());
static PASSAGE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<tw-passagedata\b([^>]*)>").unwrap());
static PASSAGE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</tw-passagedata\s*>").unwrap());
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());

/// Story-level attributes; empty values are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryAttributes {
    pub name: Option<String>,
    pub startnode: Option<String>,
    pub creator: Option<String>,
    pub creator_version: Option<String>,
    pub ifid: Option<String>,
}

/// One `<tw-passagedata>` element, content still marked up.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPassage {
    pub name: String,
    pub pid: String,
    pub tags: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStory {
    pub attributes: StoryAttributes,
    pub passages: Vec<RawPassage>,
}

/// Read the first `<tw-storydata>` element and its passages, in document order.
pub fn read_story(html: &str) -> Result<RawStory, SourceError> {
    let (body_start, story_attrs) =
        open_tag(&STORY_OPEN_RE, html, 0).ok_or(SourceError::NoStoryData)?;
    let attrs = parse_attributes(story_attrs);

    let body_end = STORY_CLOSE_RE
        .find_at(html, body_start)
        .map_or(html.len(), |m| m.start());
    let region = &html[..body_end];

    let mut passages = Vec::new();
    let mut pos = body_start;
    while let Some((tag_end, raw_attrs)) = open_tag(&PASSAGE_OPEN_RE, region, pos) {
        let index = passages.len();
        let close = PASSAGE_CLOSE_RE
            .find_at(region, tag_end)
            .ok_or(SourceError::UnterminatedPassage { index })?;

        let passage_attrs = parse_attributes(raw_attrs);
        passages.push(RawPassage {
            name: required(&passage_attrs, "name", index)?,
            pid: required(&passage_attrs, "pid", index)?,
            tags: optional(&passage_attrs, "tags"),
            content: inner_html(&region[tag_end..close.start()]),
        });
        pos = close.end();
    }

    let attributes = StoryAttributes {
        name: optional(&attrs, "name"),
        startnode: optional(&attrs, "startnode"),
        creator: optional(&attrs, "creator"),
        creator_version: optional(&attrs, "creator-version"),
        ifid: optional(&attrs, "ifid"),
    };
    debug!(
        story = attributes.name.as_deref().unwrap_or(""),
        passages = passages.len(),
        "Read story source"
    );

    Ok(RawStory {
        attributes,
        passages,
    })
}

/// Next start tag at or after `from`: (end of tag, raw attribute text).
fn open_tag<'h>(re: &Regex, hay: &'h str, from: usize) -> Option<(usize, &'h str)> {
    let caps = re.captures_at(hay, from)?;
    Some((caps.get(0)?.end(), caps.get(1)?.as_str()))
}

/// Attribute names are case-insensitive; the first occurrence of a name wins.
fn parse_attributes(raw: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for caps in ATTR_RE.captures_iter(raw) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        attrs
            .entry(caps[1].to_ascii_lowercase())
            .or_insert_with(|| html_escape::decode_html_entities(value).into_owned());
    }
    attrs
}

fn optional(attrs: &HashMap<String, String>, key: &str) -> Option<String> {
    attrs.get(key).filter(|v| !v.is_empty()).cloned()
}

fn required(
    attrs: &HashMap<String, String>,
    attribute: &'static str,
    index: usize,
) -> Result<String, SourceError> {
    optional(attrs, attribute).ok_or(SourceError::MissingAttribute { index, attribute })
}

/// Re-serialize element content the way `innerHTML` does: line breaks
/// normalized, text re-escaped (`&`, `<`, `>`, no-break space), tags verbatim.
fn inner_html(raw: &str) -> String {
    let raw = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for tag in TAG_RE.find_iter(&raw) {
        out.push_str(&escape_text(&raw[last..tag.start()]));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&escape_text(&raw[last..]));
    out
}

fn escape_text(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    html_escape::encode_text(&decoded).replace('\u{a0}', "&nbsp;")
}
