use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::trace;

use super::entities::decode_entities;
use super::links::{extract_links, LINK_RE};
use super::metadata::parse_metadata;
use super::props::extract_props;
use crate::model::Passage;
use crate::source::RawPassage;

static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").unwrap());
static VARIABLE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<[^\n\r\x{2028}\x{2029}]*?>>").unwrap());

/// Build one passage record from its raw content and attributes.
///
/// Links are left unresolved; the story composer fills in `pid`/`broken`.
pub fn compose_passage(raw: &RawPassage) -> Passage {
    let lines: Vec<&str> = LINE_BREAK_RE.split(&raw.content).collect();
    let block = parse_metadata(&lines);

    // Metadata is matched on raw text; everything below works on decoded text.
    let body = lines[block.content_start..].join("\n");
    let body = decode_entities(&body);

    let links = extract_links(&body);
    let text = sanitize(&body);
    let props = extract_props(&text);

    trace!(
        pid = %raw.pid,
        links = links.as_ref().map_or(0, Vec::len),
        props = props.as_ref().map_or(0, |p| p.len()),
        "Composed passage"
    );

    Passage {
        text,
        kind: block.kind,
        metadata: non_empty(block.metadata),
        variables: non_empty(block.variables),
        links,
        props,
        name: raw.name.clone(),
        pid: raw.pid.clone(),
        tags: split_tags(raw.tags.as_deref()),
    }
}

/// Drop `<<...>>` variable references, then `[[...]]` links.
fn sanitize(body: &str) -> String {
    let without_refs = VARIABLE_REF_RE.replace_all(body, "");
    LINK_RE.replace_all(&without_refs, "").into_owned()
}

fn split_tags(tags: Option<&str>) -> Option<Vec<String>> {
    tags.filter(|t| !t.is_empty())
        .map(|t| t.split(' ').map(String::from).collect())
}

fn non_empty<K, V>(map: IndexMap<K, V>) -> Option<IndexMap<K, V>> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}
