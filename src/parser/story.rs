use std::collections::HashMap;

use tracing::debug;

use super::passage::compose_passage;
use crate::model::{Passage, Story};
use crate::source::RawStory;

/// Compose every passage in document order, then resolve links by name.
pub fn compose_story(raw: &RawStory) -> Story {
    let mut passages: Vec<Passage> = raw.passages.iter().map(compose_passage).collect();
    let broken = resolve_links(&mut passages);

    debug!(
        story = raw.attributes.name.as_deref().unwrap_or(""),
        passages = passages.len(),
        broken,
        "Composed story"
    );

    let attrs = &raw.attributes;
    Story {
        passages,
        name: attrs.name.clone(),
        startnode: attrs.startnode.clone(),
        creator: attrs.creator.clone(),
        creator_version: attrs.creator_version.clone(),
        ifid: attrs.ifid.clone(),
    }
}

/// Point every link at the pid of the passage it names, or mark it broken.
///
/// Needs the whole story, so it runs after all passages are composed. When
/// two passages share a name the later one wins. Returns the number of
/// broken links.
pub fn resolve_links(passages: &mut [Passage]) -> usize {
    let pids: HashMap<String, String> = passages
        .iter()
        .map(|p| (p.name.clone(), p.pid.clone()))
        .collect();

    let mut broken = 0;
    for passage in passages.iter_mut() {
        let Some(links) = passage.links.as_mut() else {
            continue;
        };
        for link in links {
            match pids.get(&link.name) {
                Some(pid) => {
                    link.pid = Some(pid.clone());
                    link.broken = None;
                }
                None => {
                    link.pid = None;
                    link.broken = Some(true);
                    broken += 1;
                }
            }
        }
    }
    broken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawPassage, StoryAttributes};

    fn passage(name: &str, pid: &str, content: &str) -> RawPassage {
        RawPassage {
            name: name.into(),
            pid: pid.into(),
            tags: None,
            content: content.into(),
        }
    }

    fn story(passages: Vec<RawPassage>) -> RawStory {
        RawStory {
            attributes: StoryAttributes::default(),
            passages,
        }
    }

    #[test]
    fn resolves_and_flags_broken() {
        let s = compose_story(&story(vec![
            passage("A", "1", "Go [[B]] or [[C]]"),
            passage("B", "2", "Dead end"),
        ]));
        let links = s.passages[0].links.as_ref().unwrap();
        assert_eq!(links[0].pid.as_deref(), Some("2"));
        assert_eq!(links[0].broken, None);
        assert_eq!(links[1].pid, None);
        assert_eq!(links[1].broken, Some(true));
        assert!(s.passages[1].links.is_none());
    }

    #[test]
    fn forward_and_self_references() {
        let s = compose_story(&story(vec![
            passage("Intro", "1", "[[Loop->Intro]] [[Outro]]"),
            passage("Outro", "2", "[[Back->Intro]]"),
        ]));
        let first = s.passages[0].links.as_ref().unwrap();
        assert_eq!(first[0].pid.as_deref(), Some("1"));
        assert_eq!(first[1].pid.as_deref(), Some("2"));
        let second = s.passages[1].links.as_ref().unwrap();
        assert_eq!(second[0].pid.as_deref(), Some("1"));
    }

    #[test]
    fn duplicate_names_last_wins() {
        let s = compose_story(&story(vec![
            passage("Start", "1", "[[Twin]]"),
            passage("Twin", "2", ""),
            passage("Twin", "3", ""),
        ]));
        assert_eq!(s.passages[0].links.as_ref().unwrap()[0].pid.as_deref(), Some("3"));
    }

    #[test]
    fn counts_broken_links() {
        let mut passages = vec![Passage {
            name: "A".into(),
            pid: "1".into(),
            links: Some(vec![
                crate::model::Link::named("X"),
                crate::model::Link::named("A"),
                crate::model::Link::named("Y"),
            ]),
            ..Default::default()
        }];
        assert_eq!(resolve_links(&mut passages), 2);
    }

    #[test]
    fn passage_order_and_attributes_kept() {
        let mut raw = story(vec![passage("Z", "9", ""), passage("A", "1", "")]);
        raw.attributes.name = Some("Tale".into());
        raw.attributes.creator_version = Some("2.6.2".into());
        let s = compose_story(&raw);
        let names: Vec<_> = s.passages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "A"]);
        assert_eq!(s.name.as_deref(), Some("Tale"));
        assert_eq!(s.creator_version.as_deref(), Some("2.6.2"));
        assert!(s.ifid.is_none());
    }
}
