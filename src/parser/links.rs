use std::sync::LazyLock;

use regex::Regex;

use crate::model::Link;

/// `[[...]]` on a single line, shortest span first. Also used to strip links from text.
pub static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\n\r\x{2028}\x{2029}]*?\]\]").unwrap());

/// Find every `[[...]]` in `text`, left to right.
///
/// Supported forms:
/// - `[[Target]]`
/// - `[[Shown text->Target]]`, only the target is kept
/// - `[[condition | Target]]`, split at the first pipe
///
/// Returns `None` when the text holds no link markup at all.
pub fn extract_links(text: &str) -> Option<Vec<Link>> {
    let links: Vec<Link> = LINK_RE
        .find_iter(text)
        .map(|m| {
            let span = m.as_str();
            parse_link(&span[2..span.len() - 2])
        })
        .collect();

    if links.is_empty() {
        None
    } else {
        Some(links)
    }
}

fn parse_link(content: &str) -> Link {
    let (condition, target) = match content.split_once('|') {
        Some((condition, rest)) => (Some(condition.trim().to_string()), rest.trim()),
        None => (None, content),
    };

    let name = match target.split_once("->") {
        Some((_, name)) => name,
        None => target,
    };

    Link {
        condition,
        ..Link::named(name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str) -> Vec<String> {
        extract_links(text)
            .unwrap_or_default()
            .into_iter()
            .map(|l| l.name)
            .collect()
    }

    #[test]
    fn no_links() {
        assert!(extract_links("Just some [text] without links").is_none());
        assert!(extract_links("").is_none());
    }

    #[test]
    fn simple_link() {
        let links = extract_links("Go to [[foo]] now").unwrap();
        assert_eq!(links, vec![Link::named("foo")]);
    }

    #[test]
    fn conditional_link() {
        let links = extract_links("[[cond | foo]]").unwrap();
        assert_eq!(links[0].name, "foo");
        assert_eq!(links[0].condition.as_deref(), Some("cond"));
    }

    #[test]
    fn alias_link() {
        let links = extract_links("[[Open the door->Hallway]]").unwrap();
        assert_eq!(links, vec![Link::named("Hallway")]);
    }

    #[test]
    fn condition_with_alias() {
        let links = extract_links("[[$key is true | Unlock->Vault ]]").unwrap();
        assert_eq!(links[0].condition.as_deref(), Some("$key is true"));
        assert_eq!(links[0].name, "Vault");
    }

    #[test]
    fn only_first_pipe_splits() {
        let links = extract_links("[[a | b | c]]").unwrap();
        assert_eq!(links[0].condition.as_deref(), Some("a"));
        assert_eq!(links[0].name, "b | c");
    }

    #[test]
    fn first_arrow_splits() {
        assert_eq!(names("[[x->y->z]]"), vec!["y->z"]);
    }

    #[test]
    fn order_preserved() {
        assert_eq!(names("[[B]] then [[A]] and [[C]]"), vec!["B", "A", "C"]);
    }

    #[test]
    fn empty_content_is_empty_name() {
        assert_eq!(names("[[]]"), vec![""]);
        assert_eq!(names("[[  ]]"), vec![""]);
    }

    #[test]
    fn does_not_span_lines() {
        assert!(extract_links("[[broken\nlink]]").is_none());
    }

    #[test]
    fn stripped_text_has_no_links() {
        let text = "Go [[left]] or [[a->right]].";
        let stripped = LINK_RE.replace_all(text, "");
        assert!(extract_links(&stripped).is_none());
    }
}
