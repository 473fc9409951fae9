use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_ ]+):\s*(.*)$").unwrap());
static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^=\s]+)\s+(.+)").unwrap());

/// Leading `Key: Value` block of a passage.
#[derive(Debug, Default, PartialEq)]
pub struct MetadataBlock {
    /// Value of the reserved `Type` key.
    pub kind: Option<String>,
    pub metadata: IndexMap<String, String>,
    pub variables: IndexMap<String, String>,
    /// Index of the first line of narrative content.
    pub content_start: usize,
}

/// Reserved keys get their own slot in the passage; everything else is plain metadata.
enum MetaKey {
    Variable,
    Type,
    Field(String),
}

impl MetaKey {
    fn classify(raw: &str) -> Self {
        let key = raw.to_ascii_lowercase();
        match key.as_str() {
            "variable" => MetaKey::Variable,
            "type" => MetaKey::Type,
            _ => MetaKey::Field(key),
        }
    }
}

/// Consume `Key: Value` lines from the top of a passage.
///
/// The block ends at the first blank line after a metadata line, or at the
/// first non-blank line that is not `Key: Value`. Blank lines before the block
/// are skipped.
pub fn parse_metadata(lines: &[&str]) -> MetadataBlock {
    let mut block = MetadataBlock::default();
    let mut found = false;

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            if found {
                block.content_start = i + 1;
                return block;
            }
            continue;
        }

        let Some(caps) = META_RE.captures(line) else {
            block.content_start = i;
            return block;
        };
        let value = &caps[2];

        match MetaKey::classify(&caps[1]) {
            MetaKey::Variable => {
                // "Variable: health - 10" keeps the whole "- 10" expression.
                if let Some(var) = VARIABLE_RE.captures(value) {
                    block.variables.insert(var[1].to_string(), var[2].to_string());
                }
            }
            MetaKey::Type => block.kind = Some(value.to_string()),
            MetaKey::Field(key) => {
                block.metadata.insert(key, value.to_string());
            }
        }
        found = true;
    }

    if found {
        block.content_start = lines.len();
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> MetadataBlock {
        let lines: Vec<&str> = text.split('\n').collect();
        parse_metadata(&lines)
    }

    #[test]
    fn type_and_variable() {
        let block = parse("Type: note\nVariable: health - 10\n\nBody text");
        assert_eq!(block.kind.as_deref(), Some("note"));
        assert_eq!(block.variables["health"], "- 10");
        assert!(block.metadata.is_empty());
        assert_eq!(block.content_start, 3);
    }

    #[test]
    fn generic_keys_lowercased() {
        let block = parse("Speaker: Ada\nMood Level: calm\n\nHello");
        assert_eq!(block.metadata["speaker"], "Ada");
        assert_eq!(block.metadata["mood level"], "calm");
        assert_eq!(block.metadata.keys().collect::<Vec<_>>(), vec!["speaker", "mood level"]);
    }

    #[test]
    fn reserved_keys_case_insensitive() {
        let block = parse("TYPE: choice\nvariable: gold + 5\n\n");
        assert_eq!(block.kind.as_deref(), Some("choice"));
        assert_eq!(block.variables["gold"], "+ 5");
    }

    #[test]
    fn variable_without_expression_ignored() {
        let block = parse("Variable: lonely\n\nText");
        assert!(block.variables.is_empty());
        assert_eq!(block.content_start, 2);
    }

    #[test]
    fn variable_skips_leading_equals() {
        let block = parse("Variable: = score 3");
        assert_eq!(block.variables["score"], "3");
    }

    #[test]
    fn no_metadata() {
        let block = parse("Once upon a time\nthe end");
        assert_eq!(block, MetadataBlock::default());
    }

    #[test]
    fn leading_blank_lines_skipped() {
        let block = parse("\n\nSpeaker: Ada\n\nHi");
        assert_eq!(block.metadata["speaker"], "Ada");
        assert_eq!(block.content_start, 4);
    }

    #[test]
    fn non_matching_line_ends_block() {
        let block = parse("Speaker: Ada\nHello there!\n\nMore");
        assert_eq!(block.metadata.len(), 1);
        assert_eq!(block.content_start, 1);
    }

    #[test]
    fn punctuation_in_key_is_not_metadata() {
        let block = parse("Note - important: yes\nText");
        assert!(block.metadata.is_empty());
        assert_eq!(block.content_start, 0);
    }

    #[test]
    fn exhausted_block_ends_content() {
        let block = parse("Type: note\nSpeaker: Ada");
        assert_eq!(block.content_start, 2);
    }

    #[test]
    fn empty_value_allowed() {
        let block = parse("Speaker:\n\nText");
        assert_eq!(block.metadata["speaker"], "");
    }

    #[test]
    fn later_type_overwrites() {
        let block = parse("Type: a\nType: b\n\n");
        assert_eq!(block.kind.as_deref(), Some("b"));
    }
}
