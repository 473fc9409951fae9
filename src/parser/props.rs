use crate::model::{PropValue, Props};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

struct PropSpan<'a> {
    key: &'a str,
    value: &'a str,
    end: usize,
}

/// Extract `{{key}}value{{/key}}` props from `text`.
///
/// Values lose every line break. A value that itself holds props becomes a
/// nested mapping, to any depth. A later duplicate key overwrites the earlier
/// value. Returns `None` when nothing matched.
pub fn extract_props(text: &str) -> Option<Props> {
    let mut props = Props::new();
    let mut cursor = 0;

    while let Some(span) = next_prop(text, cursor) {
        let value: String = span
            .value
            .chars()
            .filter(|c| !matches!(c, '\r' | '\n'))
            .collect();

        let value = match extract_props(&value) {
            Some(nested) => PropValue::Nested(nested),
            None => PropValue::Text(value),
        };
        props.insert(span.key.to_string(), value);
        cursor = span.end;
    }

    if props.is_empty() {
        None
    } else {
        Some(props)
    }
}

/// Leftmost prop starting at or after `from`.
fn next_prop(text: &str, from: usize) -> Option<PropSpan<'_>> {
    let mut search = from;
    while let Some(offset) = text[search..].find(OPEN) {
        let start = search + offset;
        if let Some(span) = prop_at(text, start) {
            return Some(span);
        }
        search = start + 1;
    }
    None
}

/// Try every key candidate for an opening `{{` at `start`, shortest first, and
/// return the first one whose `{{/key}}` closes a non-empty value.
fn prop_at(text: &str, start: usize) -> Option<PropSpan<'_>> {
    let key_start = start + OPEN.len();
    let first = text[key_start..].chars().next()?;
    let mut search = key_start + first.len_utf8();

    while let Some(offset) = text[search..].find(CLOSE) {
        let key_end = search + offset;
        let key = &text[key_start..key_end];
        let value_start = key_end + CLOSE.len();

        if let Some(first_value) = text[value_start..].chars().next() {
            let closing = format!("{OPEN}/{key}{CLOSE}");
            let value_search = value_start + first_value.len_utf8();
            if let Some(offset) = text[value_search..].find(&closing) {
                let value_end = value_search + offset;
                return Some(PropSpan {
                    key,
                    value: &text[value_start..value_end],
                    end: value_end + closing.len(),
                });
            }
        }

        search = key_end + 1;
    }
    None
}
