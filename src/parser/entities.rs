use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(nbsp|amp|quot|lt|gt);").unwrap());

/// Decode the handful of character references Twine writes into passage text.
///
/// Single pass: `&amp;lt;` becomes `&lt;`, not `<`. Anything else is kept verbatim.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(text, |caps: &Captures| match &caps[1] {
        "nbsp" => " ",
        "amp" => "&",
        "quot" => "\"",
        "lt" => "<",
        _ => ">",
    })
}
