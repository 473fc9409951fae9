pub mod entities;
pub mod links;
pub mod metadata;
pub mod passage;
pub mod props;
pub mod story;

use crate::model::Story;
use crate::source::RawStory;

/// Two-pass pipeline: raw passages → passage records → story with resolved links.
pub fn convert_story(raw: &RawStory) -> Story {
    story::compose_story(raw)
}

// ── Tests ──
