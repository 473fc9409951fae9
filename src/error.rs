use thiserror::Error;

/// Required input missing from a story export.
///
/// Everything past the source reader degrades instead of failing; these are
/// the cases where a passage's identity can't be recovered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// No `<tw-storydata>` element in the document.
    #[error("no <tw-storydata> element found in HTML")]
    NoStoryData,
    /// A `<tw-passagedata>` element without a usable `name` or `pid`.
    #[error("passage #{index} is missing required attribute `{attribute}`")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },
    /// A `<tw-passagedata>` start tag with no matching end tag.
    #[error("passage #{index} has no closing </tw-passagedata> tag")]
    UnterminatedPassage { index: usize },
}
