use indexmap::IndexMap;
use serde::Serialize;

/// Ordered `key → value` mapping extracted from `{{key}}value{{/key}}` markup.
pub type Props = IndexMap<String, PropValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    Text(String),
    Nested(Props),
}

/// A `[[...]]` reference to another passage.
///
/// `pid` and `broken` stay empty until the whole story has been composed;
/// see [`crate::parser::story::resolve_links`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Link {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken: Option<bool>,
}

impl Link {
    pub fn named(name: impl Into<String>) -> Self {
        Link {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_broken(&self) -> bool {
        self.broken.unwrap_or(false)
    }
}

// Field order is the JSON key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Passage {
    pub text: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,
    pub name: String,
    pub pid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Story {
    pub passages: Vec<Passage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startnode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(rename = "creator-version", skip_serializing_if = "Option::is_none")]
    pub creator_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifid: Option<String>,
}
