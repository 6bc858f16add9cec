//! Fixed success envelope: `{content: [{type: "text", text: <json>}]}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub content: Vec<ContentItem>,
}

impl Envelope {
    /// Wrap a handler result as canonical (compact, key-sorted) JSON text.
    pub fn json(value: &Value) -> Self {
        Self::text(value.to_string())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::Text { text: text.into() }],
        }
    }

    /// Text of the first content item.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|item| match item {
            ContentItem::Text { text } => text.as_str(),
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().map(|item| match item {
            ContentItem::Text { text } => text.as_str(),
        })
    }
}
