//! Text response with annotation markers stripped.

use serde_json::Value;

use super::content::TextContent;

/// Display text for one `text` content item.
#[derive(Debug, Clone, PartialEq)]
pub struct TextResponse {
    text: String,
    raw: Value,
}

impl TextResponse {
    pub fn new(content: &TextContent, raw: Value) -> Self {
        let literals = content.annotations.iter().map(|a| a.text.as_str());
        Self {
            text: strip_annotations(&content.value, literals),
            raw,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The backend payload this response was built from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Remove every occurrence of every literal, one literal after another.
pub fn strip_annotations<'a>(text: &str, literals: impl IntoIterator<Item = &'a str>) -> String {
    literals
        .into_iter()
        .filter(|literal| !literal.is_empty())
        .fold(text.to_string(), |acc, literal| acc.replace(literal, ""))
}
