//! Typed view of one raw message content item.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AssistantError;

/// One unit of assistant output, dispatched on its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    ImageFile { image_file: ImageFileRef },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Citation or file-path marker inside a text value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: String,
    /// Literal substring of the text this annotation stands for.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFileRef {
    pub file_id: String,
}

impl MessageContent {
    pub const TEXT: &'static str = "text";
    pub const IMAGE_FILE: &'static str = "image_file";

    /// Parse a raw content item. Unknown tags and structurally invalid
    /// payloads are both `MalformedResponse`.
    pub fn from_value(value: &Value) -> Result<Self, AssistantError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| AssistantError::malformed("content item has no `type` tag"))?;

        if kind != Self::TEXT && kind != Self::IMAGE_FILE {
            return Err(AssistantError::malformed(format!(
                "unsupported content type `{kind}`"
            )));
        }

        serde_json::from_value(value.clone())
            .map_err(|e| AssistantError::malformed(format!("invalid `{kind}` content item: {e}")))
    }
}
