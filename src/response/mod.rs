//! Normalization of assistant content into local response values.

pub mod content;
pub mod image;
pub mod text;

pub use content::{Annotation, ImageFileRef, MessageContent, TextContent};
pub use image::{ImageResponse, UrlState};
pub use text::{strip_annotations, TextResponse};

use std::sync::Arc;

use serde_json::Value;

use crate::backend::AssistantBackend;
use crate::error::AssistantError;

/// Local representation of one unit of assistant output.
#[derive(Debug, Clone)]
pub enum NormalizedResponse {
    Text(TextResponse),
    Image(ImageResponse),
}

impl NormalizedResponse {
    pub fn raw(&self) -> &Value {
        match self {
            Self::Text(text) => text.raw(),
            Self::Image(image) => image.raw(),
        }
    }

    /// The raw payload serialized back to JSON.
    pub fn json(&self) -> String {
        self.raw().to_string()
    }

    pub fn as_text(&self) -> Option<&TextResponse> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageResponse> {
        match self {
            Self::Image(image) => Some(image),
            Self::Text(_) => None,
        }
    }
}

/// Turns raw content items into [`NormalizedResponse`]s.
///
/// Never touches the network; image URLs are resolved later, on read.
#[derive(Clone)]
pub struct ContentNormalizer {
    backend: Arc<dyn AssistantBackend>,
}

impl ContentNormalizer {
    pub fn new(backend: Arc<dyn AssistantBackend>) -> Self {
        Self { backend }
    }

    pub fn normalize(&self, item: &Value) -> Result<NormalizedResponse, AssistantError> {
        Ok(match MessageContent::from_value(item)? {
            MessageContent::Text { text } => {
                NormalizedResponse::Text(TextResponse::new(&text, item.clone()))
            }
            MessageContent::ImageFile { image_file } => NormalizedResponse::Image(
                ImageResponse::new(image_file.file_id, item.clone(), self.backend.clone()),
            ),
        })
    }
}
