//! Image response with a lazily resolved, memoized download URL.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::AssistantBackend;
use crate::error::AssistantError;

/// Download URL resolution state.
///
/// `Resolved("")` is a valid terminal state: the lookup is never repeated,
/// even when the backend returned no `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlState {
    Unresolved,
    Resolved(String),
}

/// One `image_file` content item.
///
/// Clones share the URL cache.
#[derive(Clone)]
pub struct ImageResponse {
    file_id: String,
    raw: Value,
    backend: Arc<dyn AssistantBackend>,
    url: Arc<Mutex<UrlState>>,
}

impl ImageResponse {
    pub fn new(file_id: impl Into<String>, raw: Value, backend: Arc<dyn AssistantBackend>) -> Self {
        Self {
            file_id: file_id.into(),
            raw,
            backend,
            url: Arc::new(Mutex::new(UrlState::Unresolved)),
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub async fn url_state(&self) -> UrlState {
        self.url.lock().await.clone()
    }

    /// Resolve the display URL on first call; later calls return the cache.
    ///
    /// A failed download leaves the state `Unresolved`.
    pub async fn url(&self) -> Result<String, AssistantError> {
        let mut state = self.url.lock().await;
        if let UrlState::Resolved(url) = &*state {
            return Ok(url.clone());
        }

        let payload = self.backend.download_file(&self.file_id).await?;
        let url = payload
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        debug!(file_id = %self.file_id, resolved = !url.is_empty(), "image url resolved");

        *state = UrlState::Resolved(url.clone());
        Ok(url)
    }
}

impl fmt::Debug for ImageResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResponse")
            .field("file_id", &self.file_id)
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}
