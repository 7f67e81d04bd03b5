//! Adapter between an inbound chat message and the run controller.

pub mod storage;

pub use storage::{InMemoryUserStorage, UserStorage};

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::backend::AssistantBackend;
use crate::error::AssistantError;
use crate::response::NormalizedResponse;
use crate::run::{RunController, RunReport};

/// Storage namespace holding the bridge's per-user values.
pub const STORAGE_NAMESPACE: &str = "openapi";
/// Storage key of the user's thread id.
pub const THREAD_ID_KEY: &str = "thread-id";
/// Extras key the normalized responses are attached under.
pub const MESSAGE_RESPONSES_KEY: &str = "messageResponses";

/// An inbound message flowing through the chat pipeline.
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    pub sender: String,
    pub text: String,
    extras: HashMap<String, Vec<NormalizedResponse>>,
}

impl IncomingMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            extras: HashMap::new(),
        }
    }

    pub fn add_extras(&mut self, key: impl Into<String>, responses: Vec<NormalizedResponse>) {
        self.extras.insert(key.into(), responses);
    }

    pub fn extras(&self, key: &str) -> Option<&[NormalizedResponse]> {
        self.extras.get(key).map(Vec::as_slice)
    }

    /// Responses attached by [`ConversationAdapter::received`].
    pub fn message_responses(&self) -> &[NormalizedResponse] {
        self.extras(MESSAGE_RESPONSES_KEY).unwrap_or_default()
    }
}

/// Maps inbound messages onto per-user threads and runs them.
#[derive(Clone)]
pub struct ConversationAdapter {
    backend: Arc<dyn AssistantBackend>,
    storage: Arc<dyn UserStorage>,
    controller: RunController,
}

impl ConversationAdapter {
    pub fn new(
        backend: Arc<dyn AssistantBackend>,
        storage: Arc<dyn UserStorage>,
        controller: RunController,
    ) -> Self {
        Self {
            backend,
            storage,
            controller,
        }
    }

    /// The sender's thread id, creating and storing a thread on first use.
    pub async fn thread_for(&self, sender: &str) -> Result<String, AssistantError> {
        if let Some(thread_id) = self.storage.get(sender, STORAGE_NAMESPACE, THREAD_ID_KEY)? {
            return Ok(thread_id);
        }

        let thread = self.backend.create_thread().await?;
        let created_at = thread.created_at().map(|at| at.to_rfc3339()).unwrap_or_default();
        info!(sender, thread_id = %thread.id, %created_at, "created thread");
        self.storage
            .put(sender, STORAGE_NAMESPACE, THREAD_ID_KEY, thread.id.clone())?;
        Ok(thread.id)
    }

    /// Run one turn for `message` and attach the normalized responses under
    /// [`MESSAGE_RESPONSES_KEY`]. The returned report's `responses` are moved
    /// into the message and left empty.
    pub async fn received(
        &self,
        message: &mut IncomingMessage,
        cancel: &CancellationToken,
    ) -> Result<RunReport, AssistantError> {
        let thread_id = self.thread_for(&message.sender).await?;
        let mut report = self
            .controller
            .execute(&thread_id, &message.text, cancel)
            .await?;

        message.add_extras(MESSAGE_RESPONSES_KEY, std::mem::take(&mut report.responses));
        Ok(report)
    }
}
