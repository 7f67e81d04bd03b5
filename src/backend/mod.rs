//! Thread/Run assistant backend: the collaborator the run controller drives.

pub mod http;
pub mod openai;
pub mod types;

pub use openai::OpenAiAssistantsBackend;
pub use types::{
    FunctionCall, ListMessagesQuery, MessageList, MessageRole, RequiredAction, Run, RunError,
    RunStatus, SortOrder, SubmitToolOutputs, Thread, ThreadMessage, ToolCall, ToolOutput,
};

use async_trait::async_trait;

use crate::error::AssistantError;

/// Requests the bridge makes against the assistant API.
///
/// Every method maps a backend rejection to an [`AssistantError`] in the
/// backend family (see [`AssistantError::is_backend_error`]).
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn create_thread(&self) -> Result<Thread, AssistantError>;

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, AssistantError>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, AssistantError>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError>;

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, AssistantError>;

    async fn list_messages(
        &self,
        thread_id: &str,
        query: &ListMessagesQuery,
    ) -> Result<MessageList, AssistantError>;

    /// Download/look up a file; the payload may carry a `url` field.
    async fn download_file(&self, file_id: &str) -> Result<serde_json::Value, AssistantError>;
}
