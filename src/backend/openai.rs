//! OpenAI Assistants (threads/runs) API backend.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::json;
use tracing::debug;

use super::http::{assistant_headers, build_client, read_json, status_to_error, trim_trailing_slash};
use super::types::{
    ListMessagesQuery, MessageList, MessageRole, Run, Thread, ThreadMessage, ToolOutput,
};
use super::AssistantBackend;
use crate::config::AssistantConfig;
use crate::error::AssistantError;

/// `reqwest` client for `/threads`, `/threads/{id}/runs` and `/files`.
#[derive(Debug, Clone)]
pub struct OpenAiAssistantsBackend {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl OpenAiAssistantsBackend {
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantError> {
        if config.api_key.trim().is_empty() {
            return Err(AssistantError::Authentication(
                "Missing OpenAI API key for assistants backend".to_string(),
            ));
        }
        Ok(Self {
            client: build_client(config.request_timeout)?,
            base_url: trim_trailing_slash(&config.base_url).to_string(),
            headers: assistant_headers(config)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, AssistantError> {
        let response = self
            .client
            .post(self.url(path))
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;
        read_json(response).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AssistantError> {
        let response = self
            .client
            .get(self.url(path))
            .headers(self.headers.clone())
            .query(query)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl AssistantBackend for OpenAiAssistantsBackend {
    async fn create_thread(&self) -> Result<Thread, AssistantError> {
        debug!("assistants create_thread");
        self.post("/threads", json!({})).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, AssistantError> {
        debug!(thread_id, %role, "assistants create_message");
        self.post(
            &format!("/threads/{thread_id}/messages"),
            json!({ "role": role.to_string(), "content": content }),
        )
        .await
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, AssistantError> {
        debug!(thread_id, assistant_id, "assistants create_run");
        self.post(
            &format!("/threads/{thread_id}/runs"),
            json!({ "assistant_id": assistant_id }),
        )
        .await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        self.get(&format!("/threads/{thread_id}/runs/{run_id}"), &[])
            .await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, AssistantError> {
        debug!(thread_id, run_id, outputs = outputs.len(), "assistants submit_tool_outputs");
        self.post(
            &format!("/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            json!({ "tool_outputs": outputs }),
        )
        .await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        query: &ListMessagesQuery,
    ) -> Result<MessageList, AssistantError> {
        self.get(
            &format!("/threads/{thread_id}/messages"),
            &[
                ("order", query.order.to_string()),
                ("limit", query.limit.to_string()),
            ],
        )
        .await
    }

    async fn download_file(&self, file_id: &str) -> Result<serde_json::Value, AssistantError> {
        debug!(file_id, "assistants download_file");
        let response = self
            .client
            .get(self.url(&format!("/files/{file_id}/content")))
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(status_to_error(status.as_u16(), &body));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("json") {
            // Raw file bytes carry no `url`; the body is not buffered.
            debug!(file_id, %content_type, "file content is not json");
            return Ok(json!({
                "content_type": content_type,
                "content_length": response.content_length(),
            }));
        }

        read_json(response).await
    }
}
