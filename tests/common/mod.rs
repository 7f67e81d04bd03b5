//! Shared test helpers and a scripted in-memory backend.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use assistant_bridge::backend::{
    AssistantBackend, FunctionCall, ListMessagesQuery, MessageList, MessageRole, RequiredAction,
    Run, RunStatus, SubmitToolOutputs, Thread, ThreadMessage, ToolCall, ToolOutput,
};
use assistant_bridge::error::AssistantError;
use assistant_bridge::tools::ToolExecutor;

/// Every request the bridge made, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateThread,
    CreateMessage { thread_id: String, text: String },
    CreateRun { thread_id: String, assistant_id: String },
    RetrieveRun { run_id: String },
    SubmitToolOutputs { run_id: String, outputs: Vec<ToolOutput> },
    ListMessages { limit: u32 },
    DownloadFile { file_id: String },
    ToolExecutorRun { run_id: String, call_ids: Vec<String> },
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Backend that replays a status script and serves canned messages.
pub struct ScriptedBackend {
    log: CallLog,
    thread_ids: Mutex<VecDeque<String>>,
    created_run: Run,
    statuses: Mutex<VecDeque<Run>>,
    messages: Mutex<Vec<ThreadMessage>>,
    file_payload: Value,
    download_failures: Mutex<u32>,
    create_run_error: Option<(u16, String)>,
    retrieve_times: Mutex<Vec<Instant>>,
    run_created_at: Mutex<Option<Instant>>,
}

impl ScriptedBackend {
    pub fn new(run_id: &str) -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            thread_ids: Mutex::new(VecDeque::from(vec!["t1".to_string()])),
            created_run: run(run_id, RunStatus::Queued),
            statuses: Mutex::new(VecDeque::new()),
            messages: Mutex::new(Vec::new()),
            file_payload: json!({}),
            download_failures: Mutex::new(0),
            create_run_error: None,
            retrieve_times: Mutex::new(Vec::new()),
            run_created_at: Mutex::new(None),
        }
    }

    pub fn with_thread_ids(self, ids: &[&str]) -> Self {
        *self.thread_ids.lock().unwrap() = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Statuses returned by successive `retrieve_run` calls. The last one
    /// repeats forever.
    pub fn with_statuses(self, statuses: Vec<Run>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_messages(self, messages: Vec<ThreadMessage>) -> Self {
        *self.messages.lock().unwrap() = messages;
        self
    }

    pub fn with_file_payload(mut self, payload: Value) -> Self {
        self.file_payload = payload;
        self
    }

    /// The first `n` file downloads fail with a 500.
    pub fn with_failing_download(self, n: u32) -> Self {
        *self.download_failures.lock().unwrap() = n;
        self
    }

    pub fn failing_create_run(mut self, status: u16, message: &str) -> Self {
        self.create_run_error = Some((status, message.to_string()));
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.log.lock().unwrap().iter().filter(|&c| pred(c)).count()
    }

    pub fn retrieve_count(&self) -> usize {
        self.count(|c| matches!(c, Call::RetrieveRun { .. }))
    }

    pub fn download_count(&self) -> usize {
        self.count(|c| matches!(c, Call::DownloadFile { .. }))
    }

    /// Time slept before each status check, measured on the tokio clock.
    pub fn poll_gaps_ms(&self) -> Vec<u64> {
        let start = self.run_created_at.lock().unwrap().expect("run was created");
        let times = self.retrieve_times.lock().unwrap();
        let mut previous = start;
        times
            .iter()
            .map(|t| {
                let gap = t.duration_since(previous).as_millis() as u64;
                previous = *t;
                gap
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AssistantBackend for ScriptedBackend {
    async fn create_thread(&self) -> Result<Thread, AssistantError> {
        self.record(Call::CreateThread);
        let id = self
            .thread_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "t-extra".to_string());
        Ok(Thread { id, created_at: 1_700_000_000, metadata: None })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, AssistantError> {
        self.record(Call::CreateMessage {
            thread_id: thread_id.to_string(),
            text: content.to_string(),
        });
        Ok(ThreadMessage {
            id: "msg_user".into(),
            thread_id: thread_id.to_string(),
            role,
            run_id: None,
            content: vec![text_item(content, &[])],
            created_at: 0,
        })
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, AssistantError> {
        self.record(Call::CreateRun {
            thread_id: thread_id.to_string(),
            assistant_id: assistant_id.to_string(),
        });
        if let Some((status, message)) = &self.create_run_error {
            return Err(AssistantError::api(*status, message.clone()));
        }
        *self.run_created_at.lock().unwrap() = Some(Instant::now());
        let mut run = self.created_run.clone();
        run.thread_id = thread_id.to_string();
        Ok(run)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        self.record(Call::RetrieveRun { run_id: run_id.to_string() });
        self.retrieve_times.lock().unwrap().push(Instant::now());

        let mut statuses = self.statuses.lock().unwrap();
        let mut next = if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses
                .front()
                .cloned()
                .unwrap_or_else(|| run(run_id, RunStatus::InProgress))
        };
        next.thread_id = thread_id.to_string();
        Ok(next)
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, AssistantError> {
        self.record(Call::SubmitToolOutputs {
            run_id: run_id.to_string(),
            outputs: outputs.to_vec(),
        });
        let mut submitted = run(run_id, RunStatus::Queued);
        submitted.thread_id = thread_id.to_string();
        Ok(submitted)
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        query: &ListMessagesQuery,
    ) -> Result<MessageList, AssistantError> {
        self.record(Call::ListMessages { limit: query.limit });
        Ok(MessageList {
            data: self.messages.lock().unwrap().clone(),
            has_more: false,
        })
    }

    async fn download_file(&self, file_id: &str) -> Result<Value, AssistantError> {
        self.record(Call::DownloadFile { file_id: file_id.to_string() });
        let mut failures = self.download_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(AssistantError::api(500, "file store unavailable"));
        }
        Ok(self.file_payload.clone())
    }
}

/// Tool executor that logs into the backend's call log.
pub struct RecordingToolExecutor {
    log: CallLog,
    output: String,
}

impl RecordingToolExecutor {
    pub fn new(log: CallLog, output: &str) -> Self {
        Self { log, output: output.to_string() }
    }
}

#[async_trait]
impl ToolExecutor for RecordingToolExecutor {
    async fn run(
        &self,
        _thread_id: &str,
        run_id: &str,
        tool_calls: &[ToolCall],
    ) -> Result<Vec<ToolOutput>, AssistantError> {
        self.log.lock().unwrap().push(Call::ToolExecutorRun {
            run_id: run_id.to_string(),
            call_ids: tool_calls.iter().map(|c| c.id.clone()).collect(),
        });
        Ok(tool_calls
            .iter()
            .map(|c| ToolOutput::new(&c.id, &self.output))
            .collect())
    }
}

/// Tool executor that takes `delay` on the tokio clock before answering.
pub struct SlowToolExecutor {
    log: CallLog,
    delay: Duration,
}

impl SlowToolExecutor {
    pub fn new(log: CallLog, delay: Duration) -> Self {
        Self { log, delay }
    }
}

#[async_trait]
impl ToolExecutor for SlowToolExecutor {
    async fn run(
        &self,
        _thread_id: &str,
        run_id: &str,
        tool_calls: &[ToolCall],
    ) -> Result<Vec<ToolOutput>, AssistantError> {
        self.log.lock().unwrap().push(Call::ToolExecutorRun {
            run_id: run_id.to_string(),
            call_ids: tool_calls.iter().map(|c| c.id.clone()).collect(),
        });
        tokio::time::sleep(self.delay).await;
        Ok(tool_calls.iter().map(|c| ToolOutput::new(&c.id, "late")).collect())
    }
}

/// Tool executor that cancels `token` and then answers immediately, so the
/// cancellation lands between tool execution and output submission.
pub struct CancellingToolExecutor {
    token: CancellationToken,
}

impl CancellingToolExecutor {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl ToolExecutor for CancellingToolExecutor {
    async fn run(
        &self,
        _thread_id: &str,
        _run_id: &str,
        tool_calls: &[ToolCall],
    ) -> Result<Vec<ToolOutput>, AssistantError> {
        self.token.cancel();
        Ok(tool_calls.iter().map(|c| ToolOutput::new(&c.id, "ok")).collect())
    }
}

pub fn run(id: &str, status: RunStatus) -> Run {
    Run {
        id: id.to_string(),
        thread_id: "t1".to_string(),
        status,
        assistant_id: Some("asst_test".to_string()),
        required_action: None,
        last_error: None,
    }
}

pub fn run_requiring(id: &str, call_ids: &[&str]) -> Run {
    run_requiring_tool(id, "lookup", call_ids)
}

pub fn run_requiring_tool(id: &str, tool: &str, call_ids: &[&str]) -> Run {
    let mut run = run(id, RunStatus::RequiresAction);
    run.required_action = Some(RequiredAction {
        kind: "submit_tool_outputs".to_string(),
        submit_tool_outputs: SubmitToolOutputs {
            tool_calls: call_ids
                .iter()
                .map(|id| ToolCall {
                    id: id.to_string(),
                    kind: "function".to_string(),
                    function: FunctionCall {
                        name: tool.to_string(),
                        arguments: "{}".to_string(),
                    },
                })
                .collect(),
        },
    });
    run
}

pub fn text_item(value: &str, annotations: &[&str]) -> Value {
    json!({
        "type": "text",
        "text": {
            "value": value,
            "annotations": annotations
                .iter()
                .map(|a| json!({"type": "file_citation", "text": a, "file_citation": {"file_id": "cite"}}))
                .collect::<Vec<_>>(),
        }
    })
}

pub fn image_item(file_id: &str) -> Value {
    json!({"type": "image_file", "image_file": {"file_id": file_id}})
}

pub fn message(id: &str, role: MessageRole, run_id: Option<&str>, content: Vec<Value>) -> ThreadMessage {
    ThreadMessage {
        id: id.to_string(),
        thread_id: "t1".to_string(),
        role,
        run_id: run_id.map(str::to_string),
        content,
        created_at: 0,
    }
}
