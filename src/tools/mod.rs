//! Tool execution for runs in `requires_action`.

pub mod tool;

pub use tool::{FunctionTool, Tool, ToolContext};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::backend::{ToolCall, ToolOutput};
use crate::error::AssistantError;

/// Produces outputs for the tool calls a run is waiting on.
///
/// Implementations should answer every call id they are given. The returned
/// set is submitted as-is, including when empty.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn run(
        &self,
        thread_id: &str,
        run_id: &str,
        tool_calls: &[ToolCall],
    ) -> Result<Vec<ToolOutput>, AssistantError>;
}

/// Executor with no tools configured: always returns an empty output set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopToolExecutor;

#[async_trait]
impl ToolExecutor for NoopToolExecutor {
    async fn run(
        &self,
        _thread_id: &str,
        run_id: &str,
        tool_calls: &[ToolCall],
    ) -> Result<Vec<ToolOutput>, AssistantError> {
        debug!(run_id, pending = tool_calls.len(), "no tools configured");
        Ok(Vec::new())
    }
}

/// Dispatches function calls to registered [`Tool`]s by name.
///
/// Calls run concurrently. Unknown tools and tool failures become an
/// `{"error": ...}` output for that call, so every call id gets an answer.
#[derive(Default, Clone)]
pub struct FunctionToolExecutor {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl FunctionToolExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.register(Arc::new(tool));
        self
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    async fn run_one(&self, thread_id: &str, run_id: &str, call: &ToolCall) -> ToolOutput {
        let Some(tool) = self.tools.get(&call.function.name) else {
            warn!(tool = %call.function.name, call_id = %call.id, "unknown tool requested");
            return error_output(&call.id, format!("Unknown tool: {}", call.function.name));
        };

        let ctx = ToolContext {
            thread_id: thread_id.to_string(),
            run_id: run_id.to_string(),
            tool_call_id: call.id.clone(),
        };

        match tool.execute(decode_arguments(&call.function.arguments), &ctx).await {
            Ok(Value::String(text)) => ToolOutput::new(&call.id, text),
            Ok(value) => ToolOutput::new(&call.id, value.to_string()),
            Err(e) => {
                warn!(tool = %call.function.name, call_id = %call.id, error = %e, "tool failed");
                error_output(&call.id, e.to_string())
            }
        }
    }
}

#[async_trait]
impl ToolExecutor for FunctionToolExecutor {
    async fn run(
        &self,
        thread_id: &str,
        run_id: &str,
        tool_calls: &[ToolCall],
    ) -> Result<Vec<ToolOutput>, AssistantError> {
        let outputs = join_all(
            tool_calls
                .iter()
                .map(|call| self.run_one(thread_id, run_id, call)),
        )
        .await;
        Ok(outputs)
    }
}

fn decode_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn error_output(call_id: &str, message: String) -> ToolOutput {
    ToolOutput::new(call_id, json!({ "error": message }).to_string())
}
