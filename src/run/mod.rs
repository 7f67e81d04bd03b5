//! Run lifecycle controller.
//!
//! One [`RunController::execute`] call:
//! - posts the user message on the thread
//! - creates a run against the configured assistant
//! - polls the run with a linear backoff, satisfying tool calls whenever the
//!   run is in `requires_action`
//! - collects this run's assistant messages and normalizes their content
//!
//! The wait is bounded by [`PollSchedule::max_iterations`]. Running out of
//! iterations is not an error: the last observed status is reported along
//! with whatever assistant content already exists for the run.

pub mod schedule;

pub use schedule::PollSchedule;

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{AssistantBackend, ListMessagesQuery, MessageRole, Run, RunStatus};
use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::response::{ContentNormalizer, NormalizedResponse};
use crate::tools::{NoopToolExecutor, ToolExecutor};

/// Why the poll loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The run reached `completed` or `failed`.
    Terminal,
    /// The iteration budget ran out first.
    BudgetExhausted,
    /// The caller cancelled the wait.
    Cancelled,
}

/// Outcome of one [`RunController::execute`] call.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub thread_id: String,
    pub run_id: String,
    /// Last status observed from the backend.
    pub status: RunStatus,
    pub termination: Termination,
    /// Status checks performed.
    pub iterations: u32,
    /// Normalized assistant content, empty when cancelled.
    pub responses: Vec<NormalizedResponse>,
}

impl RunReport {
    /// Only a `completed` run counts as success.
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.termination == Termination::Cancelled
    }
}

/// Result of waiting on a run.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub run: Run,
    pub termination: Termination,
    pub iterations: u32,
}

/// Drives a run from creation to a settled status.
#[derive(Clone)]
pub struct RunController {
    backend: Arc<dyn AssistantBackend>,
    tools: Arc<dyn ToolExecutor>,
    normalizer: ContentNormalizer,
    assistant_id: String,
    schedule: PollSchedule,
    message_page: ListMessagesQuery,
}

impl RunController {
    pub fn new(backend: Arc<dyn AssistantBackend>, config: &AssistantConfig) -> Self {
        Self {
            normalizer: ContentNormalizer::new(backend.clone()),
            backend,
            tools: Arc::new(NoopToolExecutor),
            assistant_id: config.assistant_id.clone(),
            schedule: config.poll_schedule,
            message_page: ListMessagesQuery::default(),
        }
    }

    pub fn with_tool_executor(mut self, tools: Arc<dyn ToolExecutor>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_message_page(mut self, query: ListMessagesQuery) -> Self {
        self.message_page = query;
        self
    }

    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    /// Post `text` on the thread, run the assistant and collect its reply.
    ///
    /// Backend rejections abort immediately; the user message stays on the
    /// thread. Cancellation is reported through [`Termination::Cancelled`].
    pub async fn execute(
        &self,
        thread_id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<RunReport, AssistantError> {
        self.backend
            .create_message(thread_id, MessageRole::User, text)
            .await?;

        let run = self
            .backend
            .create_run(thread_id, &self.assistant_id)
            .await?;
        info!(thread_id, run_id = %run.id, status = %run.status, "run created");

        let outcome = self.poll_until_settled(thread_id, run, cancel).await?;

        let responses = match outcome.termination {
            Termination::Cancelled => Vec::new(),
            Termination::Terminal | Termination::BudgetExhausted => {
                self.collect_responses(thread_id, &outcome.run.id).await?
            }
        };

        Ok(RunReport {
            thread_id: thread_id.to_string(),
            run_id: outcome.run.id,
            status: outcome.run.status,
            termination: outcome.termination,
            iterations: outcome.iterations,
            responses,
        })
    }

    /// Poll `run` until it is `completed`/`failed`, the budget runs out, or
    /// `cancel` fires. Tool calls are answered before each sleep.
    pub async fn poll_until_settled(
        &self,
        thread_id: &str,
        mut run: Run,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, AssistantError> {
        let mut iteration: u32 = 0;

        loop {
            if run.status == RunStatus::RequiresAction
                && !self.dispatch_tools(thread_id, &run, cancel).await?
            {
                return Ok(cancelled(run, iteration));
            }

            let delay = self.schedule.delay_for(iteration);
            debug!(run_id = %run.id, iteration, delay_ms = delay.as_millis() as u64, "waiting before status check");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(cancelled(run, iteration)),
                _ = tokio::time::sleep(delay) => {}
            }

            let polled = until_cancelled(cancel, self.backend.retrieve_run(thread_id, &run.id)).await;
            let Some(next) = polled else {
                return Ok(cancelled(run, iteration));
            };
            run = next?;
            iteration += 1;
            debug!(run_id = %run.id, iteration, status = %run.status, "run status");

            if run.status.ends_polling() {
                info!(run_id = %run.id, iterations = iteration, status = %run.status, "run ended");
                return Ok(PollOutcome {
                    run,
                    termination: Termination::Terminal,
                    iterations: iteration,
                });
            }
            if iteration >= self.schedule.max_iterations {
                warn!(
                    run_id = %run.id,
                    iterations = iteration,
                    status = %run.status,
                    "run did not settle within the iteration budget"
                );
                return Ok(PollOutcome {
                    run,
                    termination: Termination::BudgetExhausted,
                    iterations: iteration,
                });
            }
        }
    }

    /// Run the tool executor and submit its outputs. `false` when cancelled.
    async fn dispatch_tools(
        &self,
        thread_id: &str,
        run: &Run,
        cancel: &CancellationToken,
    ) -> Result<bool, AssistantError> {
        let calls = run.pending_tool_calls();
        debug!(run_id = %run.id, pending = calls.len(), "run requires action");

        let Some(outputs) = until_cancelled(cancel, self.tools.run(thread_id, &run.id, calls)).await
        else {
            return Ok(false);
        };
        let outputs = outputs?;

        let Some(submitted) = until_cancelled(
            cancel,
            self.backend.submit_tool_outputs(thread_id, &run.id, &outputs),
        )
        .await
        else {
            return Ok(false);
        };
        submitted?;
        Ok(true)
    }

    /// Normalize the content of this run's assistant messages, in the order
    /// the backend listed them.
    pub async fn collect_responses(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Vec<NormalizedResponse>, AssistantError> {
        let page = self
            .backend
            .list_messages(thread_id, &self.message_page)
            .await?;

        let mut responses = Vec::new();
        for message in page.data.iter().filter(|m| m.is_assistant_reply_for(run_id)) {
            for item in &message.content {
                responses.push(self.normalizer.normalize(item)?);
            }
        }

        debug!(thread_id, run_id, responses = responses.len(), "collected responses");
        Ok(responses)
    }
}

fn cancelled(run: Run, iterations: u32) -> PollOutcome {
    info!(run_id = %run.id, iterations, "run wait cancelled");
    PollOutcome {
        run,
        termination: Termination::Cancelled,
        iterations,
    }
}

async fn until_cancelled<T>(cancel: &CancellationToken, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        value = fut => Some(value),
    }
}
