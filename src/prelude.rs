//! Convenience re-exports for common use.

pub use crate::backend::{AssistantBackend, OpenAiAssistantsBackend, RunStatus, ToolCall, ToolOutput};
pub use crate::config::AssistantConfig;
pub use crate::conversation::{ConversationAdapter, IncomingMessage, InMemoryUserStorage, UserStorage};
pub use crate::error::{AssistantError, Result};
pub use crate::response::{ContentNormalizer, ImageResponse, NormalizedResponse, TextResponse};
pub use crate::run::{PollSchedule, RunController, RunReport, Termination};
pub use crate::tools::{FunctionTool, FunctionToolExecutor, NoopToolExecutor, Tool, ToolExecutor};
