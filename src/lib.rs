//! Assistant Bridge — thread/run assistant API integration for message pipelines.
//!
//! Forwards a user's message into a persistent conversation thread, starts a
//! run, waits for it with a linear backoff while satisfying tool-call
//! requests, then collects and normalizes the assistant's reply content.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use assistant_bridge::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> assistant_bridge::error::Result<()> {
//! let config = AssistantConfig::from_env()?;
//! let backend = Arc::new(OpenAiAssistantsBackend::new(&config)?);
//! let controller = RunController::new(backend.clone(), &config);
//!
//! let thread = backend.create_thread().await?;
//! let report = controller
//!     .execute(&thread.id, "What is 2+2?", &CancellationToken::new())
//!     .await?;
//! for response in &report.responses {
//!     if let NormalizedResponse::Text(text) = response {
//!         println!("{}", text.text());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod conversation;
pub mod error;
pub mod prelude;
pub mod response;
pub mod run;
pub mod tools;

#[cfg(feature = "cli")]
pub mod cli;
