//! Bridge configuration (explicit values, optionally seeded from the environment).

use std::fmt;
use std::time::Duration;

use crate::error::{AssistantError, Result};
use crate::run::PollSchedule;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_BETA_HEADER: &str = "assistants=v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration read once when the backend and controller are built.
#[derive(Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub organization: Option<String>,
    pub assistant_id: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub beta_header: String,
    pub poll_schedule: PollSchedule,
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &"..")
            .field("organization", &self.organization)
            .field("assistant_id", &self.assistant_id)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("beta_header", &self.beta_header)
            .field("poll_schedule", &self.poll_schedule)
            .finish()
    }
}

impl AssistantConfig {
    pub fn new(api_key: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            organization: None,
            assistant_id: assistant_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            beta_header: DEFAULT_BETA_HEADER.to_string(),
            poll_schedule: PollSchedule::default(),
        }
    }

    /// Load from environment variables (`OPENAI_API_KEY`, `OPENAI_ASSISTANT_ID`, ...).
    ///
    /// A `.env` file is loaded first when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` is this with `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("OPENAI_API_KEY")
            .ok_or_else(|| AssistantError::Configuration("OPENAI_API_KEY is not set".into()))?;
        let assistant_id = non_empty("OPENAI_ASSISTANT_ID").ok_or_else(|| {
            AssistantError::Configuration("OPENAI_ASSISTANT_ID is not set".into())
        })?;

        let mut config = Self::new(api_key, assistant_id);
        config.organization = non_empty("OPENAI_ORGANIZATION");

        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            config.base_url = url;
        }
        if let Some(raw) = non_empty("OPENAI_REQUEST_TIMEOUT") {
            let secs: f64 = raw.trim().parse().map_err(|_| {
                AssistantError::Configuration(format!(
                    "OPENAI_REQUEST_TIMEOUT must be a number of seconds, got {raw:?}"
                ))
            })?;
            if !secs.is_finite() || secs < 0.0 {
                return Err(AssistantError::Configuration(format!(
                    "OPENAI_REQUEST_TIMEOUT must be a positive number of seconds, got {raw:?}"
                )));
            }
            config.request_timeout = Duration::from_secs_f64(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_beta_header(mut self, beta_header: impl Into<String>) -> Self {
        self.beta_header = beta_header.into();
        self
    }

    pub fn with_poll_schedule(mut self, schedule: PollSchedule) -> Self {
        self.poll_schedule = schedule;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AssistantError::Configuration("API key cannot be empty".into()));
        }
        if self.assistant_id.trim().is_empty() {
            return Err(AssistantError::Configuration(
                "Assistant id cannot be empty".into(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(AssistantError::Configuration(
                "Request timeout must be greater than zero".into(),
            ));
        }
        if self.poll_schedule.max_iterations == 0 {
            return Err(AssistantError::Configuration(
                "Poll schedule needs at least one iteration".into(),
            ));
        }
        Ok(())
    }
}
