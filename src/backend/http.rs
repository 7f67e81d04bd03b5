//! HTTP client construction, headers and status mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::config::AssistantConfig;
use crate::error::AssistantError;

const ORGANIZATION_HEADER: &str = "openai-organization";
const BETA_HEADER: &str = "openai-beta";

/// Build a client with the configured per-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, AssistantError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(AssistantError::Network)
}

/// Bearer auth plus the organization and beta headers.
pub fn assistant_headers(config: &AssistantConfig) -> Result<HeaderMap, AssistantError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
        .map_err(|_| AssistantError::Configuration("API key is not a valid header value".into()))?;
    headers.insert(AUTHORIZATION, auth);

    if let Some(org) = &config.organization {
        let value = HeaderValue::from_str(org).map_err(|_| {
            AssistantError::Configuration("Organization is not a valid header value".into())
        })?;
        headers.insert(ORGANIZATION_HEADER, value);
    }

    let beta = HeaderValue::from_str(&config.beta_header)
        .map_err(|_| AssistantError::Configuration("Beta header is not a valid header value".into()))?;
    headers.insert(BETA_HEADER, beta);

    Ok(headers)
}

pub fn trim_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Turn a non-2xx status into an error.
pub fn status_to_error(status: u16, body: &str) -> AssistantError {
    match status {
        401 | 403 => AssistantError::Authentication(error_message(body)),
        429 => AssistantError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => AssistantError::api(status, error_message(body)),
    }
}

/// Read a successful response as `T`, or map the failure status.
pub async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AssistantError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(status_to_error(status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}
