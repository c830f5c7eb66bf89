//! Request pipeline for the AnkiConnect HTTP API.
//!
//! Every call is a single `POST {action, version, params}` against the local
//! endpoint. Transport failures (connection errors, non-200 statuses and
//! bodies that are not a response envelope) are retried with exponential
//! back-off. Errors reported by AnkiConnect itself are deterministic and are
//! returned on the first attempt.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::actions::{self, API_VERSION};
use super::error::AnkiError;
use crate::config::ClientConfig;

#[derive(Debug, Serialize)]
struct Request<'a> {
    action: &'a str,
    version: u8,
    params: &'a Value,
}

/// The `{result, error}` wrapper every AnkiConnect response uses.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<Value>,
}

impl Envelope {
    fn into_result<T: DeserializeOwned>(self, action: &str) -> Result<T, AnkiError> {
        if let Some(error) = self.error {
            let message = match error {
                Value::String(message) => message,
                other => other.to_string(),
            };
            return Err(AnkiError::Backend {
                action: action.to_string(),
                message,
            });
        }

        if self.result.is_null() && !actions::null_result_is_success(action) {
            return Err(AnkiError::NullResult {
                action: action.to_string(),
            });
        }

        serde_json::from_value(self.result).map_err(|err| AnkiError::Decode {
            action: action.to_string(),
            message: err.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AnkiClient {
    http: Client,
    config: ClientConfig,
}

impl AnkiClient {
    pub fn new(config: ClientConfig) -> Result<Self, AnkiError> {
        // AnkiConnect listens on loopback; proxy settings from the
        // environment must not apply.
        let http = Client::builder()
            .no_proxy()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|err| AnkiError::Client(err.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Delay slept before retry number `retry` (1-based).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.config.base_delay.saturating_mul(factor)
    }

    /// Run `action` and decode its result as `T`.
    ///
    /// Null results decode only for the actions listed in
    /// [`actions::NULL_ON_SUCCESS`], so `T` is usually `()` for those.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Value,
    ) -> Result<T, AnkiError> {
        let request = Request {
            action,
            version: API_VERSION,
            params: &params,
        };
        let max_attempts = self.config.max_retries.max(1);
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = self.backoff_delay(attempt - 1);
                tracing::info!(
                    action,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "retrying AnkiConnect request"
                );
                tokio::time::sleep(delay).await;
            }

            tracing::debug!(action, attempt, "sending AnkiConnect request");
            match self.send_once(&request).await {
                Ok(envelope) => {
                    let outcome = envelope.into_result(action);
                    match &outcome {
                        Ok(_) => tracing::debug!(action, attempt, "AnkiConnect request succeeded"),
                        Err(err) => tracing::warn!(action, attempt, error = %err, "AnkiConnect request failed"),
                    }
                    return outcome;
                }
                Err(message) => {
                    tracing::warn!(
                        action,
                        attempt,
                        max_attempts,
                        error = %message,
                        "AnkiConnect transport failure"
                    );
                    last_error = message;
                }
            }
        }

        Err(AnkiError::Transport {
            attempts: max_attempts,
            message: last_error,
        })
    }

    async fn send_once(&self, request: &Request<'_>) -> Result<Envelope, String> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| format!("request failed: {err}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(format!("unexpected HTTP status {status}"));
        }

        let body = response
            .text()
            .await
            .map_err(|err| format!("failed to read response body: {err}"))?;
        serde_json::from_str(&body).map_err(|err| format!("unparseable response body: {err}"))
    }
}
