//! HTTP client for the Anthropic Messages API.

use crate::domain::messages::{ApiErrorBody, MessageRequest, MessageResponse};
use crate::domain::ports::{ChatClient, ConfigProvider};
use crate::utils::error::{ChatError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Client;
use std::time::Duration;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const MESSAGES_PATH: &str = "/v1/messages";
const MAX_BACKOFF: Duration = Duration::from_secs(8);
const MAX_RETRY_AFTER_SECONDS: u64 = 60;

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl AnthropicClient {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let Some(api_key) = config.api_key() else {
            tracing::error!("API key not found in configuration or environment");
            return Err(ChatError::MissingApiKey);
        };

        let client = Client::builder()
            .user_agent(concat!("anthropic-chat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: format!("{}{}", config.api_base_url().trim_end_matches('/'), MESSAGES_PATH),
            timeout: config.request_timeout(),
            max_retries: config.max_retries(),
            retry_base_delay: config.retry_base_delay(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_once(&self, request: &MessageRequest) -> Result<MessageResponse> {
        tracing::debug!(
            "POST {} (model: {}, messages: {})",
            self.endpoint,
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        tracing::debug!("Messages API response status: {}", status);

        if status.is_success() {
            let body = response.bytes().await.map_err(transport_error)?;
            return serde_json::from_slice(&body).map_err(|e| ChatError::InvalidResponse {
                message: format!("failed to decode message: {}", e),
            });
        }

        let retry_after = parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), &body, retry_after))
    }

    fn retry_delay(&self, attempt: u32, error: &ChatError) -> Duration {
        if let Some(seconds) = error.retry_after() {
            return Duration::from_secs(seconds.min(MAX_RETRY_AFTER_SECONDS));
        }

        let factor = 2u32.saturating_pow(attempt);
        self.retry_base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

#[async_trait]
impl ChatClient for AnthropicClient {
    async fn create_message(&self, request: &MessageRequest) -> Result<MessageResponse> {
        let mut attempt = 0;
        loop {
            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_delay(attempt, &e);
                    attempt += 1;
                    tracing::warn!(
                        "⚠️ Messages API request failed: {}. Retrying in {:?} ({}/{})",
                        e,
                        delay,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

fn transport_error(error: reqwest::Error) -> ChatError {
    if error.is_timeout() {
        ChatError::Connection {
            message: format!("request timed out: {}", error),
        }
    } else if error.is_connect() || error.is_request() {
        ChatError::Connection {
            message: error.to_string(),
        }
    } else if error.is_decode() {
        ChatError::InvalidResponse {
            message: error.to_string(),
        }
    } else {
        ChatError::HttpError(error)
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn status_error(status: u16, body: &str, retry_after: Option<u64>) -> ChatError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|body| body.error.message)
        .unwrap_or_else(|| "Unknown error".to_string());

    if status == 429 {
        ChatError::RateLimited {
            message,
            retry_after,
        }
    } else {
        ChatError::ApiStatus {
            status,
            message,
            retry_after,
        }
    }
}
