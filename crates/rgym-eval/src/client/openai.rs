//! OpenAI-compatible chat completions client

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use rgym_core::error::{GymError, GymResult};
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::{instrument, warn};

use super::{Completion, CompletionRequest, ModelClient};

/// Connection settings
#[derive(Debug, Clone)]
pub struct OpenAiClientConfig {
    /// Endpoint root, e.g. `http://localhost:8000/v1`
    pub base_url: String,

    /// Bearer token; local servers usually need none
    pub api_key: Option<String>,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// First backoff delay; doubles on every retry
    pub base_delay: Duration,

    /// Per-request timeout
    pub timeout: Duration,
}

impl OpenAiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(600),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Backoff before retry number `attempt` (0-based): `base * 2^attempt`
    /// plus up to half of that again as jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = self.base_delay.saturating_mul(2_u32.saturating_pow(attempt));
        let jitter_ms = {
            let mut rng = rand::thread_rng();
            rng.gen_range(0..=(base.as_millis() as u64 / 2))
        };
        base + Duration::from_millis(jitter_ms)
    }
}

/// Client for `POST {base_url}/chat/completions`
pub struct OpenAiClient {
    config: OpenAiClientConfig,
    http_client: Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiClientConfig) -> GymResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GymError::model(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Client for `base_url` with the API key from `RGYM_API_KEY` or
    /// `OPENAI_API_KEY`
    pub fn from_env(base_url: &str) -> GymResult<Self> {
        let mut config = OpenAiClientConfig::new(base_url);
        if let Some(key) = std::env::var("RGYM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty())
        {
            config = config.with_api_key(key);
        }
        Self::new(config)
    }

    pub fn config(&self) -> &OpenAiClientConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn send(&self, body: &Value) -> GymResult<Completion> {
        let mut request = self.http_client.post(self.endpoint()).json(body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            GymError::model_transient(format!("Chat completion request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GymError::model_with_status(
                format!("Chat completion API error (status {}): {}", status, error_text),
                status.as_u16(),
                is_retryable_status(status.as_u16()),
            ));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| GymError::model(format!("Failed to parse completion response: {}", e)))?;

        parse_response(&response_json)
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    #[instrument(skip(self, request), fields(model = %request.model), level = "debug")]
    async fn complete(&self, request: &CompletionRequest) -> GymResult<Completion> {
        let body = request_body(request);
        let max_retries = self.config.max_retries;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match self.send(&body).await {
                Ok(completion) => {
                    if attempt > 0 {
                        tracing::info!(attempt, "request succeeded after retry");
                    }
                    return Ok(completion);
                }
                Err(error) => {
                    if !error.is_retryable() {
                        warn!(error = %error, "non-retryable error");
                        return Err(error);
                    }

                    if attempt < max_retries {
                        let delay = self.config.backoff(attempt);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = max_retries + 1,
                            delay_secs = delay.as_secs_f64(),
                            error = %error,
                            "retrying after failure"
                        );
                        sleep(delay).await;
                    } else {
                        tracing::error!(attempts = max_retries + 1, "all retry attempts exhausted");
                    }
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            GymError::model(format!(
                "All {} retry attempts failed without error details",
                max_retries + 1
            ))
        }))
    }
}

/// 429 and 5xx are worth retrying
fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

fn request_body(request: &CompletionRequest) -> Value {
    json!({
        "model": request.model,
        "messages": request.messages,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "top_p": request.top_p,
    })
}

fn parse_response(response: &Value) -> GymResult<Completion> {
    let content = response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| GymError::model("Completion response has no message content"))?;

    let usage = response.get("usage");
    let token_count = |field: &str| {
        usage
            .and_then(|u| u.get(field))
            .and_then(Value::as_u64)
            .map(|n| n as u32)
    };

    Ok(Completion {
        content: content.to_string(),
        prompt_tokens: token_count("prompt_tokens"),
        completion_tokens: token_count("completion_tokens"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;

    #[test]
    fn test_request_body() {
        let request = CompletionRequest {
            model: "qwen".to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("1 + 1 =")],
            max_tokens: 64,
            temperature: 0.5,
            top_p: 1.0,
        };
        let body = request_body(&request);
        assert_eq!(body["model"], "qwen");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "1 + 1 =");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(request.question(), Some("1 + 1 ="));
    }

    #[test]
    fn test_parse_response() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "<answer>2</answer>"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        });
        let completion = parse_response(&response).unwrap();
        assert_eq!(completion.content, "<answer>2</answer>");
        assert_eq!(completion.prompt_tokens, Some(12));
        assert_eq!(completion.completion_tokens, Some(5));

        let err = parse_response(&json!({"choices": []})).unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_status() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
    }

    #[test]
    fn test_backoff_bounds() {
        let config = OpenAiClientConfig::new("http://localhost:8000/v1");
        for attempt in 0..3 {
            let base = Duration::from_secs(1 << attempt);
            let delay = config.backoff(attempt);
            assert!(delay >= base);
            assert!(delay <= base + base / 2);
        }
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let client = OpenAiClient::new(OpenAiClientConfig::new("http://localhost:8000/v1/")).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_model_error() {
        let config = OpenAiClientConfig::new("http://127.0.0.1:9/v1")
            .with_max_retries(0)
            .with_timeout(Duration::from_secs(2));
        let client = OpenAiClient::new(config).unwrap();
        let request = CompletionRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage::user("hi")],
            max_tokens: 8,
            temperature: 0.0,
            top_p: 1.0,
        };
        let err = client.complete(&request).await.unwrap_err();
        assert!(matches!(err, GymError::Model { .. }));
        assert!(err.is_retryable());
    }
}
