use std::time::Duration;

use reqwest::Client;

use super::error::OpenAiError;
use super::types::{ChatRequest, ChatResponse};

const API_BASE_URL: &str = "https://api.openai.com";

/// Anything that can send a chat completion request. The pipeline's
/// classifier is generic over this, so tests can substitute a mock.
#[allow(async_fn_in_trait)]
pub trait ChatSender {
    async fn send_chat(&self, req: &ChatRequest) -> Result<ChatResponse, OpenAiError>;
}

pub struct OpenAiClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, API_BASE_URL.to_string(), timeout_secs)
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(api_key: String, base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self {
            api_key,
            client,
            base_url,
        }
    }
}

impl ChatSender for OpenAiClient {
    async fn send_chat(&self, req: &ChatRequest) -> Result<ChatResponse, OpenAiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(req)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return Err(OpenAiError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(OpenAiError::api(status.as_u16(), &body));
        }

        let body = response.json::<ChatResponse>().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::types::{ChatMessage, ContentPart};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest {
            model: "gpt-4o".into(),
            max_tokens: 50,
            temperature: 0.1,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: vec![ContentPart::Text {
                    text: "hello".into(),
                }],
            }],
        }
    }

    #[tokio::test]
    async fn send_chat_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "model": "gpt-4o",
                "choices": [
                    {"message": {"role": "assistant", "content": "flowers"}, "finish_reason": "stop"}
                ],
                "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url("sk-test".into(), server.uri(), 30);
        let resp = client.send_chat(&request()).await.unwrap();
        assert_eq!(resp.first_text(), Some("flowers"));
    }

    #[tokio::test]
    async fn send_chat_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url("sk-test".into(), server.uri(), 30);
        let err = client.send_chat(&request()).await.unwrap_err();
        match err {
            OpenAiError::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, 7000),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_chat_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error"
                }
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url("sk-bad".into(), server.uri(), 30);
        let err = client.send_chat(&request()).await.unwrap_err();
        match err {
            OpenAiError::ApiError {
                status,
                message,
                kind,
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
                assert_eq!(kind.as_deref(), Some("invalid_request_error"));
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_chat_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url("sk-test".into(), server.uri(), 30);
        let err = client.send_chat(&request()).await.unwrap_err();
        match err {
            OpenAiError::ApiError { status, message, kind } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
                assert_eq!(kind, None);
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }
}
