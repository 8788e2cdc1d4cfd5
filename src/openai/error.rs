//! Erros do cliente da API OpenAI.
//!
//! A API devolve falhas em um envelope JSON `{"error": {...}}`;
//! [`OpenAiError::api`] extrai a mensagem e o tipo desse envelope,
//! caindo no corpo bruto quando a resposta não é JSON (proxies e
//! gateways costumam responder texto puro).

use serde::Deserialize;
use thiserror::Error;

/// Falhas ao chamar o endpoint de chat completions.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// HTTP 429. `retry_after_ms` vem do header `retry-after` quando
    /// presente, senão usa um padrão de 1s.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Qualquer outra resposta não-2xx. `kind` é o campo `error.type`
    /// do envelope (ex.: "invalid_request_error"), quando presente.
    #[error("API error (status {status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        kind: Option<String>,
    },

    /// Falha na camada de transporte (DNS, conexão, timeout).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Envelope de erro retornado pela API: `{"error": {"message", "type"}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl OpenAiError {
    /// Constrói um [`OpenAiError::ApiError`] a partir do status e do
    /// corpo da resposta, decodificando o envelope quando possível.
    pub fn api(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => OpenAiError::ApiError {
                status,
                message: envelope.error.message,
                kind: envelope.error.kind,
            },
            Err(_) => OpenAiError::ApiError {
                status,
                message: body.trim().to_string(),
                kind: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_decodes_the_error_envelope() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        match OpenAiError::api(401, body) {
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

    #[test]
    fn api_falls_back_to_the_raw_body() {
        match OpenAiError::api(502, "Bad Gateway\n") {
            OpenAiError::ApiError { message, kind, .. } => {
                assert_eq!(message, "Bad Gateway");
                assert_eq!(kind, None);
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[test]
    fn display_formats() {
        let err = OpenAiError::api(
            429,
            r#"{"error": {"message": "slow down", "type": "rate_limit_error"}}"#,
        );
        assert_eq!(err.to_string(), "API error (status 429): slow down");

        let limited = OpenAiError::RateLimited { retry_after_ms: 250 };
        assert_eq!(limited.to_string(), "rate limited, retry after 250ms");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OpenAiError>();
    }
}
