//! Image classification collaborators.
//!
//! The pipeline depends only on the [`ImageClassifier`] capability:
//! anything that maps a rendered image to a raw category label can be
//! plugged in. [`OpenAiClassifier`] is the production strategy, asking a
//! vision model to pick one of the known categories.

use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::time::sleep;

use crate::error::ClassifyError;
use crate::openai::{ChatMessage, ChatRequest, ChatSender, ContentPart, ImageUrl, OpenAiError};

/// Maps a rendered image to a raw category label.
///
/// The label is whatever the backing model said; the caller resolves it
/// through the category registry, so implementations are free to return
/// strings outside the known set.
#[allow(async_fn_in_trait)]
pub trait ImageClassifier {
    async fn classify(&self, image: &Path) -> Result<String, ClassifyError>;

    /// Cheap availability probe used by `check` before a run.
    async fn is_available(&self) -> bool;
}

/// Prompt sent alongside each rendered image. The model is instructed to
/// answer with exactly one category name so resolution stays trivial.
const CLASSIFICATION_PROMPT: &str = "\
Analyze this embroidery image and categorize it into ONE of the following main categories:

- teddy_bears (teddy bears, bears)
- angels (angels)
- names (names, text, letters)
- cars (cars, vehicles)
- flowers (flowers, floral)
- animals (animals, pets)
- hearts (hearts, love)
- stars (stars)
- butterflies (butterflies)
- babies (babies, children)
- christmas (christmas, holiday)
- easter (easter)
- sports (sports)
- food (food)
- nature (nature, trees)
- other (other)

Respond ONLY with the category name in English, as one word, without additional explanations.
Valid response examples: \"teddy_bears\", \"flowers\", \"names\", \"cars\"";

/// Vision-model classification strategy over an OpenAI-compatible chat API.
///
/// Retries transient failures with exponential backoff; rate-limit
/// responses wait for the server-suggested delay instead.
pub struct OpenAiClassifier<S: ChatSender> {
    sender: S,
    model: String,
    max_retries: u32,
    base_delay_ms: u64,
}

impl<S: ChatSender> OpenAiClassifier<S> {
    pub fn new(sender: S, model: String, max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            sender,
            model,
            max_retries,
            base_delay_ms,
        }
    }

    fn request_for(&self, base64_image: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            max_tokens: 50,
            temperature: 0.1,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: vec![
                    ContentPart::Text {
                        text: CLASSIFICATION_PROMPT.into(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{base64_image}"),
                            // Low resolution keeps token usage down.
                            detail: "low".into(),
                        },
                    },
                ],
            }],
        }
    }
}

/// delay = base_delay_ms * 2^(attempt - 1)
fn delay_for_attempt(base_delay_ms: u64, attempt: u32) -> u64 {
    base_delay_ms * 2u64.pow(attempt.saturating_sub(1))
}

impl<S: ChatSender> ImageClassifier for OpenAiClassifier<S> {
    async fn classify(&self, image: &Path) -> Result<String, ClassifyError> {
        if !image.is_file() {
            return Err(ClassifyError::ImageMissing(image.to_path_buf()));
        }

        // Encode once; the same payload is reused across attempts.
        let bytes = tokio::fs::read(image).await?;
        let encoded = BASE64.encode(&bytes);
        let req = self.request_for(&encoded);

        let attempts = self.max_retries.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            tracing::debug!(attempt, max = attempts, image = %image.display(), "classification attempt");

            match self.sender.send_chat(&req).await {
                Ok(resp) => match resp.first_text() {
                    Some(text) => {
                        let label = text.trim().to_string();
                        tracing::info!(label = %label, image = %image.display(), "classifier answered");
                        return Ok(label);
                    }
                    None => {
                        last_error = ClassifyError::EmptyResponse.to_string();
                    }
                },
                Err(OpenAiError::RateLimited { retry_after_ms }) => {
                    last_error = format!("rate limited, retry after {retry_after_ms}ms");
                    if attempt < attempts {
                        sleep(Duration::from_millis(retry_after_ms)).await;
                        continue;
                    }
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            if attempt < attempts {
                let delay = delay_for_attempt(self.base_delay_ms, attempt);
                tracing::warn!(attempt, delay_ms = delay, error = %last_error, "classification attempt failed, backing off");
                sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(ClassifyError::RetriesExhausted {
            attempts,
            last: last_error,
        })
    }

    async fn is_available(&self) -> bool {
        let req = ChatRequest {
            model: self.model.clone(),
            max_tokens: 1,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: vec![ContentPart::Text {
                    text: "ping".into(),
                }],
            }],
        };
        match self.sender.send_chat(&req).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "classifier availability probe failed");
                false
            }
        }
    }
}
