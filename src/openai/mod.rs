pub mod client;
pub mod error;
pub mod types;

pub use client::{ChatSender, OpenAiClient};
pub use error::OpenAiError;
pub use types::{ChatMessage, ChatRequest, ChatResponse, ContentPart, ImageUrl, Usage};
