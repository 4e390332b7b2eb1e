mod gemini;

use thiserror::Error;
use tripgenie_core::Role;

pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response could not be decoded: {0}")]
    Decode(String),
    #[error("completion response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<String>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![text.into()],
        }
    }
}

/// A single non-streaming completion: optional system instruction plus the
/// ordered turns, the last of which is the one to answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub system_instruction: Option<String>,
    pub contents: Vec<Turn>,
}

impl CompletionRequest {
    pub fn single_turn(prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: None,
            contents: vec![Turn::user(prompt)],
        }
    }
}

pub trait CompletionModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
