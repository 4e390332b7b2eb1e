use std::sync::Arc;

use thiserror::Error;
use tracing::error;
use tripgenie_core::{ChatMessage, Role, GENERATION_FALLBACK_REPLY, RESPONSE_GENERATION_PROMPT};
use tripgenie_llm::{CompletionModel, CompletionRequest, Turn};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("history turn {index} has unsupported role '{role}'")]
    UnsupportedRole { index: usize, role: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    Text(String),
    Apology,
}

impl Generated {
    pub fn is_apology(&self) -> bool {
        matches!(self, Self::Apology)
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Apology => GENERATION_FALLBACK_REPLY.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ResponseGenerator<M> {
    model: Arc<M>,
    system_instruction: String,
}

impl<M> ResponseGenerator<M>
where
    M: CompletionModel,
{
    pub fn new(model: Arc<M>) -> Self {
        Self::with_system_instruction(model, RESPONSE_GENERATION_PROMPT)
    }

    pub fn with_system_instruction(model: Arc<M>, system_instruction: impl Into<String>) -> Self {
        Self {
            model,
            system_instruction: system_instruction.into(),
        }
    }

    /// Seeds a chat from prior turns. Only `user` and `model` turns can seed
    /// a chat.
    pub fn start_chat(
        &self,
        history: &[ChatMessage],
    ) -> Result<CompletionRequest, GenerationError> {
        let contents = history
            .iter()
            .enumerate()
            .map(|(index, message)| {
                let role =
                    Role::parse(&message.role).ok_or_else(|| GenerationError::UnsupportedRole {
                        index,
                        role: message.role.clone(),
                    })?;
                Ok(Turn {
                    role,
                    parts: message.parts.iter().map(|part| part.text.clone()).collect(),
                })
            })
            .collect::<Result<Vec<_>, GenerationError>>()?;

        Ok(CompletionRequest {
            system_instruction: Some(self.system_instruction.clone()),
            contents,
        })
    }

    /// Sends `prompt` as the next turn. Completion failures become an apology;
    /// only a history that cannot seed the chat is an error.
    pub async fn respond(
        &self,
        prompt: &str,
        history: &[ChatMessage],
    ) -> Result<Generated, GenerationError> {
        let mut request = self.start_chat(history)?;
        request.contents.push(Turn::user(prompt));

        match self.model.complete(&request).await {
            Ok(text) => Ok(Generated::Text(text)),
            Err(err) => {
                error!(error = %err, "response generation failed");
                Ok(Generated::Apology)
            }
        }
    }
}
