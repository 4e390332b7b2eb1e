use std::sync::Arc;

use tracing::warn;
use tripgenie_core::{build_intent_prompt, parse_classification, ChatMessage, Classification};
use tripgenie_llm::{CompletionModel, CompletionRequest};

/// Classifies the latest message with one stateless completion call. Any
/// failure, including an unreachable model, falls open to general chat.
#[derive(Debug)]
pub struct IntentExtractor<M> {
    model: Arc<M>,
}

impl<M> IntentExtractor<M>
where
    M: CompletionModel,
{
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }

    pub async fn classify(&self, message: &str, history: &[ChatMessage]) -> Classification {
        let request = CompletionRequest::single_turn(build_intent_prompt(message, history));

        let raw = match self.model.complete(&request).await {
            Ok(raw) => raw,
            Err(error) => {
                warn!(error = %error, "intent classification request failed");
                return Classification::Fallback {
                    reason: error.to_string(),
                    raw: String::new(),
                };
            }
        };

        let classification = parse_classification(&raw);
        if let Classification::Fallback { reason, raw } = &classification {
            warn!(reason = %reason, raw = %raw, "could not decode intent classification");
        }
        classification
    }
}
