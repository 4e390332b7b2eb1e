mod extractor;
mod generator;


use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use tripgenie_core::{
    city_not_found_payload, compose_final_prompt, ChatMessage, ChatRequest, ChatResponse,
    ExtractedInfo, Intent,
};
use tripgenie_llm::CompletionModel;
use tripgenie_observability::AppMetrics;
use tripgenie_travel::{ProviderError, TravelData};
use uuid::Uuid;

pub use extractor::IntentExtractor;
pub use generator::{Generated, GenerationError, ResponseGenerator};

pub const COORDINATES_NOT_FOUND_PAYLOAD: &str = "Could not find city coordinates.";

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("response generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Runs one chat turn: classify, look up travel data when a city is known,
/// fold the data into the prompt, then generate the reply.
pub struct ConciergeAgent<M, T> {
    extractor: IntentExtractor<M>,
    generator: ResponseGenerator<M>,
    travel: Arc<T>,
    metrics: Arc<AppMetrics>,
}

impl<M, T> ConciergeAgent<M, T>
where
    M: CompletionModel,
    T: TravelData,
{
    pub fn new(model: Arc<M>, travel: Arc<T>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            extractor: IntentExtractor::new(model.clone()),
            generator: ResponseGenerator::new(model),
            travel,
            metrics,
        }
    }

    pub fn travel(&self) -> &T {
        &self.travel
    }

    #[instrument(skip(self, request), fields(turn_id = %Uuid::new_v4()))]
    pub async fn handle_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TurnError> {
        let started = Instant::now();
        self.metrics.inc_turn();

        let info = self.classify(&request.message, &request.history).await;
        info!(intent = info.intent.as_str(), city = ?info.city, "detected intent");

        let payload = self.gather_payload(&info).await;
        let prompt = compose_final_prompt(&request.message, payload.as_deref());
        if payload.is_some() {
            debug!(prompt = %prompt, "sending prompt with data");
        }

        let generated = self
            .generator
            .respond(&prompt, &request.history)
            .await
            .map_err(|err| {
                error!(error = %err, "chat turn failed");
                TurnError::from(err)
            })?;
        if generated.is_apology() {
            self.metrics.inc_generation_fallback();
        }

        self.metrics.observe_latency(started.elapsed());
        Ok(ChatResponse::model_text(generated.into_text()))
    }

    pub async fn classify(&self, message: &str, history: &[ChatMessage]) -> ExtractedInfo {
        let classification = self.extractor.classify(message, history).await;
        if classification.is_fallback() {
            self.metrics.inc_classification_fallback();
        }
        classification.into_info()
    }

    /// Builds the data payload for a classified turn. `None` means the prompt
    /// goes to the model unaugmented.
    pub async fn gather_payload(&self, info: &ExtractedInfo) -> Option<String> {
        let city = info.city.as_deref()?;
        self.metrics.inc_data_lookup();

        let code = match self.travel.resolve_city_code(city).await {
            Ok(Some(code)) => code,
            Ok(None) => return Some(city_not_found_payload(city)),
            Err(err) => return Some(self.provider_failure(err)),
        };

        match info.intent {
            Intent::SearchHotels => Some(self.travel.find_lodging(&code).await),
            Intent::FindAttractions => match self.travel.resolve_city_coordinates(city).await {
                Ok(Some(point)) => Some(self.travel.find_points_of_interest(point).await),
                Ok(None) => Some(COORDINATES_NOT_FOUND_PAYLOAD.to_string()),
                Err(err) => Some(self.provider_failure(err)),
            },
            Intent::GeneralChat => None,
        }
    }

    fn provider_failure(&self, err: ProviderError) -> String {
        self.metrics.inc_provider_error();
        warn!(error = %err, "travel lookup failed");
        err.to_payload()
    }
}
