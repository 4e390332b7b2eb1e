pub mod intent;
pub mod models;
pub mod prompt;

pub use intent::{format_history, parse_classification, strip_code_fences, Classification};
pub use models::*;
pub use prompt::{
    build_intent_prompt, city_not_found_payload, compose_final_prompt, GENERATION_FALLBACK_REPLY,
    INTENT_DETECTION_PROMPT, RESPONSE_GENERATION_PROMPT,
};
