use crate::intent::format_history;
use crate::models::ChatMessage;

pub const INTENT_DETECTION_PROMPT: &str = r#"You are an expert at analyzing user messages in a travel chat. Your task is to identify the user's intent and extract key information from the latest user message.

The possible intents are:
- 'search_hotels': User wants to find hotels.
- 'find_attractions': User wants to find tourist attractions, sights, or points of interest.
- 'general_chat': The user is asking a general question, making a statement, or asking something not related to a specific API tool.

From the user's message, extract the city they are asking about.

**IMPORTANT RULES:**
1. Analyze the **latest user message** for intent and city.
2. If the user's message mentions a city, use that city.
3. **If the user's message does NOT mention a city, but the intent is 'search_hotels' or 'find_attractions', look at the provided 'Chat History' to see if a city was mentioned previously. If you find a city in the history, use the most recently mentioned one.**
4. If no city is mentioned in the current message or the history, and the intent requires a city, set 'city' to null.

Respond in a JSON format with two keys: 'intent' and 'city'."#;

pub const RESPONSE_GENERATION_PROMPT: &str = r#"You are 'TripGenie AI', a friendly and expert travel assistant. Your goal is to have a natural, helpful conversation.

- When I provide you with a 'DATA_PAYLOAD' from a travel API, you MUST use that information to answer the user's question.
- Do not mention the 'DATA_PAYLOAD' or the API. Just use the data to form a natural response.
- If the data indicates something could not be found, inform the user gracefully.
- For 'general_chat' or follow-up questions, use your own extensive knowledge to provide helpful, conversational answers.
- Keep your responses concise, engaging, and easy to read. Use formatting like lists or bold text."#;

pub const GENERATION_FALLBACK_REPLY: &str =
    "Sorry, I encountered a problem and can't respond right now.";

pub fn build_intent_prompt(message: &str, history: &[ChatMessage]) -> String {
    format!(
        "{INTENT_DETECTION_PROMPT}\n\nChat History:\n---\n{}\n---\n\nUser Message: \"{message}\"",
        format_history(history)
    )
}

/// Wraps retrieved data around the user's question. Without a payload the
/// message is passed through untouched.
pub fn compose_final_prompt(message: &str, payload: Option<&str>) -> String {
    match payload {
        Some(payload) if !payload.is_empty() => {
            format!("DATA_PAYLOAD:\n---\n{payload}\n---\n\nUser Question: {message}")
        }
        _ => message.to_string(),
    }
}

pub fn city_not_found_payload(city: &str) -> String {
    format!("I couldn't find a major city named '{city}'. Could you be more specific?")
}
