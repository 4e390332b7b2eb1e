use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{ChatMessage, ExtractedInfo, Intent};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?").expect("valid code fence regex"));

/// Outcome of interpreting the classifier's raw text. A fallback is not an
/// error: the turn continues as general chat with no data lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Parsed(ExtractedInfo),
    Fallback { reason: String, raw: String },
}

impl Classification {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn into_info(self) -> ExtractedInfo {
        match self {
            Self::Parsed(info) => info,
            Self::Fallback { .. } => ExtractedInfo::general_chat(),
        }
    }
}

pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw.trim(), "").trim().to_string()
}

pub fn parse_classification(raw: &str) -> Classification {
    let cleaned = strip_code_fences(raw);

    let value: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(error) => return fallback(raw, format!("invalid json: {error}")),
    };

    let Some(object) = value.as_object() else {
        return fallback(raw, "expected a JSON object".to_string());
    };

    let Some(intent_text) = object.get("intent").and_then(Value::as_str) else {
        return fallback(raw, "missing intent".to_string());
    };

    let city = match object.get("city") {
        None => return fallback(raw, "missing city".to_string()),
        Some(Value::Null) => None,
        Some(Value::String(city)) => normalize_city(city),
        Some(_) => return fallback(raw, "city must be a string or null".to_string()),
    };

    let intent = Intent::parse(intent_text).unwrap_or(Intent::GeneralChat);
    Classification::Parsed(ExtractedInfo::new(intent, city))
}

/// Renders history as `role: text` lines, oldest first, using the first
/// segment of each turn.
pub fn format_history(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|message| format!("{}: {}", message.role, message.first_text()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_city(city: &str) -> Option<String> {
    let trimmed = city.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn fallback(raw: &str, reason: String) -> Classification {
    Classification::Fallback {
        reason,
        raw: raw.to_string(),
    }
}
