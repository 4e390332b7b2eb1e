use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Parses a wire role. `assistant` is accepted as an alias of `model`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "user" => Some(Self::User),
            "model" | "assistant" => Some(Self::Model),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SearchHotels,
    FindAttractions,
    GeneralChat,
}

impl Intent {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "search_hotels" => Some(Self::SearchHotels),
            "find_attractions" => Some(Self::FindAttractions),
            "general_chat" => Some(Self::GeneralChat),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SearchHotels => "search_hotels",
            Self::FindAttractions => "find_attractions",
            Self::GeneralChat => "general_chat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPart {
    pub text: String,
}

impl ChatPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One prior turn as sent by the client. The role stays a free string on the
/// wire; callers that need a [`Role`] parse it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub parts: Vec<ChatPart>,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role: role.as_str().to_string(),
            parts: vec![ChatPart::new(text)],
        }
    }

    pub fn first_text(&self) -> &str {
        self.parts
            .first()
            .map(|part| part.text.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub role: Role,
    pub parts: Vec<ChatPart>,
}

impl ChatResponse {
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![ChatPart::new(text)],
        }
    }

    pub fn text(&self) -> &str {
        self.parts
            .first()
            .map(|part| part.text.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    pub intent: Intent,
    pub city: Option<String>,
    /// Reserved by the classifier contract; never populated.
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ExtractedInfo {
    pub fn new(intent: Intent, city: Option<String>) -> Self {
        Self {
            intent,
            city,
            parameters: Map::new(),
        }
    }

    pub fn general_chat() -> Self {
        Self::new(Intent::GeneralChat, None)
    }
}

impl Default for ExtractedInfo {
    fn default() -> Self {
        Self::general_chat()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}
