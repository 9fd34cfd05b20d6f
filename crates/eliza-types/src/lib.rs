use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder used by front ends when no name is known yet.
pub const DEFAULT_USER_NAME: &str = "Sweetheart";

/// Polarity of a feeling word found in an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feeling {
    Positive,
    Negative,
}

impl std::fmt::Display for Feeling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feeling::Positive => write!(f, "positive"),
            Feeling::Negative => write!(f, "negative"),
        }
    }
}

/// Broad conversation topics tracked across a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicTag {
    Work,
    Health,
    Study,
    Relationships,
}

impl std::fmt::Display for TopicTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopicTag::Work => write!(f, "work"),
            TopicTag::Health => write!(f, "health"),
            TopicTag::Study => write!(f, "study"),
            TopicTag::Relationships => write!(f, "relationships"),
        }
    }
}

/// Body of a `POST /chat` request after coercion to safe defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Name the client believes the user has, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Conversation token returned by a previous response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Body of a `POST /chat` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Resolved name the client should send back on the next call.
    pub user_name: String,
    pub session_id: String,
    /// `true` when the utterance ended the conversation.
    #[serde(default)]
    pub farewell: bool,
}

/// Errors raised by the front ends around the responder. The responder
/// itself never fails.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ElizaError {
    #[error("Server Error: {0}")]
    Server(String),

    #[error("Malformed Request: {0}")]
    BadRequest(String),

    #[error("Transcript Error: {0}")]
    Transcript(String),
}
