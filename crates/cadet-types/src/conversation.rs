//! Conversation session, message, and streamed-answer types for cadet.
//!
//! These types model one conversation with the assistant backend: the
//! session handle, the one-shot system seed message, and the response
//! envelopes that carry answer fragments during a streaming call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// Opaque backend identifier of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single conversation a cadet process talks through.
///
/// `id` is the only durable handle; every message and streaming call of the
/// run is addressed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: ConversationId,
    pub display_name: String,
    pub model_name: String,
    pub created_at: DateTime<Utc>,
}

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// The system-role instruction sent once, right after the session is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedMessage {
    pub role: MessageRole,
    pub content: String,
    pub conversation_id: ConversationId,
}

impl SeedMessage {
    pub fn system(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            conversation_id,
        }
    }
}

/// One incremental piece of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerFragment {
    pub text: String,
}

impl AnswerFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Progress marker carried by a response envelope.
///
/// Values the client does not recognize parse as `Unknown` and are handled
/// like `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum StreamStatus {
    InProgress,
    Completed,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

/// Answers attached to a response envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswers {
    #[serde(default)]
    pub answers: Vec<AnswerFragment>,
}

/// One message of a streaming call. May carry zero or more fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub question: Option<QuestionAnswers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StreamStatus>,
}

impl ResponseEnvelope {
    /// Envelope carrying the given fragment texts, in order.
    pub fn with_fragments<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            question: Some(QuestionAnswers {
                answers: texts.into_iter().map(AnswerFragment::new).collect(),
            }),
            status: Some(StreamStatus::InProgress),
        }
    }

    pub fn fragments(&self) -> &[AnswerFragment] {
        self.question
            .as_ref()
            .map(|q| q.answers.as_slice())
            .unwrap_or_default()
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(StreamStatus::Completed)
    }
}

/// Errors from conversation backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("backend client is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_wire_names() {
        assert_eq!(serde_json::to_string(&MessageRole::System).unwrap(), "\"SYSTEM\"");
        let role: MessageRole = serde_json::from_str("\"ASSISTANT\"").unwrap();
        assert_eq!(role, MessageRole::Assistant);
    }

    #[test]
    fn test_envelope_parses_answers() {
        let json = r#"{"question":{"answers":[{"text":"Hel"},{"text":"lo"}]},"status":"IN-PROGRESS"}"#;
        let envelope: ResponseEnvelope = serde_json::from_str(json).unwrap();
        let texts: Vec<&str> = envelope.fragments().iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["Hel", "lo"]);
        assert_eq!(envelope.status, Some(StreamStatus::InProgress));
        assert!(!envelope.is_completed());
    }

    #[test]
    fn test_unrecognized_status_keeps_fragments() {
        let json = r#"{"question":{"answers":[{"text":"Hello"}]},"status":"INITIALIZED"}"#;
        let envelope: ResponseEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, Some(StreamStatus::Unknown));
        assert_eq!(envelope.fragments(), &[AnswerFragment::new("Hello")]);
        assert!(!envelope.is_completed());
    }

    #[test]
    fn test_envelope_without_question_has_no_fragments() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"question":null,"status":"COMPLETED"}"#).unwrap();
        assert!(envelope.fragments().is_empty());
        assert!(envelope.is_completed());

        let bare: ResponseEnvelope = serde_json::from_str("{}").unwrap();
        assert!(bare.fragments().is_empty());
        assert_eq!(bare.status, None);
    }

    #[test]
    fn test_seed_message_is_system_role() {
        let seed = SeedMessage::system(ConversationId::new("c-1"), "be terse");
        assert_eq!(seed.role, MessageRole::System);
        assert_eq!(seed.conversation_id.as_str(), "c-1");
        assert_eq!(seed.content, "be terse");
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Http {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
    }
}
