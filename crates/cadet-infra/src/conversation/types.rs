//! Wire types for the conversation service.

use serde::{Deserialize, Serialize};

use cadet_types::conversation::MessageRole;

/// Body of `POST /conversations`.
#[derive(Debug, Serialize)]
pub struct CreateConversationRequest<'a> {
    pub name: &'a str,
    pub model: &'a str,
}

/// A conversation as returned by the service.
#[derive(Debug, Deserialize)]
pub struct ConversationResponse {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Body of `POST /conversations/{id}/messages`.
#[derive(Debug, Serialize)]
pub struct MessageRequest<'a> {
    pub role: MessageRole,
    pub fragment: MessageFragment<'a>,
}

#[derive(Debug, Serialize)]
pub struct MessageFragment<'a> {
    pub string: RawText<'a>,
}

#[derive(Debug, Serialize)]
pub struct RawText<'a> {
    pub raw: &'a str,
}

impl<'a> MessageRequest<'a> {
    pub fn text(role: MessageRole, raw: &'a str) -> Self {
        Self {
            role,
            fragment: MessageFragment {
                string: RawText { raw },
            },
        }
    }
}

/// Body of `POST /conversations/{id}/stream`. Owned so the request can be
/// issued lazily from inside the returned stream.
#[derive(Debug, Clone, Serialize)]
pub struct StreamRequest {
    pub question: String,
    pub model: String,
}
