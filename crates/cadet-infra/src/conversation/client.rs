//! HttpConversationBackend -- concrete [`ConversationBackend`] for the
//! conversation service's HTTP/JSON API.
//!
//! Unary calls (create, send message) run on a client with connect and
//! request timeouts. Streaming calls use a second client with only a connect
//! timeout, since an answer may legitimately stream for longer than any
//! request timeout; stalls are caught by the renderer's idle timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream;
use tracing::debug;

use cadet_core::chat::backend::{ConversationBackend, EnvelopeStream};
use cadet_types::config::BackendSettings;
use cadet_types::conversation::{
    BackendError, ConversationId, ConversationSession, MessageRole, ResponseEnvelope,
};

use super::streaming::create_envelope_stream;
use super::types::{ConversationResponse, CreateConversationRequest, MessageRequest, StreamRequest};

/// Connection settings for [`HttpConversationBackend`].
#[derive(Debug, Clone)]
pub struct BackendOptions {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl From<&BackendSettings> for BackendOptions {
    fn from(settings: &BackendSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            connect_timeout: settings.connect_timeout(),
            request_timeout: settings.request_timeout(),
        }
    }
}

/// HTTP conversation backend.
pub struct HttpConversationBackend {
    client: reqwest::Client,
    stream_client: reqwest::Client,
    base_url: String,
    closed: Arc<AtomicBool>,
}

impl HttpConversationBackend {
    /// # Errors
    ///
    /// [`BackendError::Connection`] if an HTTP client cannot be built.
    pub fn new(options: BackendOptions) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| BackendError::Connection(format!("failed to create HTTP client: {e}")))?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .build()
            .map_err(|e| BackendError::Connection(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            stream_client,
            base_url: options.base_url,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn ensure_open(&self) -> Result<(), BackendError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(BackendError::Closed)
        } else {
            Ok(())
        }
    }
}

/// Map a reqwest send failure to a [`BackendError`].
pub(crate) fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else {
        BackendError::Connection(err.to_string())
    }
}

/// Turn a non-success response into [`BackendError::Http`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Http {
        status: status.as_u16(),
        body,
    })
}

impl ConversationBackend for HttpConversationBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn create_session(
        &self,
        display_name: &str,
        model_name: &str,
    ) -> Result<ConversationSession, BackendError> {
        self.ensure_open()?;

        let response = self
            .client
            .post(self.url("/conversations"))
            .json(&CreateConversationRequest {
                name: display_name,
                model: model_name,
            })
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response).await?;

        let created: ConversationResponse = response.json().await.map_err(|e| {
            BackendError::Deserialization(format!("failed to parse conversation: {e}"))
        })?;

        Ok(ConversationSession {
            id: ConversationId::new(created.id),
            display_name: created.name.unwrap_or_else(|| display_name.to_string()),
            model_name: created.model.unwrap_or_else(|| model_name.to_string()),
            created_at: chrono::Utc::now(),
        })
    }

    async fn send_message(
        &self,
        conversation_id: &ConversationId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), BackendError> {
        self.ensure_open()?;

        let response = self
            .client
            .post(self.url(&format!("/conversations/{conversation_id}/messages")))
            .json(&MessageRequest::text(role, content))
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await?;
        Ok(())
    }

    fn stream_question(&self, session: &ConversationSession, question: &str) -> EnvelopeStream {
        if let Err(err) = self.ensure_open() {
            return Box::pin(stream::once(async move { Err::<ResponseEnvelope, _>(err) }));
        }

        let url = self.url(&format!("/conversations/{}/stream", session.id));
        let body = StreamRequest {
            question: question.to_string(),
            model: session.model_name.clone(),
        };
        create_envelope_stream(self.stream_client.clone(), url, body)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(base_url = %self.base_url, "conversation backend closed");
        }
    }
}
