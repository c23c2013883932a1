//! ConversationBackend trait definition.
//!
//! Uses RPITIT for the unary calls and `Pin<Box<dyn Stream>>` for
//! `stream_question`, so the returned stream can outlive the borrow of the
//! backend and be driven independently.

use std::pin::Pin;

use futures_util::Stream;

use cadet_types::conversation::{
    BackendError, ConversationId, ConversationSession, MessageRole, ResponseEnvelope,
};

/// Stream of envelopes for one question. Ends when the answer is complete.
pub type EnvelopeStream =
    Pin<Box<dyn Stream<Item = Result<ResponseEnvelope, BackendError>> + Send + 'static>>;

/// Trait for hosted assistant backends.
///
/// Implementations live in cadet-infra (e.g., `HttpConversationBackend`).
pub trait ConversationBackend: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Create a new conversation with the given name and model.
    fn create_session(
        &self,
        display_name: &str,
        model_name: &str,
    ) -> impl std::future::Future<Output = Result<ConversationSession, BackendError>> + Send;

    /// Append a message to a conversation.
    fn send_message(
        &self,
        conversation_id: &ConversationId,
        role: MessageRole,
        content: &str,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;

    /// Ask a question and stream the answer.
    ///
    /// The request is issued when the stream is first polled. The stream is
    /// not restartable; ask again for a fresh answer.
    fn stream_question(&self, session: &ConversationSession, question: &str) -> EnvelopeStream;

    /// Release sockets and handles. Calls made afterwards fail with
    /// [`BackendError::Closed`].
    fn close(&self) -> impl std::future::Future<Output = ()> + Send;
}
