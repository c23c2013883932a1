//! Errors raised while setting up a chat session and running its loop.

use thiserror::Error;

use crate::conversation::BackendError;

/// Errors surfaced by session setup and the interactive loop.
///
/// `ConfigurationMissing` and `SessionCreation` are fatal. `SeedMessage` and
/// `StreamInterrupted` are reported and the loop keeps running.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("missing required configuration: {0}")]
    ConfigurationMissing(String),

    #[error("failed to create conversation session: {0}")]
    SessionCreation(#[source] BackendError),

    #[error("failed to send system seed message: {0}")]
    SeedMessage(#[source] BackendError),

    #[error("answer stream interrupted after {received} fragment(s): {source}")]
    StreamInterrupted {
        received: usize,
        #[source]
        source: BackendError,
    },

    #[error("input error: {0}")]
    Input(String),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

impl ChatError {
    /// Whether the process must stop because of this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ChatError::SeedMessage(_) | ChatError::StreamInterrupted { .. }
        )
    }
}
