//! Session setup: create the conversation and seed it.
//!
//! `SessionInitializer` creates exactly one conversation and immediately
//! sends the system-role seed message carrying the resolved prompt. Failing
//! to create the conversation is fatal; failing to seed it is not.

use tracing::{info, warn};

use cadet_types::config::ResolvedConfig;
use cadet_types::conversation::{ConversationSession, SeedMessage};
use cadet_types::error::ChatError;

use super::backend::ConversationBackend;

/// Whether the system seed reached the backend.
#[derive(Debug)]
pub enum SeedOutcome {
    Seeded,
    /// The conversation works but runs without the system turn.
    Degraded(ChatError),
}

/// A freshly created conversation and the result of seeding it.
#[derive(Debug)]
pub struct InitializedSession {
    pub session: ConversationSession,
    pub seed: SeedOutcome,
}

/// Opens and seeds the process's single conversation.
pub struct SessionInitializer<'a, B> {
    backend: &'a B,
    display_name: String,
}

impl<'a, B: ConversationBackend> SessionInitializer<'a, B> {
    pub fn new(backend: &'a B, display_name: impl Into<String>) -> Self {
        Self {
            backend,
            display_name: display_name.into(),
        }
    }

    /// Create the conversation and send the seed message.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::SessionCreation`] if the backend cannot create the
    /// conversation. A seed failure is reported through
    /// [`SeedOutcome::Degraded`] and never retried.
    pub async fn initialize(&self, config: &ResolvedConfig) -> Result<InitializedSession, ChatError> {
        let session = self
            .backend
            .create_session(&self.display_name, &config.model_name)
            .await
            .map_err(ChatError::SessionCreation)?;

        info!(
            backend = self.backend.name(),
            conversation_id = %session.id,
            name = %session.display_name,
            model = %session.model_name,
            "conversation created"
        );

        let seed = SeedMessage::system(session.id.clone(), config.system_prompt.clone());
        let seed = match self
            .backend
            .send_message(&seed.conversation_id, seed.role, &seed.content)
            .await
        {
            Ok(()) => SeedOutcome::Seeded,
            Err(err) => {
                warn!(
                    backend = self.backend.name(),
                    conversation_id = %session.id,
                    error = %err,
                    "system seed message failed, continuing without it"
                );
                SeedOutcome::Degraded(ChatError::SeedMessage(err))
            }
        };

        Ok(InitializedSession { session, seed })
    }
}
