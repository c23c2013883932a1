//! Incremental rendering of a streamed answer.
//!
//! Each fragment is written and flushed as soon as it arrives, with nothing
//! between fragments. After the stream ends a fixed separator is written.
//! If the stream breaks, what was already written stays on screen and the
//! error is returned as [`ChatError::StreamInterrupted`].

use std::io::Write;
use std::time::Duration;

use futures_util::StreamExt;
use tracing::{debug, warn};

use cadet_types::conversation::{BackendError, ConversationSession};
use cadet_types::error::ChatError;

use super::backend::ConversationBackend;

/// Written after every answer: ends the answer line and leaves two blank lines.
pub const ANSWER_SEPARATOR: &str = "\n\n\n";

/// Counts for one rendered answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub fragments: usize,
    pub bytes: usize,
}

/// Writes streamed answers to an output sink.
pub struct StreamingRenderer<W> {
    out: W,
    idle_timeout: Option<Duration>,
}

impl<W: Write> StreamingRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            idle_timeout: None,
        }
    }

    /// Abort a stream when no envelope arrives within `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Ask `question` in `session` and write the answer as it streams in.
    ///
    /// # Errors
    ///
    /// [`ChatError::StreamInterrupted`] when the transport fails mid-answer
    /// (the separator is still written), [`ChatError::Output`] when the sink
    /// cannot be written.
    pub async fn render<B: ConversationBackend>(
        &mut self,
        backend: &B,
        session: &ConversationSession,
        question: &str,
    ) -> Result<RenderSummary, ChatError> {
        let mut stream = backend.stream_question(session, question);
        let mut summary = RenderSummary::default();

        loop {
            let next = match self.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
                    Ok(next) => next,
                    Err(_) => Some(Err(BackendError::Timeout(format!(
                        "no answer data for {}s",
                        limit.as_secs()
                    )))),
                },
                None => stream.next().await,
            };

            match next {
                Some(Ok(envelope)) => {
                    for fragment in envelope.fragments() {
                        self.write_fragment(&fragment.text)?;
                        summary.fragments += 1;
                        summary.bytes += fragment.text.len();
                    }
                }
                Some(Err(source)) => {
                    warn!(
                        conversation_id = %session.id,
                        received = summary.fragments,
                        error = %source,
                        "answer stream interrupted"
                    );
                    self.finish()?;
                    return Err(ChatError::StreamInterrupted {
                        received: summary.fragments,
                        source,
                    });
                }
                None => break,
            }
        }

        self.finish()?;
        debug!(
            conversation_id = %session.id,
            fragments = summary.fragments,
            bytes = summary.bytes,
            "answer rendered"
        );
        Ok(summary)
    }

    fn write_fragment(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn finish(&mut self) -> std::io::Result<()> {
        self.out.write_all(ANSWER_SEPARATOR.as_bytes())?;
        self.out.flush()
    }
}
