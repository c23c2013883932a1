//! Interactive loop orchestration.
//!
//! `ChatController` owns the backend, the conversation session and the
//! input source for the rest of the process. It reads one line at a time,
//! stops on the `goodbye` sentinel or end of input, streams every other
//! line as a question, and releases the backend exactly once when the loop
//! ends, whichever way it ends.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, warn};

use cadet_types::conversation::ConversationSession;
use cadet_types::error::ChatError;

use super::backend::ConversationBackend;
use super::input::{InputEvent, InputSource};
use super::renderer::StreamingRenderer;

/// Input that ends the conversation instead of being sent.
pub const GOODBYE: &str = "goodbye";

/// Whether `input` is the termination sentinel.
///
/// Case-insensitive and ignores surrounding whitespace.
pub fn is_goodbye(input: &str) -> bool {
    input.trim().to_lowercase() == GOODBYE
}

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingInput,
    Dispatching,
    Terminated,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Goodbye,
    EndOfInput,
}

/// What happened during a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub exit: LoopExit,
    /// Questions whose answer streamed to completion.
    pub answered: u32,
    /// Questions whose answer stream broke.
    pub interrupted: u32,
}

/// Drives the read/stream/render loop for one conversation.
pub struct ChatController<B, I, W> {
    backend: B,
    session: ConversationSession,
    input: I,
    renderer: StreamingRenderer<W>,
    diagnostics: Box<dyn Write + Send>,
    opening_question: Option<String>,
    state: LoopState,
    answered: u32,
    interrupted: u32,
}

impl<B, I, W> ChatController<B, I, W>
where
    B: ConversationBackend,
    I: InputSource,
    W: Write,
{
    pub fn new(backend: B, session: ConversationSession, input: I, output: W) -> Self {
        Self {
            backend,
            session,
            input,
            renderer: StreamingRenderer::new(output),
            diagnostics: Box::new(std::io::stderr()),
            opening_question: None,
            state: LoopState::AwaitingInput,
            answered: 0,
            interrupted: 0,
        }
    }

    /// Stream this question before reading any input.
    pub fn with_opening_question(mut self, question: Option<String>) -> Self {
        self.opening_question = question;
        self
    }

    /// Abort answers that stall for longer than `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.renderer = self.renderer.with_idle_timeout(timeout);
        self
    }

    /// Sink for the one-line diagnostics of recoverable errors (stderr by default).
    pub fn with_diagnostics(mut self, diagnostics: Box<dyn Write + Send>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// Run the loop to completion and release the backend.
    ///
    /// The backend is closed exactly once, after the loop stops, including
    /// when the loop stops on an error.
    ///
    /// # Errors
    ///
    /// Only unrecoverable errors are returned (e.g., the output sink
    /// failing). Interrupted answers are reported and the loop continues.
    pub async fn run(mut self) -> Result<LoopSummary, ChatError> {
        let result = self.drive().await;
        self.state = LoopState::Terminated;

        self.backend.close().await;

        match &result {
            Ok(summary) => info!(
                conversation_id = %self.session.id,
                exit = ?summary.exit,
                answered = summary.answered,
                interrupted = summary.interrupted,
                "chat loop finished"
            ),
            Err(err) => warn!(
                conversation_id = %self.session.id,
                error = %err,
                "chat loop aborted"
            ),
        }
        result
    }

    async fn drive(&mut self) -> Result<LoopSummary, ChatError> {
        if let Some(question) = self.opening_question.take() {
            self.dispatch(&question).await?;
        }

        loop {
            self.state = LoopState::AwaitingInput;
            let exit = match self.input.read_line().await {
                InputEvent::Line(line) if is_goodbye(&line) => LoopExit::Goodbye,
                InputEvent::Line(line) => {
                    self.dispatch(&line).await?;
                    continue;
                }
                InputEvent::Eof => LoopExit::EndOfInput,
                InputEvent::Interrupted => {
                    self.diagnostic(&format!("Type '{GOODBYE}' or press Ctrl+D to exit."));
                    continue;
                }
            };
            return Ok(LoopSummary {
                exit,
                answered: self.answered,
                interrupted: self.interrupted,
            });
        }
    }

    async fn dispatch(&mut self, question: &str) -> Result<(), ChatError> {
        self.state = LoopState::Dispatching;
        debug!(conversation_id = %self.session.id, "dispatching question");

        match self.renderer.render(&self.backend, &self.session, question).await {
            Ok(_) => {
                self.answered += 1;
                Ok(())
            }
            Err(err @ ChatError::StreamInterrupted { .. }) => {
                self.interrupted += 1;
                self.diagnostic(&format!("! streaming the answer failed: {err}"));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn diagnostic(&mut self, line: &str) {
        let _ = writeln!(self.diagnostics, "{line}");
        let _ = self.diagnostics.flush();
    }
}
