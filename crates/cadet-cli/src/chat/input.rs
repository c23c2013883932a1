//! Terminal input for the chat loop.
//!
//! On a terminal, wraps `rustyline_async::Readline` so Ctrl+D and Ctrl+C are
//! reported as events. Streamed answers and diagnostics both go through its
//! `SharedWriter` so they do not garble the prompt while the terminal is in
//! raw mode. When stdin is piped, lines are read as-is, the prompt and
//! answers are written to stdout and diagnostics to stderr.

use std::io::{IsTerminal, Write};

use rustyline_async::{Readline, ReadlineEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use cadet_core::chat::input::{InputEvent, InputSource};
use cadet_types::error::ChatError;

/// Prompt shown before every line.
pub const PROMPT: &str = ": ";

/// Line reader over any buffered async source, writing the prompt to `prompt_out`.
pub struct PipedInput<R> {
    lines: Lines<R>,
    prompt: String,
    prompt_out: Box<dyn Write + Send>,
}

impl<R: AsyncBufRead + Unpin> PipedInput<R> {
    pub fn new(reader: R, prompt: impl Into<String>, prompt_out: Box<dyn Write + Send>) -> Self {
        Self {
            lines: reader.lines(),
            prompt: prompt.into(),
            prompt_out,
        }
    }

    async fn next_event(&mut self) -> InputEvent {
        let _ = write!(self.prompt_out, "{}", self.prompt);
        let _ = self.prompt_out.flush();

        match self.lines.next_line().await {
            Ok(Some(line)) => InputEvent::Line(line),
            Ok(None) => InputEvent::Eof,
            Err(err) => {
                warn!(error = %err, "failed to read input, treating as end of input");
                InputEvent::Eof
            }
        }
    }
}

/// Where the chat loop writes while input is open.
pub struct ChatOutput {
    /// Banner and streamed answers.
    pub answers: Box<dyn Write + Send>,
    /// One-line warnings about recoverable errors.
    pub diagnostics: Box<dyn Write + Send>,
}

/// Input for the chat loop: line editing on a terminal, plain lines otherwise.
pub enum ChatInput {
    Interactive(Readline),
    Piped(PipedInput<BufReader<Stdin>>),
}

impl ChatInput {
    /// Open stdin for reading.
    ///
    /// Returns the input and the writers all further output must go through.
    ///
    /// # Errors
    ///
    /// [`ChatError::Input`] if the terminal cannot be put into line-editing mode.
    pub fn open(prompt: &str) -> Result<(Self, ChatOutput), ChatError> {
        if std::io::stdin().is_terminal() {
            let (rl, writer) = Readline::new(prompt.to_string())
                .map_err(|e| ChatError::Input(format!("failed to initialize input: {e}")))?;
            let output = ChatOutput {
                answers: Box::new(writer.clone()),
                diagnostics: Box::new(writer),
            };
            Ok((ChatInput::Interactive(rl), output))
        } else {
            let piped = PipedInput::new(
                BufReader::new(tokio::io::stdin()),
                prompt,
                Box::new(std::io::stdout()),
            );
            let output = ChatOutput {
                answers: Box::new(std::io::stdout()),
                diagnostics: Box::new(std::io::stderr()),
            };
            Ok((ChatInput::Piped(piped), output))
        }
    }
}

impl InputSource for ChatInput {
    async fn read_line(&mut self) -> InputEvent {
        match self {
            ChatInput::Interactive(rl) => match rl.readline().await {
                Ok(ReadlineEvent::Line(line)) => InputEvent::Line(line),
                Ok(ReadlineEvent::Eof) => InputEvent::Eof,
                Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
                Err(err) => {
                    warn!(error = %err, "failed to read input, treating as end of input");
                    InputEvent::Eof
                }
            },
            ChatInput::Piped(piped) => piped.next_event().await,
        }
    }
}

impl<R: AsyncBufRead + Unpin> InputSource for PipedInput<R> {
    async fn read_line(&mut self) -> InputEvent {
        self.next_event().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_piped_lines_then_eof() {
        let prompts = Captured::default();
        let mut input = PipedInput::new(
            &b"who are you?\r\n\n  Goodbye \n"[..],
            PROMPT,
            Box::new(prompts.clone()),
        );

        assert_eq!(input.read_line().await, InputEvent::Line("who are you?".into()));
        assert_eq!(input.read_line().await, InputEvent::Line(String::new()));
        assert_eq!(input.read_line().await, InputEvent::Line("  Goodbye ".into()));
        assert_eq!(input.read_line().await, InputEvent::Eof);

        let written = String::from_utf8(prompts.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, ": : : : ");
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let mut input = PipedInput::new(&b"engage"[..], PROMPT, Box::new(std::io::sink()));
        assert_eq!(input.read_line().await, InputEvent::Line("engage".into()));
        assert_eq!(input.read_line().await, InputEvent::Eof);
    }
}
