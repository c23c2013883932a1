//! Line input port for the chat loop.

/// Events produced by an input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// User submitted a line (without its line terminator).
    Line(String),
    /// End of input (Ctrl+D or closed stdin).
    Eof,
    /// Interrupt signal (Ctrl+C) at the prompt.
    Interrupted,
}

/// Source of user lines. The source is responsible for showing the prompt.
///
/// Read failures are reported as [`InputEvent::Eof`] after being logged,
/// which ends the loop the same way closing stdin does.
pub trait InputSource {
    fn read_line(&mut self) -> impl std::future::Future<Output = InputEvent>;
}
