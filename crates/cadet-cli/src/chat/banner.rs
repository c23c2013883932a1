//! Intro banner and one-line diagnostics.

use std::io::{self, Write};

use console::{pad_str, style, Alignment};

use cadet_types::conversation::ConversationSession;

const MAX_WIDTH: usize = 72;

fn banner_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map(|(_, cols)| usize::from(cols))
        .unwrap_or(MAX_WIDTH)
        .min(MAX_WIDTH)
}

/// Write the intro banner for `session`.
pub fn write_banner(out: &mut dyn Write, session: &ConversationSession) -> io::Result<()> {
    write_banner_with_width(out, session, banner_width())
}

fn write_banner_with_width(
    out: &mut dyn Write,
    session: &ConversationSession,
    width: usize,
) -> io::Result<()> {
    let rule = "=".repeat(width);
    writeln!(out)?;
    writeln!(out, "{}", style(&rule).yellow())?;
    writeln!(
        out,
        "{}",
        style(pad_str(&session.display_name, width, Alignment::Center, None)).bold()
    )?;
    writeln!(
        out,
        "{}",
        style(pad_str(&session.model_name, width, Alignment::Center, None)).dim()
    )?;
    writeln!(out, "{}", style(&rule).yellow())?;
    writeln!(
        out,
        "{}",
        style("Type 'goodbye' or press Ctrl+D to exit.").dim()
    )?;
    writeln!(out)?;
    out.flush()
}

/// Write a recoverable problem as one marked line.
pub fn write_warning(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "  {} {message}", style("!").yellow().bold())?;
    out.flush()
}
