//! Line-oriented terminal I/O.

use std::io::Write;

use console::{style, Term};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Colour class of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Info,
    Success,
    Warning,
    Error,
}

/// What the command layer needs from a terminal.
pub trait Terminal {
    /// Prints one line.
    fn print(&mut self, text: &str, tone: Tone);

    /// Clears the screen.
    fn clear(&mut self);

    /// Prompts and reads one trimmed line. `secret` hides the input where
    /// the terminal supports it. Returns `None` once input is closed.
    async fn read_line(&mut self, prompt: &str, secret: bool) -> Option<String>;

    fn blank(&mut self) {
        self.print("", Tone::Plain);
    }
}

/// Terminal over the process's stdin and stdout.
pub struct StdioTerminal {
    out: Term,
    lines: Lines<BufReader<Stdin>>,
}

impl StdioTerminal {
    pub fn new() -> Self {
        Self {
            out: Term::stdout(),
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Terminal for StdioTerminal {
    fn print(&mut self, text: &str, tone: Tone) {
        let line = match tone {
            Tone::Plain => text.to_string(),
            Tone::Info => style(text).cyan().to_string(),
            Tone::Success => style(text).green().to_string(),
            Tone::Warning => style(text).yellow().to_string(),
            Tone::Error => style(text).red().to_string(),
        };
        if let Err(e) = self.out.write_line(&line) {
            tracing::debug!(error = %e, "Failed to write to terminal");
        }
    }

    fn clear(&mut self) {
        if let Err(e) = self.out.clear_screen() {
            tracing::debug!(error = %e, "Failed to clear terminal");
        }
    }

    async fn read_line(&mut self, prompt: &str, secret: bool) -> Option<String> {
        if let Err(e) = write_prompt(&mut self.out, prompt) {
            tracing::debug!(error = %e, "Failed to write prompt");
        }

        if secret && self.out.is_term() {
            let term = self.out.clone();
            return match tokio::task::spawn_blocking(move || term.read_secure_line()).await {
                Ok(Ok(line)) => Some(line.trim().to_string()),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Failed to read hidden input");
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Hidden input task failed");
                    None
                }
            };
        }

        match self.lines.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_string()),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read from stdin");
                None
            }
        }
    }
}

/// Writes `prompt` followed by a space, then flushes.
fn write_prompt<W: Write>(out: &mut W, prompt: &str) -> std::io::Result<()> {
    if !prompt.is_empty() {
        write!(out, "{prompt} ")?;
    }
    out.flush()
}
