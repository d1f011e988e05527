//! Output rendering abstraction for game-agent.
//!
//! Defines the [`Renderer`] trait that decouples streamed LLM output from the
//! display layer. [`StreamRenderer`] writes answer tokens to any [`Write`]
//! sink and echoes tool activity on stderr.

use colored::Colorize;
use std::io::Write;

/// Longest tool argument/result preview echoed to the terminal.
const TOOL_PREVIEW_CHARS: usize = 160;

/// Trait for rendering LLM output as it streams in.
pub trait Renderer {
    /// Render a single token as it arrives.
    fn render_token(&mut self, token: &str);

    /// Called once after the full response has been rendered.
    fn render_done(&mut self);

    /// Called when the model invokes a tool.
    fn tool_start(&mut self, name: &str, args: &str);

    /// Called when a tool result is fed back to the model.
    fn tool_result(&mut self, name: &str, result: &str);
}

/// Renders streaming output to a writer (stdout in production).
///
/// Each token is written immediately with an explicit flush so the user
/// sees a "typing" effect.
pub struct StreamRenderer<W: Write> {
    out: W,
    buffer: String,
}

impl<W: Write> StreamRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buffer: String::new(),
        }
    }

    /// Returns the accumulated raw text from all tokens.
    pub fn raw_text(&self) -> &str {
        &self.buffer
    }
}

/// First line of `text`, cut to [`TOOL_PREVIEW_CHARS`] characters.
fn preview(text: &str) -> String {
    let first = text.lines().next().unwrap_or("");
    let mut short: String = first.chars().take(TOOL_PREVIEW_CHARS).collect();
    if short.len() < first.len() || text.lines().nth(1).is_some() {
        short.push_str(" …");
    }
    short
}

impl<W: Write> Renderer for StreamRenderer<W> {
    fn render_token(&mut self, token: &str) {
        self.buffer.push_str(token);
        let _ = write!(self.out, "{}", token);
        self.out.flush().ok();
    }

    fn render_done(&mut self) {
        let _ = writeln!(self.out);
        self.out.flush().ok();
    }

    fn tool_start(&mut self, name: &str, args: &str) {
        eprintln!("{} {} {}", "→".cyan(), name.bold(), preview(args).dimmed());
    }

    fn tool_result(&mut self, name: &str, result: &str) {
        eprintln!("{} {} {}", "←".cyan(), name.dimmed(), preview(result).dimmed());
    }
}
