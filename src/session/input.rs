//! Console line reading with a widening decoding fallback.
//!
//! A raw line is read as bytes exactly once and then handed to an ordered
//! list of [`Decoding`] strategies; the first that accepts the bytes wins.
//! Later strategies only ever tolerate more, and no strategy reads again, so
//! nothing read off the stream is lost between attempts.
//!
//! On a terminal, [`ConsoleSource`] reads through rustyline first. rustyline
//! decodes as it reads, so a line it rejects is gone; the source then says
//! so, releases the editor, and serves every later read from the raw byte
//! path.

use std::io::{self, BufRead, BufReader, IsTerminal, Stdin, Stdout, Write};
use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::constants::INPUT_DISCARDED_NOTICE;
use crate::error::SessionError;

/// Result of one prompted read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line of input, whitespace-trimmed.
    Line(String),
    /// End of input (Ctrl+D or closed stdin).
    Eof,
    /// The user interrupted the read (Ctrl+C).
    Interrupted,
}

/// Whether a line read at a prompt belongs in the persistent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum History {
    Record,
    Skip,
}

/// Anything the session can prompt for a line of text.
#[async_trait::async_trait(?Send)]
pub trait LineSource {
    async fn read_line(&mut self, prompt: &str, history: History)
        -> Result<ReadOutcome, SessionError>;
}

/// A way of turning raw line bytes into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoding {
    /// UTF-8, rejecting invalid sequences.
    Strict,
    /// UTF-8, replacing invalid sequences with U+FFFD.
    Lossy,
}

impl Decoding {
    /// Default chain: strict first, then lossy.
    pub const CHAIN: [Decoding; 2] = [Decoding::Strict, Decoding::Lossy];

    fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Decoding::Strict => std::str::from_utf8(bytes).ok().map(str::to_string),
            Decoding::Lossy => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// Decodes `bytes` with the first strategy in `chain` that accepts them.
///
/// The returned text is always whitespace-trimmed.
pub fn decode_line(bytes: &[u8], chain: &[Decoding]) -> Result<String, SessionError> {
    for (attempt, decoding) in chain.iter().enumerate() {
        if let Some(text) = decoding.decode(bytes) {
            if attempt > 0 {
                tracing::warn!(?decoding, "input was not valid UTF-8, decoded with fallback");
            }
            return Ok(text.trim().to_string());
        }
        tracing::debug!(?decoding, "decoding rejected input");
    }
    Err(SessionError::InputDecoding {
        attempts: chain.len(),
    })
}

/// Reads `reader` line by line on its own thread.
///
/// The channel closes at end of input; a read error is sent once, then it
/// closes.
fn spawn_line_reader<R>(mut reader: R) -> UnboundedReceiver<io::Result<Vec<u8>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        let mut raw = Vec::new();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(Ok(raw)).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                break;
            }
        }
    });
    rx
}

/// Reads prompted lines from a byte stream.
///
/// The blocking reads happen on a background thread started by the first
/// prompt, so a pending read never stalls the runtime and can lose a race
/// against Ctrl+C. Used for piped stdin, as the fallback behind the line
/// editor, and in tests with in-memory readers.
pub struct StreamSource<R, W> {
    reader: Option<R>,
    lines: Option<UnboundedReceiver<io::Result<Vec<u8>>>>,
    writer: W,
    chain: Vec<Decoding>,
}

impl<R, W> StreamSource<R, W>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_chain(reader, writer, Decoding::CHAIN.to_vec())
    }

    pub fn with_chain(reader: R, writer: W, chain: Vec<Decoding>) -> Self {
        Self {
            reader: Some(reader),
            lines: None,
            writer,
            chain,
        }
    }

    #[cfg(test)]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Writes a one-line notice where the prompts go.
    fn notify(&mut self, notice: &str) -> Result<(), SessionError> {
        writeln!(self.writer, "{}", notice)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[async_trait::async_trait(?Send)]
impl<R, W> LineSource for StreamSource<R, W>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    async fn read_line(
        &mut self,
        prompt: &str,
        _history: History,
    ) -> Result<ReadOutcome, SessionError> {
        self.writer.write_all(prompt.as_bytes())?;
        self.writer.flush()?;

        if let Some(reader) = self.reader.take() {
            self.lines = Some(spawn_line_reader(reader));
        }
        let next = match self.lines.as_mut() {
            Some(lines) => lines.recv().await,
            None => None,
        };
        match next {
            Some(Ok(raw)) => decode_line(&raw, &self.chain).map(ReadOutcome::Line),
            Some(Err(e)) => Err(e.into()),
            None => Ok(ReadOutcome::Eof),
        }
    }
}

/// The pieces of a line editor the console uses.
pub trait LineEditor {
    fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError>;
    fn add_history_entry(&mut self, line: &str);
    fn save_history(&mut self, path: &Path);
}

impl LineEditor for DefaultEditor {
    fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        rustyline::Editor::readline(self, prompt)
    }

    fn add_history_entry(&mut self, line: &str) {
        let _ = rustyline::Editor::add_history_entry(self, line);
    }

    fn save_history(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = rustyline::Editor::save_history(self, path) {
            tracing::debug!(error = %e, "could not save history");
        }
    }
}

/// Standard input, read through a line editor when attached to a terminal.
pub struct ConsoleSource<R, W> {
    editor: Option<Box<dyn LineEditor>>,
    history_path: Option<PathBuf>,
    fallback: StreamSource<R, W>,
}

impl ConsoleSource<BufReader<Stdin>, Stdout> {
    /// Opens the console. `history_path` is loaded now and saved on drop.
    pub fn open(history_path: Option<PathBuf>) -> Self {
        let editor: Option<Box<dyn LineEditor>> = if io::stdin().is_terminal() {
            match DefaultEditor::new() {
                Ok(mut editor) => {
                    if let Some(ref path) = history_path {
                        if path.exists() {
                            let _ = editor.load_history(path);
                        }
                    }
                    Some(Box::new(editor) as Box<dyn LineEditor>)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "line editor unavailable, using raw stdin");
                    None
                }
            }
        } else {
            None
        };
        let fallback = StreamSource::new(BufReader::new(io::stdin()), io::stdout());
        Self::with_editor(editor, history_path, fallback)
    }
}

impl<R, W> ConsoleSource<R, W>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    pub fn with_editor(
        editor: Option<Box<dyn LineEditor>>,
        history_path: Option<PathBuf>,
        fallback: StreamSource<R, W>,
    ) -> Self {
        Self {
            editor,
            history_path,
            fallback,
        }
    }
}

impl<R, W> ConsoleSource<R, W> {
    /// Saves history and drops the editor, restoring the terminal.
    fn release_editor(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            if let Some(ref path) = self.history_path {
                editor.save_history(path);
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl<R, W> LineSource for ConsoleSource<R, W>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    async fn read_line(
        &mut self,
        prompt: &str,
        history: History,
    ) -> Result<ReadOutcome, SessionError> {
        if let Some(editor) = self.editor.as_mut() {
            // rustyline owns the terminal in raw mode and reports Ctrl+C itself.
            match editor.readline(prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if history == History::Record && !line.is_empty() {
                        editor.add_history_entry(&line);
                    }
                    return Ok(ReadOutcome::Line(line));
                }
                Err(ReadlineError::Interrupted) => return Ok(ReadOutcome::Interrupted),
                Err(ReadlineError::Eof) => return Ok(ReadOutcome::Eof),
                Err(e) => {
                    tracing::warn!(error = %e, "line editor failed, falling back to raw stdin");
                    self.release_editor();
                    self.fallback.notify(INPUT_DISCARDED_NOTICE)?;
                }
            }
        }
        self.fallback.read_line(prompt, history).await
    }
}

impl<R, W> Drop for ConsoleSource<R, W> {
    fn drop(&mut self) {
        self.release_editor();
    }
}
