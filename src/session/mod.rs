//! The console session: configuration, then one batch query or a REPL.
//!
//! A [`Session`] walks the states in [`SessionState`]. It resolves the
//! knowledge base id into an explicit [`SessionConfig`] (prompting if no
//! source supplied one), then either answers a single batch query or loops
//! reading questions until an exit keyword, end of input, or Ctrl+C.
//! Every read and every dispatch is raced against [`Interrupts`], so Ctrl+C
//! ends the session whether stdin is a terminal or a pipe.
//!
//! The session never talks to a model directly; it hands each query to a
//! [`Dispatcher`]. Dispatch failures are reported and the loop carries on.

pub mod input;

use std::io::Write;

use anyhow::{bail, Result};

use crate::constants::{
    BANNER, EMPTY_INPUT_NOTICE, EXIT_KEYWORDS, KB_ID_PROMPT, KNOWLEDGE_BASE_ENV, QUERY_PROMPT,
    SHUTDOWN_NOTICE,
};
use crate::error::SessionError;
use crate::output::{Renderer, StreamRenderer};
use input::{History, LineSource, ReadOutcome};

/// Settings fixed once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub knowledge_base_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingConfig,
    Ready,
    AwaitingQuery,
    Dispatching,
    Terminated,
}

/// How the session runs once configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Answer one query, then exit.
    Batch(String),
    /// Read-answer loop.
    Interactive,
}

impl Mode {
    /// Joins command-line words with single spaces; no words means interactive.
    pub fn from_args(words: &[String]) -> Self {
        let query = words.join(" ");
        if query.trim().is_empty() {
            Mode::Interactive
        } else {
            Mode::Batch(query)
        }
    }
}

/// Answers one query, streaming the answer into `renderer`.
#[async_trait::async_trait(?Send)]
pub trait Dispatcher {
    async fn dispatch(&self, query: &str, renderer: &mut dyn Renderer) -> Result<String>;
}

/// Whether `input` ends the interactive loop.
pub fn is_exit_keyword(input: &str) -> bool {
    EXIT_KEYWORDS.iter().any(|k| input.eq_ignore_ascii_case(k))
}

/// First non-blank knowledge base id among the startup sources.
///
/// Sources in precedence order: command line, environment, config file.
pub fn preset_knowledge_base_id(
    cli: Option<&str>,
    env: Option<&str>,
    config: Option<&str>,
) -> Option<String> {
    [cli, env, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

/// Something that can tell the session the user wants to stop.
#[async_trait::async_trait(?Send)]
pub trait Interrupts {
    /// Resolves when the user interrupts.
    async fn interrupted(&self);
}

/// Ctrl+C, delivered through tokio's signal handler.
pub struct CtrlC;

#[async_trait::async_trait(?Send)]
impl Interrupts for CtrlC {
    async fn interrupted(&self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

enum DispatchOutcome {
    Answered(Result<String>),
    Interrupted,
}

pub struct Session<S, W, I = CtrlC> {
    source: S,
    out: W,
    interrupts: I,
    state: SessionState,
}

impl<S: LineSource, W: Write> Session<S, W, CtrlC> {
    pub fn new(source: S, out: W) -> Self {
        Self::with_interrupts(source, out, CtrlC)
    }
}

impl<S: LineSource, W: Write, I: Interrupts> Session<S, W, I> {
    pub fn with_interrupts(source: S, out: W, interrupts: I) -> Self {
        Self {
            source,
            out,
            interrupts,
            state: SessionState::AwaitingConfig,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }

    /// Reads one line, or [`ReadOutcome::Interrupted`] if the user stops first.
    async fn read(&mut self, prompt: &str, history: History) -> Result<ReadOutcome, SessionError> {
        tokio::select! {
            biased;
            outcome = self.source.read_line(prompt, history) => outcome,
            _ = self.interrupts.interrupted() => Ok(ReadOutcome::Interrupted),
        }
    }

    /// Fixes the session configuration (AwaitingConfig → Ready).
    ///
    /// Uses `preset` when it is non-blank; otherwise warns and prompts until
    /// a non-empty id is entered.
    pub async fn configure(
        &mut self,
        preset: Option<String>,
    ) -> Result<SessionConfig, SessionError> {
        let knowledge_base_id = match preset.filter(|id| !id.trim().is_empty()) {
            Some(id) => id.trim().to_string(),
            None => self.prompt_knowledge_base_id().await?,
        };
        tracing::info!(%knowledge_base_id, "session configured");
        self.transition(SessionState::Ready);
        Ok(SessionConfig { knowledge_base_id })
    }

    async fn prompt_knowledge_base_id(&mut self) -> Result<String, SessionError> {
        writeln!(
            self.out,
            "Warning: {} environment variable not set",
            KNOWLEDGE_BASE_ENV
        )?;
        self.out.flush()?;
        loop {
            match self.read(KB_ID_PROMPT, History::Skip).await? {
                ReadOutcome::Line(id) if !id.is_empty() => return Ok(id),
                ReadOutcome::Line(_) => continue,
                ReadOutcome::Eof => {
                    return Err(SessionError::ConfigurationMissing {
                        reason: "input closed before an id was entered".into(),
                    })
                }
                ReadOutcome::Interrupted => {
                    return Err(SessionError::ConfigurationMissing {
                        reason: "interrupted".into(),
                    })
                }
            }
        }
    }

    /// Runs the configured session to completion.
    pub async fn run<D: Dispatcher + ?Sized>(&mut self, dispatcher: &D, mode: Mode) -> Result<()> {
        if self.state != SessionState::Ready {
            bail!("session cannot run from state {:?}", self.state);
        }
        match mode {
            Mode::Batch(query) => self.run_batch(dispatcher, &query).await,
            Mode::Interactive => self.run_interactive(dispatcher).await,
        }
    }

    async fn run_batch<D: Dispatcher + ?Sized>(&mut self, dispatcher: &D, query: &str) -> Result<()> {
        self.transition(SessionState::Dispatching);
        match self.dispatch_interruptible(dispatcher, query).await {
            DispatchOutcome::Answered(Ok(_)) => {}
            DispatchOutcome::Answered(Err(e)) => {
                tracing::debug!(error = %e, "batch dispatch failed");
                writeln!(self.out, "Error: {:#}", e)?;
            }
            DispatchOutcome::Interrupted => writeln!(self.out, "\n\n{}", SHUTDOWN_NOTICE)?,
        }
        self.out.flush()?;
        self.transition(SessionState::Terminated);
        Ok(())
    }

    async fn run_interactive<D: Dispatcher + ?Sized>(&mut self, dispatcher: &D) -> Result<()> {
        self.transition(SessionState::AwaitingQuery);
        writeln!(self.out, "{}\n", BANNER)?;
        self.out.flush()?;

        loop {
            let query = match self.read(QUERY_PROMPT, History::Record).await? {
                ReadOutcome::Line(query) => query,
                ReadOutcome::Eof | ReadOutcome::Interrupted => {
                    writeln!(self.out, "\n\n{}", SHUTDOWN_NOTICE)?;
                    break;
                }
            };

            if is_exit_keyword(&query) {
                writeln!(self.out, "{}", SHUTDOWN_NOTICE)?;
                break;
            }
            if query.is_empty() {
                writeln!(self.out, "{}\n", EMPTY_INPUT_NOTICE)?;
                continue;
            }

            self.transition(SessionState::Dispatching);
            writeln!(self.out)?;
            match self.dispatch_interruptible(dispatcher, &query).await {
                DispatchOutcome::Answered(Ok(_)) => writeln!(self.out)?,
                DispatchOutcome::Answered(Err(e)) => {
                    tracing::debug!(error = %e, "dispatch failed");
                    writeln!(self.out, "\nError: {:#}\n", e)?;
                }
                DispatchOutcome::Interrupted => {
                    writeln!(self.out, "\n\n{}", SHUTDOWN_NOTICE)?;
                    break;
                }
            }
            self.out.flush()?;
            self.transition(SessionState::AwaitingQuery);
        }

        self.out.flush()?;
        self.transition(SessionState::Terminated);
        Ok(())
    }

    /// Streams one answer, giving up if the user interrupts first.
    async fn dispatch_interruptible<D: Dispatcher + ?Sized>(
        &mut self,
        dispatcher: &D,
        query: &str,
    ) -> DispatchOutcome {
        let mut renderer = StreamRenderer::new(&mut self.out);
        let result = tokio::select! {
            biased;
            result = dispatcher.dispatch(query, &mut renderer) => result,
            _ = self.interrupts.interrupted() => return DispatchOutcome::Interrupted,
        };
        if let Ok(ref response) = result {
            finish_answer(&mut renderer, response);
        }
        DispatchOutcome::Answered(result)
    }
}

/// Completes a rendered answer, printing `response` if nothing was streamed.
fn finish_answer<W: Write>(renderer: &mut StreamRenderer<W>, response: &str) {
    if renderer.raw_text().is_empty() && !response.is_empty() {
        renderer.render_token(response);
    }
    renderer.render_done();
}

#[cfg(test)]
mod tests;
