use super::*;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{BufReader, Cursor, Read};
use std::rc::Rc;
use std::sync::mpsc;

use input::StreamSource;

/// Returns a canned answer (or error) and records every query.
struct RecordingDispatcher {
    queries: RefCell<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl RecordingDispatcher {
    fn new() -> Self {
        Self {
            queries: RefCell::new(Vec::new()),
            fail_on: None,
        }
    }

    fn failing_on(query: &'static str) -> Self {
        Self {
            queries: RefCell::new(Vec::new()),
            fail_on: Some(query),
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

#[async_trait::async_trait(?Send)]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(&self, query: &str, renderer: &mut dyn Renderer) -> Result<String> {
        self.queries.borrow_mut().push(query.to_string());
        if self.fail_on == Some(query) {
            bail!("model unavailable");
        }
        let answer = format!("answer to {}", query);
        renderer.render_token(&answer);
        Ok(answer)
    }
}

/// Streams a partial answer, pulls the interrupt switch, then never finishes.
struct StallingDispatcher {
    switch: Rc<Cell<bool>>,
}

#[async_trait::async_trait(?Send)]
impl Dispatcher for StallingDispatcher {
    async fn dispatch(&self, _query: &str, renderer: &mut dyn Renderer) -> Result<String> {
        renderer.render_token("Zelda was");
        self.switch.set(true);
        std::future::pending::<()>().await;
        Ok(String::new())
    }
}

/// Fires once the shared switch is on.
struct Switch(Rc<Cell<bool>>);

impl Switch {
    fn off() -> Self {
        Self(Rc::new(Cell::new(false)))
    }

    fn on() -> Self {
        Self(Rc::new(Cell::new(true)))
    }
}

#[async_trait::async_trait(?Send)]
impl Interrupts for Switch {
    async fn interrupted(&self) {
        while !self.0.get() {
            tokio::task::yield_now().await;
        }
    }
}

/// Replays a fixed list of read outcomes, then reports end of input.
struct ScriptedSource {
    outcomes: VecDeque<ReadOutcome>,
    prompts: Vec<String>,
}

impl ScriptedSource {
    fn new(outcomes: Vec<ReadOutcome>) -> Self {
        Self {
            outcomes: outcomes.into(),
            prompts: Vec::new(),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl LineSource for ScriptedSource {
    async fn read_line(
        &mut self,
        prompt: &str,
        _history: History,
    ) -> Result<ReadOutcome, SessionError> {
        self.prompts.push(prompt.to_string());
        Ok(self.outcomes.pop_front().unwrap_or(ReadOutcome::Eof))
    }
}

/// A pipe that stays open without data until the sender is dropped.
struct OpenPipe(mpsc::Receiver<Vec<u8>>);

impl Read for OpenPipe {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.0.recv() {
            Ok(bytes) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Err(_) => Ok(0),
        }
    }
}

fn lines(input: &str) -> StreamSource<Cursor<Vec<u8>>, Vec<u8>> {
    StreamSource::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn session<S: LineSource>(source: S) -> Session<S, Vec<u8>, Switch> {
    Session::with_interrupts(source, Vec::new(), Switch::off())
}

async fn ready_session<S: LineSource>(source: S) -> Session<S, Vec<u8>, Switch> {
    let mut session = session(source);
    session.configure(Some("KB-1".into())).await.unwrap();
    session
}

fn output<S, I>(session: &Session<S, Vec<u8>, I>) -> String {
    String::from_utf8(session.out.clone()).unwrap()
}

#[test]
fn test_exit_keywords_case_insensitive() {
    for word in ["exit", "EXIT", "Quit", "q", "Q"] {
        assert!(is_exit_keyword(word), "{word} should exit");
    }
    for word in ["", "quit now", "exits", "qq"] {
        assert!(!is_exit_keyword(word), "{word} should not exit");
    }
}

#[test]
fn test_mode_from_args() {
    assert_eq!(Mode::from_args(&[]), Mode::Interactive);
    assert_eq!(
        Mode::from_args(&["zelda".into(), "release".into(), "year".into()]),
        Mode::Batch("zelda release year".into())
    );
    assert_eq!(Mode::from_args(&[" ".into()]), Mode::Interactive);
}

#[test]
fn test_preset_precedence() {
    assert_eq!(
        preset_knowledge_base_id(Some("CLI"), Some("ENV"), Some("CFG")).as_deref(),
        Some("CLI")
    );
    assert_eq!(
        preset_knowledge_base_id(None, Some(" ENV "), Some("CFG")).as_deref(),
        Some("ENV")
    );
    assert_eq!(
        preset_knowledge_base_id(Some(""), None, Some("CFG")).as_deref(),
        Some("CFG")
    );
    assert_eq!(preset_knowledge_base_id(None, Some("  "), None), None);
}

#[tokio::test]
async fn test_configure_with_preset_does_not_prompt() {
    let mut session = session(ScriptedSource::new(vec![]));
    assert_eq!(session.state(), SessionState::AwaitingConfig);
    let config = session.configure(Some("KB-PRESET".into())).await.unwrap();
    assert_eq!(config.knowledge_base_id, "KB-PRESET");
    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.source.prompts.is_empty());
    assert_eq!(output(&session), "");
}

#[tokio::test]
async fn test_configure_prompts_until_non_empty() {
    let mut session = session(lines("\n   \nKB-TYPED\n"));
    let config = session.configure(None).await.unwrap();
    assert_eq!(config.knowledge_base_id, "KB-TYPED");
    assert_eq!(
        output(&session),
        "Warning: KNOWLEDGE_BASE_ID environment variable not set\n"
    );
    let prompts = String::from_utf8(session.source.writer().clone()).unwrap();
    assert_eq!(prompts, KB_ID_PROMPT.repeat(3));
}

#[tokio::test]
async fn test_configure_fails_on_eof() {
    let mut session = session(lines(""));
    let err = session.configure(None).await.unwrap_err();
    assert!(matches!(err, SessionError::ConfigurationMissing { .. }));
    assert_eq!(session.state(), SessionState::AwaitingConfig);
}

#[tokio::test]
async fn test_configure_fails_on_interrupt() {
    let (_keep_open, rx) = mpsc::channel::<Vec<u8>>();
    let source = StreamSource::new(BufReader::new(OpenPipe(rx)), Vec::new());
    let mut session = Session::with_interrupts(source, Vec::new(), Switch::on());
    let err = session.configure(None).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::ConfigurationMissing { ref reason } if reason == "interrupted"
    ));
}

#[tokio::test]
async fn test_run_requires_configuration() {
    let mut session = session(lines("zelda\n"));
    let dispatcher = RecordingDispatcher::new();
    assert!(session.run(&dispatcher, Mode::Interactive).await.is_err());
    assert!(dispatcher.queries().is_empty());
}

#[tokio::test]
async fn test_batch_blocks_for_config_before_dispatch() {
    let mut session = session(ScriptedSource::new(vec![
        ReadOutcome::Line(String::new()),
        ReadOutcome::Line("KB-LATE".into()),
    ]));
    let dispatcher = RecordingDispatcher::new();

    let config = session.configure(None).await.unwrap();
    assert_eq!(config.knowledge_base_id, "KB-LATE");
    assert_eq!(session.source.prompts.len(), 2);
    assert!(dispatcher.queries().is_empty());

    session
        .run(&dispatcher, Mode::Batch("zelda info".into()))
        .await
        .unwrap();
    assert_eq!(dispatcher.queries(), vec!["zelda info"]);
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_batch_prints_answer() {
    let mut session = ready_session(ScriptedSource::new(vec![])).await;
    let dispatcher = RecordingDispatcher::new();
    session
        .run(&dispatcher, Mode::Batch("elden ring".into()))
        .await
        .unwrap();
    assert_eq!(output(&session), "answer to elden ring\n");
    assert!(session.source.prompts.is_empty());
}

#[tokio::test]
async fn test_batch_reports_error_without_failing() {
    let mut session = ready_session(ScriptedSource::new(vec![])).await;
    let dispatcher = RecordingDispatcher::failing_on("boom");
    session
        .run(&dispatcher, Mode::Batch("boom".into()))
        .await
        .unwrap();
    assert_eq!(output(&session), "Error: model unavailable\n");
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_empty_then_quit_never_dispatches() {
    let mut session = ready_session(lines("\nquit\n")).await;
    let dispatcher = RecordingDispatcher::new();
    session.run(&dispatcher, Mode::Interactive).await.unwrap();

    assert!(dispatcher.queries().is_empty());
    assert_eq!(
        output(&session),
        format!(
            "{}\n\n{}\n\n{}\n",
            BANNER, EMPTY_INPUT_NOTICE, SHUTDOWN_NOTICE
        )
    );
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_answers_are_framed_by_blank_lines() {
    let mut session = ready_session(lines("zelda\nEXIT\n")).await;
    let dispatcher = RecordingDispatcher::new();
    session.run(&dispatcher, Mode::Interactive).await.unwrap();

    assert_eq!(dispatcher.queries(), vec!["zelda"]);
    assert_eq!(
        output(&session),
        format!("{}\n\n\nanswer to zelda\n\n{}\n", BANNER, SHUTDOWN_NOTICE)
    );
}

#[tokio::test]
async fn test_dispatch_failure_keeps_loop_alive() {
    let mut session = ready_session(lines("boom\nelden ring\nq\n")).await;
    let dispatcher = RecordingDispatcher::failing_on("boom");
    session.run(&dispatcher, Mode::Interactive).await.unwrap();

    assert_eq!(dispatcher.queries(), vec!["boom", "elden ring"]);
    let out = output(&session);
    assert!(out.contains("\nError: model unavailable\n\n"));
    assert!(out.contains("answer to elden ring"));
    assert!(out.ends_with(&format!("{}\n", SHUTDOWN_NOTICE)));
}

#[tokio::test]
async fn test_interrupted_read_terminates_immediately() {
    let mut session = ready_session(ScriptedSource::new(vec![
        ReadOutcome::Line("zelda".into()),
        ReadOutcome::Line(String::new()),
        ReadOutcome::Interrupted,
        ReadOutcome::Line("never read".into()),
    ]))
    .await;
    let dispatcher = RecordingDispatcher::new();
    session.run(&dispatcher, Mode::Interactive).await.unwrap();

    assert_eq!(dispatcher.queries(), vec!["zelda"]);
    assert_eq!(session.source.prompts.len(), 3);
    assert!(output(&session).ends_with(&format!("\n\n{}\n", SHUTDOWN_NOTICE)));
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_ctrl_c_while_waiting_on_open_pipe() {
    let (_keep_open, rx) = mpsc::channel::<Vec<u8>>();
    let source = StreamSource::new(BufReader::new(OpenPipe(rx)), Vec::new());
    let mut session = Session::with_interrupts(source, Vec::new(), Switch::on());
    session.configure(Some("KB-1".into())).await.unwrap();
    let dispatcher = RecordingDispatcher::new();

    session.run(&dispatcher, Mode::Interactive).await.unwrap();

    assert!(dispatcher.queries().is_empty());
    assert_eq!(session.source.writer(), &QUERY_PROMPT.as_bytes().to_vec());
    assert_eq!(
        output(&session),
        format!("{}\n\n\n\n{}\n", BANNER, SHUTDOWN_NOTICE)
    );
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_ctrl_c_during_dispatch_terminates() {
    let switch = Switch::off();
    let dispatcher = StallingDispatcher {
        switch: Rc::clone(&switch.0),
    };
    let mut session = Session::with_interrupts(lines("zelda\nelden ring\n"), Vec::new(), switch);
    session.configure(Some("KB-1".into())).await.unwrap();

    session.run(&dispatcher, Mode::Interactive).await.unwrap();

    assert_eq!(
        output(&session),
        format!("{}\n\n\nZelda was\n\n{}\n", BANNER, SHUTDOWN_NOTICE)
    );
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_ctrl_c_during_batch_dispatch() {
    let switch = Switch::off();
    let dispatcher = StallingDispatcher {
        switch: Rc::clone(&switch.0),
    };
    let mut session = Session::with_interrupts(ScriptedSource::new(vec![]), Vec::new(), switch);
    session.configure(Some("KB-1".into())).await.unwrap();

    session
        .run(&dispatcher, Mode::Batch("zelda".into()))
        .await
        .unwrap();

    assert_eq!(
        output(&session),
        format!("Zelda was\n\n{}\n", SHUTDOWN_NOTICE)
    );
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_end_of_input_terminates() {
    let mut session = ready_session(lines("zelda\n")).await;
    let dispatcher = RecordingDispatcher::new();
    session.run(&dispatcher, Mode::Interactive).await.unwrap();

    assert_eq!(dispatcher.queries(), vec!["zelda"]);
    assert!(output(&session).ends_with(&format!("\n\n{}\n", SHUTDOWN_NOTICE)));
}

#[tokio::test]
async fn test_undecodable_input_is_lossy_not_fatal() {
    let source = StreamSource::new(Cursor::new(b"zeld\xe1\nquit\n".to_vec()), Vec::new());
    let mut session = ready_session(source).await;
    let dispatcher = RecordingDispatcher::new();
    session.run(&dispatcher, Mode::Interactive).await.unwrap();
    assert_eq!(dispatcher.queries(), vec!["zeld\u{FFFD}"]);
}
