//! # mock-exam
//!
//! A terminal mock exam for architecture entrance tests, with AI-generated
//! question sets and a study assistant chat.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use mock_exam::ai::ChatAssistant;
//! use mock_exam::bank::{QuestionBank, builtin_questions};
//! use mock_exam::logbook::InteractionLog;
//! use mock_exam::{App, ExamError, MockExam};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ExamError> {
//!     let interactions = Arc::new(InteractionLog::default());
//!     let exam = MockExam::new(
//!         App::new(Duration::from_secs(15 * 60)),
//!         QuestionBank::new(builtin_questions()),
//!         ChatAssistant::new(None, interactions.clone()),
//!         interactions,
//!         "exam_interactions.json",
//!     );
//!
//!     // Takes over the terminal until the user quits
//!     exam.run().await
//! }
//! ```

pub mod ai;
pub mod app;
pub mod bank;
pub mod config;
pub mod data;
pub mod logbook;
pub mod models;
pub mod scoring;
pub mod session;
pub mod terminal;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use thiserror::Error;
use tokio::sync::mpsc;

use ai::ChatAssistant;
use app::{AppEvent, ChatRequest, FetchRequest};
use bank::QuestionBank;
use logbook::InteractionLog;

pub use app::App;
pub use data::{LoadError, load_questions_from_json};
pub use models::{AppState, Question};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Error type for running the exam.
#[derive(Debug, Error)]
pub enum ExamError {
    #[error("Failed to load questions: {0}")]
    Load(#[from] LoadError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The mock exam application, ready to run in the terminal.
pub struct MockExam {
    app: App,
    bank: Arc<QuestionBank>,
    assistant: Arc<ChatAssistant>,
    interactions: Arc<InteractionLog>,
    transcript_path: PathBuf,
}

impl MockExam {
    pub fn new(
        app: App,
        bank: QuestionBank,
        assistant: ChatAssistant,
        interactions: Arc<InteractionLog>,
        transcript_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            app,
            bank: Arc::new(bank),
            assistant: Arc::new(assistant),
            interactions,
            transcript_path: transcript_path.into(),
        }
    }

    /// Run the exam in the terminal.
    ///
    /// This will take over the terminal and return when the user quits.
    /// Must be called from within a multi-threaded tokio runtime.
    pub async fn run(mut self) -> Result<(), ExamError> {
        let mut term = terminal::init()?;
        let result = self.event_loop(&mut term).await;
        terminal::restore()?;
        result
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Write the chat transcript and report the outcome on screen.
    pub fn export_transcript(&mut self) {
        match self.interactions.export(&self.transcript_path) {
            Ok(count) => self.app.set_notice(format!(
                "Exported {} interactions to {}",
                count,
                self.transcript_path.display()
            )),
            Err(err) => {
                log::warn!("transcript export failed: {}", err);
                self.app.set_notice(err.to_string());
            }
        }
    }

    async fn event_loop(&mut self, terminal: &mut terminal::ExamTerminal) -> Result<(), ExamError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
        let mut last_tick = Instant::now();

        loop {
            while let Ok(event) = rx.try_recv() {
                self.app.handle_event(event);
            }

            terminal.draw(|frame| ui::render(frame, &self.app))?;

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        match handle_input(&mut self.app, key) {
                            InputOutcome::Quit => break,
                            InputOutcome::Fetch(request) => {
                                spawn_fetch(Arc::clone(&self.bank), request, tx.clone());
                            }
                            InputOutcome::Chat(request) => {
                                spawn_chat(Arc::clone(&self.assistant), request, tx.clone());
                            }
                            InputOutcome::ExportTranscript => self.export_transcript(),
                            InputOutcome::None => {}
                        }
                    }
                }
            }

            while last_tick.elapsed() >= TICK_INTERVAL {
                last_tick += TICK_INTERVAL;
                self.app.tick();
            }
        }

        Ok(())
    }
}

fn spawn_fetch(bank: Arc<QuestionBank>, request: FetchRequest, tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let result = bank
            .fetch_questions(&request.subject, request.difficulty)
            .await;
        let event = AppEvent::QuestionsLoaded {
            generation: request.generation,
            result,
        };
        if tx.send(event).is_err() {
            log::debug!("question set arrived after the UI closed");
        }
    });
}

fn spawn_chat(
    assistant: Arc<ChatAssistant>,
    request: ChatRequest,
    tx: mpsc::UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        let reply = assistant.reply(&request.history, &request.message).await;
        let event = AppEvent::ChatReplied {
            generation: request.generation,
            reply,
        };
        if tx.send(event).is_err() {
            log::debug!("chat reply arrived after the UI closed");
        }
    });
}

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq)]
enum InputOutcome {
    None,
    Quit,
    Fetch(FetchRequest),
    Chat(ChatRequest),
    ExportTranscript,
}

fn handle_input(app: &mut App, key: KeyEvent) -> InputOutcome {
    match app.state {
        AppState::Setup => handle_setup_input(app, key.code),
        AppState::Loading => handle_loading_input(app, key.code),
        AppState::Exam => handle_exam_input(app, key.code),
        AppState::Result => handle_result_input(app, key.code),
        AppState::Chat => handle_chat_input(app, key),
    }
}

fn handle_setup_input(app: &mut App, key: KeyCode) -> InputOutcome {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.setup_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.setup_next(),
        KeyCode::Tab | KeyCode::Left | KeyCode::Right => app.toggle_setup_field(),
        KeyCode::Enter => return InputOutcome::Fetch(app.begin_fetch()),
        KeyCode::Char('c') | KeyCode::Char('C') => app.open_chat(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return InputOutcome::Quit,
        _ => {}
    }
    InputOutcome::None
}

fn handle_loading_input(app: &mut App, key: KeyCode) -> InputOutcome {
    match key {
        KeyCode::Esc => app.cancel_loading(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return InputOutcome::Quit,
        _ => {}
    }
    InputOutcome::None
}

fn handle_exam_input(app: &mut App, key: KeyCode) -> InputOutcome {
    let numeric = app.current_question_type() == Some(models::QuestionType::Nat);

    match key {
        KeyCode::Char(c) if numeric && (c.is_ascii_digit() || c == '.' || c == '-') => {
            app.push_numeric_char(c);
        }
        KeyCode::Backspace if numeric => app.pop_numeric_char(),
        KeyCode::Char(c @ '1'..='9') => app.jump_to(palette_slot(c)),
        KeyCode::F(n @ 1..=9) => app.jump_to(usize::from(n) - 1),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Char(' ') => app.choose_option(),
        KeyCode::Enter => app.save_and_next(),
        KeyCode::Char('m') | KeyCode::Char('M') => app.mark_for_review(),
        KeyCode::Char('x') | KeyCode::Char('X') => app.clear_response(),
        KeyCode::Left | KeyCode::Char('h') => app.previous_question(),
        KeyCode::Right | KeyCode::Char('l') => app.next_question(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.submit(),
        KeyCode::Esc => app.abandon_exam(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return InputOutcome::Quit,
        _ => {}
    }
    InputOutcome::None
}

fn palette_slot(c: char) -> usize {
    c.to_digit(10).map(|d| d as usize).unwrap_or(1) - 1
}

fn handle_result_input(app: &mut App, key: KeyCode) -> InputOutcome {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.retake(),
        KeyCode::Char('n') | KeyCode::Char('N') => app.new_test(),
        KeyCode::Char('c') | KeyCode::Char('C') => app.open_chat(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return InputOutcome::Quit,
        _ => {}
    }
    InputOutcome::None
}

fn handle_chat_input(app: &mut App, key: KeyEvent) -> InputOutcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => InputOutcome::Quit,
            KeyCode::Char('e') => InputOutcome::ExportTranscript,
            _ => InputOutcome::None,
        };
    }

    match key.code {
        KeyCode::Enter => {
            if let Some(request) = app.submit_chat() {
                return InputOutcome::Chat(request);
            }
        }
        KeyCode::Tab => app.cycle_suggestion(),
        KeyCode::Backspace => app.chat_input_pop(),
        KeyCode::Esc => app.close_chat(),
        KeyCode::Char(c) => app.chat_input_push(c),
        _ => {}
    }
    InputOutcome::None
}
