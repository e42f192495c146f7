use std::time::Duration;

use crate::ai::{COURSES_URL, ChatMessage, ChatReply, ChatRole, QuickAction, detect_quick_action};
use crate::bank::BankError;
use crate::models::{AnswerInput, AppState, Difficulty, EXAM_SUBJECTS, Question, QuestionType};
use crate::scoring::ScoreReport;
use crate::session::ExamSession;

/// Completion of a background task, tagged with the request generation.
#[derive(Debug)]
pub enum AppEvent {
    QuestionsLoaded {
        generation: u64,
        result: Result<Vec<Question>, BankError>,
    },
    ChatReplied {
        generation: u64,
        reply: ChatReply,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub subject: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub generation: u64,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Subject,
    Difficulty,
}

pub struct App {
    pub state: AppState,
    exam_duration: Duration,
    subject_index: usize,
    difficulty_index: usize,
    setup_field: SetupField,
    session: Option<ExamSession>,
    report: Option<ScoreReport>,
    option_cursor: usize,
    result_scroll: usize,
    notice: Option<String>,
    fetch_generation: u64,
    chat_messages: Vec<ChatMessage>,
    chat_input: String,
    chat_generation: u64,
    chat_pending: bool,
    chat_return: AppState,
    suggestion_cursor: usize,
}

impl App {
    pub fn new(exam_duration: Duration) -> Self {
        Self {
            state: AppState::Setup,
            exam_duration,
            subject_index: 0,
            difficulty_index: 1,
            setup_field: SetupField::Subject,
            session: None,
            report: None,
            option_cursor: 0,
            result_scroll: 0,
            notice: None,
            fetch_generation: 0,
            chat_messages: Vec::new(),
            chat_input: String::new(),
            chat_generation: 0,
            chat_pending: false,
            chat_return: AppState::Setup,
            suggestion_cursor: 0,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    // Setup

    pub fn setup_field(&self) -> SetupField {
        self.setup_field
    }

    pub fn subject_index(&self) -> usize {
        self.subject_index
    }

    pub fn selected_subject(&self) -> &'static str {
        EXAM_SUBJECTS[self.subject_index]
    }

    pub fn selected_difficulty(&self) -> Difficulty {
        Difficulty::ALL[self.difficulty_index]
    }

    pub fn toggle_setup_field(&mut self) {
        self.setup_field = match self.setup_field {
            SetupField::Subject => SetupField::Difficulty,
            SetupField::Difficulty => SetupField::Subject,
        };
    }

    pub fn setup_next(&mut self) {
        match self.setup_field {
            SetupField::Subject => {
                self.subject_index = (self.subject_index + 1) % EXAM_SUBJECTS.len();
            }
            SetupField::Difficulty => {
                self.difficulty_index = (self.difficulty_index + 1) % Difficulty::ALL.len();
            }
        }
    }

    pub fn setup_previous(&mut self) {
        match self.setup_field {
            SetupField::Subject => {
                let len = EXAM_SUBJECTS.len();
                self.subject_index = (self.subject_index + len - 1) % len;
            }
            SetupField::Difficulty => {
                let len = Difficulty::ALL.len();
                self.difficulty_index = (self.difficulty_index + len - 1) % len;
            }
        }
    }

    /// Move to the loading screen and describe the fetch to run.
    pub fn begin_fetch(&mut self) -> FetchRequest {
        self.fetch_generation += 1;
        self.state = AppState::Loading;
        self.notice = None;
        FetchRequest {
            generation: self.fetch_generation,
            subject: self.selected_subject().to_string(),
            difficulty: self.selected_difficulty(),
        }
    }

    /// Abort setup while a fetch is pending. Its result will be dropped.
    pub fn cancel_loading(&mut self) {
        if self.state == AppState::Loading {
            self.fetch_generation += 1;
            self.state = AppState::Setup;
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::QuestionsLoaded { generation, result } => {
                if generation != self.fetch_generation || self.state != AppState::Loading {
                    log::debug!("dropping stale question set (generation {})", generation);
                    return;
                }
                let duration = self.exam_duration;
                let session = result.map_err(|err| err.to_string()).and_then(|questions| {
                    ExamSession::new(questions, duration).map_err(|err| err.to_string())
                });
                match session {
                    Ok(session) => {
                        log::info!("exam started with {} questions", session.len());
                        self.session = Some(session);
                        self.report = None;
                        self.state = AppState::Exam;
                        self.sync_option_cursor();
                    }
                    Err(reason) => {
                        log::error!("cannot start exam: {}", reason);
                        self.set_notice(format!("Test initialization failed: {}", reason));
                        self.state = AppState::Setup;
                    }
                }
            }
            AppEvent::ChatReplied { generation, reply } => {
                if generation != self.chat_generation {
                    log::debug!("dropping stale chat reply (generation {})", generation);
                    return;
                }
                self.chat_messages.push(ChatMessage::model(reply));
                self.chat_pending = false;
                self.suggestion_cursor = 0;
            }
        }
    }

    // Exam

    pub fn session(&self) -> Option<&ExamSession> {
        self.session.as_ref()
    }

    pub fn option_cursor(&self) -> usize {
        self.option_cursor
    }

    pub fn select_next_option(&mut self) {
        let count = self.current_option_count();
        if count > 0 {
            self.option_cursor = (self.option_cursor + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        let count = self.current_option_count();
        if count > 0 {
            self.option_cursor = (self.option_cursor + count - 1) % count;
        }
    }

    /// Pick (or toggle, for MSQ) the highlighted option.
    pub fn choose_option(&mut self) {
        let cursor = self.option_cursor;
        self.with_current_slot(|session, index| {
            if session.current_question().options().is_empty() {
                return;
            }
            if let Err(err) = session.record_answer(index, AnswerInput::Option(cursor)) {
                log::error!("failed to record answer: {}", err);
            }
        });
    }

    pub fn push_numeric_char(&mut self, c: char) {
        self.edit_numeric(|value| value.push(c));
    }

    pub fn pop_numeric_char(&mut self) {
        self.edit_numeric(|value| {
            value.pop();
        });
    }

    pub fn current_question_type(&self) -> Option<QuestionType> {
        self.session
            .as_ref()
            .map(|session| session.current_question().question_type())
    }

    pub fn save_and_next(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.save_and_next();
        }
        self.sync_option_cursor();
    }

    pub fn mark_for_review(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.mark_for_review();
        }
        self.sync_option_cursor();
    }

    pub fn clear_response(&mut self) {
        self.with_current_slot(|session, index| {
            if let Err(err) = session.clear_response(index) {
                log::error!("failed to clear response: {}", err);
            }
        });
        self.sync_option_cursor();
    }

    pub fn next_question(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.next();
        }
        self.sync_option_cursor();
    }

    pub fn previous_question(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.previous();
        }
        self.sync_option_cursor();
    }

    /// Palette jump. Slots past the end are ignored.
    pub fn jump_to(&mut self, index: usize) {
        if let Some(session) = self.session.as_mut() {
            if let Err(err) = session.jump_to(index) {
                log::debug!("ignoring palette jump: {}", err);
            }
        }
        self.sync_option_cursor();
    }

    pub fn tick(&mut self) {
        if self.state != AppState::Exam {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            let was_running = !session.is_time_up();
            session.tick();
            if was_running && session.is_time_up() {
                log::info!("exam clock reached zero");
            }
        }
    }

    pub fn submit(&mut self) {
        if let Some(session) = &self.session {
            let report = session.submit();
            log::info!("exam submitted: {}/{}", report.score, report.total);
            self.report = Some(report);
            self.result_scroll = 0;
            self.state = AppState::Result;
        }
    }

    /// Leave the exam; responses are discarded.
    pub fn abandon_exam(&mut self) {
        self.session = None;
        self.report = None;
        self.state = AppState::Setup;
    }

    // Result

    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn scroll_results_down(&mut self) {
        let max_scroll = self
            .session
            .as_ref()
            .map(|s| s.len().saturating_sub(1))
            .unwrap_or(0);
        self.result_scroll = (self.result_scroll + 1).min(max_scroll);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    /// Same questions, fresh responses and clock.
    pub fn retake(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.restart();
            self.report = None;
            self.state = AppState::Exam;
        }
        self.sync_option_cursor();
    }

    pub fn new_test(&mut self) {
        self.abandon_exam();
    }

    // Chat

    pub fn chat_messages(&self) -> &[ChatMessage] {
        &self.chat_messages
    }

    pub fn chat_input(&self) -> &str {
        &self.chat_input
    }

    pub fn chat_pending(&self) -> bool {
        self.chat_pending
    }

    pub fn open_chat(&mut self) {
        if self.state != AppState::Chat {
            self.chat_return = self.state;
            self.state = AppState::Chat;
        }
    }

    /// Return to the screen chat was opened from. Chat-screen notices stay
    /// behind.
    pub fn close_chat(&mut self) {
        if self.state == AppState::Chat {
            self.clear_notice();
            self.state = self.chat_return;
        }
    }

    pub fn chat_input_push(&mut self, c: char) {
        self.chat_input.push(c);
    }

    pub fn chat_input_pop(&mut self) {
        self.chat_input.pop();
    }

    /// Fill the input with the next suggestion from the latest reply.
    pub fn cycle_suggestion(&mut self) {
        let Some(suggestions) = self
            .chat_messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Model)
            .map(|m| &m.suggestions)
        else {
            return;
        };
        if suggestions.is_empty() {
            return;
        }
        self.chat_input = suggestions[self.suggestion_cursor % suggestions.len()].clone();
        self.suggestion_cursor += 1;
    }

    /// Consume the chat input. Quick actions are handled here; anything else
    /// becomes a request for the assistant.
    pub fn submit_chat(&mut self) -> Option<ChatRequest> {
        let text = self.chat_input.trim().to_string();
        if text.is_empty() || self.chat_pending {
            return None;
        }
        self.chat_input.clear();

        match detect_quick_action(&text) {
            Some(QuickAction::StartMockTest) => {
                self.abandon_exam();
                return None;
            }
            Some(QuickAction::ViewCourses) => {
                self.chat_messages.push(ChatMessage::user(text));
                self.chat_messages.push(ChatMessage::model(ChatReply {
                    text: format!("Explore our **Mastery Courses** at {}", COURSES_URL),
                    suggestions: vec!["Take Gate Mock Test".to_string()],
                    is_fallback: false,
                }));
                return None;
            }
            None => {}
        }

        let history = self.chat_messages.clone();
        self.chat_messages.push(ChatMessage::user(text.clone()));
        self.chat_generation += 1;
        self.chat_pending = true;
        Some(ChatRequest {
            generation: self.chat_generation,
            history,
            message: text,
        })
    }

    fn current_option_count(&self) -> usize {
        self.session
            .as_ref()
            .map(|s| s.current_question().options().len())
            .unwrap_or(0)
    }

    fn with_current_slot(&mut self, f: impl FnOnce(&mut ExamSession, usize)) {
        if let Some(session) = self.session.as_mut() {
            let index = session.current_index();
            f(session, index);
        }
    }

    fn edit_numeric(&mut self, edit: impl FnOnce(&mut String)) {
        self.with_current_slot(|session, index| {
            if session.current_question().question_type() != QuestionType::Nat {
                return;
            }
            let mut value = session.current_response().numerical_value.clone();
            edit(&mut value);
            if let Err(err) = session.record_answer(index, AnswerInput::Numeric(value)) {
                log::error!("failed to record answer: {}", err);
            }
        });
    }

    fn sync_option_cursor(&mut self) {
        self.option_cursor = self
            .session
            .as_ref()
            .and_then(|s| {
                let response = s.current_response();
                response
                    .selected_option
                    .or_else(|| response.selected_options.iter().next().copied())
            })
            .unwrap_or(0);
    }
}
