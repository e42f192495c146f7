mod question;
mod response;

pub use question::{Difficulty, EXAM_SUBJECTS, Question, QuestionError, QuestionKind, QuestionType};
pub use response::{AnswerInput, ResponseRecord, ResponseStatus};

/// Which screen the app is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Setup,
    Loading,
    Exam,
    Result,
    Chat,
}
