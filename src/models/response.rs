use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::QuestionType;

/// Palette status of a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseStatus {
    NotVisited,
    NotAnswered,
    Answered,
    MarkedForReview,
    AnsweredAndMarked,
}

impl ResponseStatus {
    pub const ALL: [ResponseStatus; 5] = [
        ResponseStatus::NotVisited,
        ResponseStatus::NotAnswered,
        ResponseStatus::Answered,
        ResponseStatus::MarkedForReview,
        ResponseStatus::AnsweredAndMarked,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResponseStatus::NotVisited => "Not Visited",
            ResponseStatus::NotAnswered => "Not Answered",
            ResponseStatus::Answered => "Answered",
            ResponseStatus::MarkedForReview => "Marked for Review",
            ResponseStatus::AnsweredAndMarked => "Answered & Marked",
        }
    }

    pub fn is_marked(self) -> bool {
        matches!(
            self,
            ResponseStatus::MarkedForReview | ResponseStatus::AnsweredAndMarked
        )
    }
}

/// Answer payload handed to `ExamSession::record_answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    /// Option index. Replaces the selection for MCQ/MATCH, toggles it for MSQ.
    Option(usize),
    /// Raw numerical text for NAT, stored verbatim.
    Numeric(String),
}

/// What the user has done with one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub question_id: u64,
    pub selected_option: Option<usize>,
    pub selected_options: BTreeSet<usize>,
    pub numerical_value: String,
    pub status: ResponseStatus,
}

impl ResponseRecord {
    pub fn new(question_id: u64) -> Self {
        Self {
            question_id,
            selected_option: None,
            selected_options: BTreeSet::new(),
            numerical_value: String::new(),
            status: ResponseStatus::NotVisited,
        }
    }

    /// Per-type answered predicate.
    pub fn is_answered(&self, question_type: QuestionType) -> bool {
        match question_type {
            QuestionType::Nat => !self.numerical_value.is_empty(),
            QuestionType::Msq => !self.selected_options.is_empty(),
            QuestionType::Mcq | QuestionType::Match => self.selected_option.is_some(),
        }
    }

    /// Drop every payload field. Status is left to the caller.
    pub fn clear_payload(&mut self) {
        self.selected_option = None;
        self.selected_options.clear();
        self.numerical_value.clear();
    }

    pub fn toggle_option(&mut self, index: usize) {
        if !self.selected_options.remove(&index) {
            self.selected_options.insert(index);
        }
    }
}
