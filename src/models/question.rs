use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subjects offered on the setup screen.
pub const EXAM_SUBJECTS: [&str; 4] = ["GATE - Aptitude", "Common Part", "Part B1", "Part B2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Question type tag. Decides both rendering and the scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionType {
    Mcq,
    Msq,
    Nat,
    Match,
}

impl QuestionType {
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Msq => "MSQ",
            QuestionType::Nat => "NAT",
            QuestionType::Match => "MATCH",
        }
    }
}

/// Options and answer key, keyed by question type.
///
/// NAT questions carry no options; the other variants always do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionKind {
    #[serde(rename = "MCQ")]
    Mcq {
        options: Vec<String>,
        correct_answer: usize,
    },
    #[serde(rename = "MSQ")]
    Msq {
        options: Vec<String>,
        correct_answer: BTreeSet<usize>,
    },
    #[serde(rename = "NAT")]
    Nat { correct_answer: String },
    #[serde(rename = "MATCH")]
    Match {
        options: Vec<String>,
        correct_answer: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub subject: String,
    pub text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub explanation: String,
}

/// Reasons a question is rejected at the data boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question {id} has no options")]
    NoOptions { id: u64 },
    #[error("question {id} answer index {index} is out of range for {len} options")]
    AnswerOutOfRange { id: u64, index: usize, len: usize },
    #[error("question {id} has an empty answer set")]
    EmptyAnswerSet { id: u64 },
    #[error("question {id} has an empty numerical answer")]
    EmptyNumericAnswer { id: u64 },
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self.kind {
            QuestionKind::Mcq { .. } => QuestionType::Mcq,
            QuestionKind::Msq { .. } => QuestionType::Msq,
            QuestionKind::Nat { .. } => QuestionType::Nat,
            QuestionKind::Match { .. } => QuestionType::Match,
        }
    }

    /// Options in display order. Empty for NAT questions.
    pub fn options(&self) -> &[String] {
        match &self.kind {
            QuestionKind::Mcq { options, .. }
            | QuestionKind::Msq { options, .. }
            | QuestionKind::Match { options, .. } => options,
            QuestionKind::Nat { .. } => &[],
        }
    }

    /// Check that options and answer key agree.
    pub fn validate(&self) -> Result<(), QuestionError> {
        let id = self.id;
        let check_index = |index: usize, len: usize| {
            if index < len {
                Ok(())
            } else {
                Err(QuestionError::AnswerOutOfRange { id, index, len })
            }
        };

        match &self.kind {
            QuestionKind::Mcq {
                options,
                correct_answer,
            }
            | QuestionKind::Match {
                options,
                correct_answer,
            } => {
                if options.is_empty() {
                    return Err(QuestionError::NoOptions { id });
                }
                check_index(*correct_answer, options.len())
            }
            QuestionKind::Msq {
                options,
                correct_answer,
            } => {
                if options.is_empty() {
                    return Err(QuestionError::NoOptions { id });
                }
                if correct_answer.is_empty() {
                    return Err(QuestionError::EmptyAnswerSet { id });
                }
                correct_answer
                    .iter()
                    .try_for_each(|index| check_index(*index, options.len()))
            }
            QuestionKind::Nat { correct_answer } => {
                if correct_answer.trim().is_empty() {
                    Err(QuestionError::EmptyNumericAnswer { id })
                } else {
                    Ok(())
                }
            }
        }
    }
}
