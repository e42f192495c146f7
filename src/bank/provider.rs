use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::ai::AiError;
use crate::models::{Difficulty, Question};

/// Questions in one mock exam.
pub const QUESTIONS_PER_EXAM: usize = 5;

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Remote question generator.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(&self, subject: &str, difficulty: Difficulty)
    -> Result<Vec<Question>, AiError>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BankError {
    #[error("the static question bank holds {available} questions, {required} are needed")]
    InsufficientQuestions { available: usize, required: usize },
}

/// Supplies the questions for an exam, preferring the remote generator and
/// falling back to the static bank on any generator failure.
pub struct QuestionBank {
    source: Option<Box<dyn QuestionSource>>,
    fallback: Vec<Question>,
    timeout: Duration,
}

impl QuestionBank {
    pub fn new(fallback: Vec<Question>) -> Self {
        Self {
            source: None,
            fallback,
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_source(mut self, source: Box<dyn QuestionSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Produce exactly `QUESTIONS_PER_EXAM` questions.
    ///
    /// Generator failures never surface here. The only error is a static bank
    /// too small to fill an exam.
    pub async fn fetch_questions(
        &self,
        subject: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, BankError> {
        if let Some(source) = &self.source {
            match tokio::time::timeout(self.timeout, source.generate(subject, difficulty)).await {
                Ok(Ok(questions)) => match check_generated(&questions) {
                    Ok(()) => {
                        log::info!(
                            "generated {} questions for {} ({})",
                            questions.len(),
                            subject,
                            difficulty
                        );
                        return Ok(questions);
                    }
                    Err(reason) => {
                        log::warn!("discarding generated questions: {}", reason);
                    }
                },
                Ok(Err(err)) => {
                    log::error!("question generation failed, using static bank: {}", err);
                }
                Err(_) => {
                    log::error!(
                        "question generation timed out after {:?}, using static bank",
                        self.timeout
                    );
                }
            }
        }

        self.fallback_questions(subject, difficulty)
    }

    /// Static selection: matches on difficulty or subject first, padded with
    /// the remaining bank in order.
    pub fn fallback_questions(
        &self,
        subject: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, BankError> {
        if self.fallback.len() < QUESTIONS_PER_EXAM {
            return Err(BankError::InsufficientQuestions {
                available: self.fallback.len(),
                required: QUESTIONS_PER_EXAM,
            });
        }

        let is_match =
            |q: &Question| q.difficulty == difficulty || q.subject.contains(subject);

        let questions: Vec<Question> = self
            .fallback
            .iter()
            .filter(|q| is_match(q))
            .chain(self.fallback.iter().filter(|q| !is_match(q)))
            .take(QUESTIONS_PER_EXAM)
            .cloned()
            .collect();

        log::debug!(
            "static bank picked ids {:?} for {} ({})",
            questions.iter().map(|q| q.id).collect::<Vec<_>>(),
            subject,
            difficulty
        );
        Ok(questions)
    }
}

fn check_generated(questions: &[Question]) -> Result<(), String> {
    if questions.len() != QUESTIONS_PER_EXAM {
        return Err(format!(
            "expected {} questions, got {}",
            QUESTIONS_PER_EXAM,
            questions.len()
        ));
    }
    questions
        .iter()
        .try_for_each(Question::validate)
        .map_err(|err| err.to_string())
}
