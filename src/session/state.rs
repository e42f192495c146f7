use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::models::{AnswerInput, Question, QuestionType, ResponseRecord, ResponseStatus};
use crate::scoring::{self, ScoreReport};

use super::Countdown;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("slot {index} is out of range for {len} questions")]
    InvalidSlotIndex { index: usize, len: usize },
    #[error("an exam session needs at least one question")]
    NoQuestions,
}

/// One running mock exam: questions, per-slot responses, cursor and clock.
///
/// Records are index-aligned with the questions and only change through the
/// navigation methods below.
#[derive(Debug, Clone)]
pub struct ExamSession {
    questions: Vec<Question>,
    responses: Vec<ResponseRecord>,
    current_index: usize,
    countdown: Countdown,
}

impl ExamSession {
    /// Start a session. The cursor starts on slot 0, which counts as a visit.
    pub fn new(questions: Vec<Question>, duration: Duration) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }

        let mut session = Self {
            responses: fresh_responses(&questions),
            questions,
            current_index: 0,
            countdown: Countdown::new(duration),
        };
        session.visit(0);
        Ok(session)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn responses(&self) -> &[ResponseRecord] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question_number(&self) -> usize {
        self.current_index + 1
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn current_response(&self) -> &ResponseRecord {
        &self.responses[self.current_index]
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn response(&self, index: usize) -> Result<&ResponseRecord, SessionError> {
        self.check_slot(index)?;
        Ok(&self.responses[index])
    }

    pub fn is_answered(&self, index: usize) -> Result<bool, SessionError> {
        self.check_slot(index)?;
        Ok(self.slot_answered(index))
    }

    /// Capture an answer for a slot without touching its status.
    ///
    /// A payload that does not fit the question type, or an option index past
    /// the question's options, is ignored.
    pub fn record_answer(&mut self, index: usize, input: AnswerInput) -> Result<(), SessionError> {
        self.check_slot(index)?;
        let question = &self.questions[index];
        let question_type = question.question_type();
        let option_count = question.options().len();
        let record = &mut self.responses[index];

        match (question_type, input) {
            (QuestionType::Mcq | QuestionType::Match, AnswerInput::Option(option))
                if option < option_count =>
            {
                record.selected_option = Some(option);
            }
            (QuestionType::Msq, AnswerInput::Option(option)) if option < option_count => {
                record.toggle_option(option);
            }
            (QuestionType::Nat, AnswerInput::Numeric(value)) => {
                record.numerical_value = value;
            }
            (question_type, input) => {
                log::warn!(
                    "ignoring {:?} for {} question in slot {}",
                    input,
                    question_type.label(),
                    index
                );
            }
        }

        Ok(())
    }

    /// Commit the current slot and move on.
    pub fn save_and_next(&mut self) {
        let status = if self.slot_answered(self.current_index) {
            ResponseStatus::Answered
        } else {
            ResponseStatus::NotAnswered
        };
        self.responses[self.current_index].status = status;
        self.advance();
    }

    /// Flag the current slot for review and move on.
    pub fn mark_for_review(&mut self) {
        let status = if self.slot_answered(self.current_index) {
            ResponseStatus::AnsweredAndMarked
        } else {
            ResponseStatus::MarkedForReview
        };
        self.responses[self.current_index].status = status;
        self.advance();
    }

    pub fn clear_response(&mut self, index: usize) -> Result<(), SessionError> {
        self.check_slot(index)?;
        let record = &mut self.responses[index];
        record.clear_payload();
        record.status = ResponseStatus::NotAnswered;
        Ok(())
    }

    /// Palette click.
    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.check_slot(index)?;
        self.current_index = index;
        self.visit(index);
        Ok(())
    }

    pub fn next(&mut self) {
        self.advance();
    }

    pub fn previous(&mut self) {
        if self.current_index > 0 {
            self.current_index -= 1;
            self.visit(self.current_index);
        }
    }

    /// Advance the clock by one second.
    pub fn tick(&mut self) {
        self.countdown.tick();
    }

    pub fn is_time_up(&self) -> bool {
        self.countdown.is_expired()
    }

    /// Retake with the same questions: fresh records, cursor 0, full clock.
    pub fn restart(&mut self) {
        self.responses = fresh_responses(&self.questions);
        self.current_index = 0;
        self.countdown.reset();
        self.visit(0);
    }

    /// Slot counts per status, for the palette legend.
    pub fn status_summary(&self) -> HashMap<ResponseStatus, usize> {
        let mut summary: HashMap<ResponseStatus, usize> =
            ResponseStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for record in &self.responses {
            *summary.entry(record.status).or_default() += 1;
        }
        summary
    }

    pub fn submit(&self) -> ScoreReport {
        scoring::score(&self.questions, &self.responses)
    }

    fn advance(&mut self) {
        if !self.is_last() {
            self.current_index += 1;
            self.visit(self.current_index);
        }
    }

    fn visit(&mut self, index: usize) {
        let record = &mut self.responses[index];
        if record.status == ResponseStatus::NotVisited {
            record.status = ResponseStatus::NotAnswered;
        }
    }

    fn slot_answered(&self, index: usize) -> bool {
        self.responses[index].is_answered(self.questions[index].question_type())
    }

    fn check_slot(&self, index: usize) -> Result<(), SessionError> {
        if index < self.questions.len() {
            Ok(())
        } else {
            Err(SessionError::InvalidSlotIndex {
                index,
                len: self.questions.len(),
            })
        }
    }
}

fn fresh_responses(questions: &[Question]) -> Vec<ResponseRecord> {
    questions
        .iter()
        .map(|question| ResponseRecord::new(question.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::{Difficulty, QuestionKind};

    fn question(id: u64, kind: QuestionKind) -> Question {
        Question {
            id,
            subject: "Common Part".to_string(),
            text: format!("Question {}", id),
            kind,
            difficulty: Difficulty::Medium,
            explanation: String::new(),
        }
    }

    fn options() -> Vec<String> {
        vec!["A".into(), "B".into(), "C".into(), "D".into()]
    }

    fn mixed_session() -> ExamSession {
        let questions = vec![
            question(
                1,
                QuestionKind::Mcq {
                    options: options(),
                    correct_answer: 1,
                },
            ),
            question(
                2,
                QuestionKind::Msq {
                    options: options(),
                    correct_answer: BTreeSet::from([0, 2]),
                },
            ),
            question(
                3,
                QuestionKind::Nat {
                    correct_answer: "12.5".into(),
                },
            ),
            question(
                4,
                QuestionKind::Match {
                    options: options(),
                    correct_answer: 3,
                },
            ),
        ];
        ExamSession::new(questions, Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn test_new_session_visits_first_slot_only() {
        let session = mixed_session();
        let statuses: Vec<_> = session.responses().iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                ResponseStatus::NotAnswered,
                ResponseStatus::NotVisited,
                ResponseStatus::NotVisited,
                ResponseStatus::NotVisited,
            ]
        );
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn test_empty_session_rejected() {
        assert_eq!(
            ExamSession::new(Vec::new(), Duration::from_secs(1)).unwrap_err(),
            SessionError::NoQuestions
        );
    }

    #[test]
    fn test_visited_slot_never_returns_to_not_visited() {
        let mut session = mixed_session();
        session.jump_to(2).unwrap();
        assert_eq!(session.response(2).unwrap().status, ResponseStatus::NotAnswered);

        session.jump_to(0).unwrap();
        session.clear_response(2).unwrap();
        session.next();
        session.next();
        session.previous();
        for index in [0, 1, 2] {
            assert_ne!(
                session.response(index).unwrap().status,
                ResponseStatus::NotVisited
            );
        }
        assert_eq!(session.response(3).unwrap().status, ResponseStatus::NotVisited);
    }

    #[test]
    fn test_record_answer_by_type() {
        let mut session = mixed_session();

        session.record_answer(0, AnswerInput::Option(2)).unwrap();
        session.record_answer(0, AnswerInput::Option(1)).unwrap();
        assert_eq!(session.response(0).unwrap().selected_option, Some(1));

        session.record_answer(1, AnswerInput::Option(0)).unwrap();
        session.record_answer(1, AnswerInput::Option(2)).unwrap();
        session.record_answer(1, AnswerInput::Option(0)).unwrap();
        assert_eq!(
            session.response(1).unwrap().selected_options,
            BTreeSet::from([2])
        );

        session
            .record_answer(2, AnswerInput::Numeric(" 12.50 ".into()))
            .unwrap();
        assert_eq!(session.response(2).unwrap().numerical_value, " 12.50 ");

        // status is untouched by answer capture
        assert_eq!(session.response(1).unwrap().status, ResponseStatus::NotVisited);
    }

    #[test]
    fn test_record_answer_ignores_wrong_payload() {
        let mut session = mixed_session();
        session
            .record_answer(0, AnswerInput::Numeric("3".into()))
            .unwrap();
        session.record_answer(2, AnswerInput::Option(1)).unwrap();
        assert_eq!(session.response(0).unwrap(), &ResponseRecord {
            status: ResponseStatus::NotAnswered,
            ..ResponseRecord::new(1)
        });
        assert!(session.response(2).unwrap().selected_option.is_none());
    }

    #[test]
    fn test_record_answer_ignores_unknown_option() {
        let mut session = mixed_session();
        session.record_answer(0, AnswerInput::Option(4)).unwrap();
        session.record_answer(1, AnswerInput::Option(7)).unwrap();
        session.record_answer(3, AnswerInput::Option(3)).unwrap();

        assert!(session.response(0).unwrap().selected_option.is_none());
        assert!(session.response(1).unwrap().selected_options.is_empty());
        assert!(!session.is_answered(0).unwrap());
        assert!(!session.is_answered(1).unwrap());
        assert_eq!(session.response(3).unwrap().selected_option, Some(3));
    }

    #[test]
    fn test_msq_toggle_is_involution() {
        let mut session = mixed_session();
        session.record_answer(1, AnswerInput::Option(3)).unwrap();
        let before = session.response(1).unwrap().selected_options.clone();
        for _ in 0..2 {
            session.record_answer(1, AnswerInput::Option(1)).unwrap();
        }
        assert_eq!(session.response(1).unwrap().selected_options, before);
    }

    #[test]
    fn test_save_and_next_sets_status_from_answer() {
        let mut session = mixed_session();
        session.save_and_next();
        assert_eq!(session.response(0).unwrap().status, ResponseStatus::NotAnswered);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.response(1).unwrap().status, ResponseStatus::NotAnswered);

        session.record_answer(1, AnswerInput::Option(0)).unwrap();
        session.save_and_next();
        assert_eq!(session.response(1).unwrap().status, ResponseStatus::Answered);
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn test_save_and_next_on_last_slot_stays() {
        let mut session = mixed_session();
        session.jump_to(3).unwrap();
        session.record_answer(3, AnswerInput::Option(3)).unwrap();
        session.save_and_next();
        assert_eq!(session.current_index(), 3);
        assert_eq!(session.response(3).unwrap().status, ResponseStatus::Answered);
    }

    #[test]
    fn test_mark_for_review() {
        let mut session = mixed_session();
        session.mark_for_review();
        assert_eq!(
            session.response(0).unwrap().status,
            ResponseStatus::MarkedForReview
        );

        session
            .record_answer(1, AnswerInput::Option(2))
            .unwrap();
        session.mark_for_review();
        assert_eq!(
            session.response(1).unwrap().status,
            ResponseStatus::AnsweredAndMarked
        );
        assert_eq!(session.current_index(), 2);

        // re-saving an answered+marked slot unmarks it
        session.jump_to(1).unwrap();
        session.save_and_next();
        assert_eq!(session.response(1).unwrap().status, ResponseStatus::Answered);
    }

    #[test]
    fn test_clear_response_from_any_status() {
        let mut session = mixed_session();
        session.record_answer(0, AnswerInput::Option(1)).unwrap();
        session.mark_for_review();
        session.jump_to(0).unwrap();
        session.clear_response(0).unwrap();
        assert_eq!(
            session.response(0).unwrap(),
            &ResponseRecord {
                status: ResponseStatus::NotAnswered,
                ..ResponseRecord::new(1)
            }
        );
        assert_eq!(session.current_index(), 0);

        // a slot that was never visited also lands on NotAnswered
        session.clear_response(3).unwrap();
        assert_eq!(session.response(3).unwrap().status, ResponseStatus::NotAnswered);
    }

    #[test]
    fn test_previous_and_next_are_clamped() {
        let mut session = mixed_session();
        session.previous();
        assert_eq!(session.current_index(), 0);

        session.jump_to(3).unwrap();
        session.record_answer(3, AnswerInput::Option(0)).unwrap();
        session.save_and_next();
        session.next();
        assert_eq!(session.current_index(), 3);
        assert_eq!(session.response(3).unwrap().status, ResponseStatus::Answered);
    }

    #[test]
    fn test_out_of_range_slot() {
        let mut session = mixed_session();
        let err = SessionError::InvalidSlotIndex { index: 4, len: 4 };
        assert_eq!(session.jump_to(4).unwrap_err(), err);
        assert_eq!(session.clear_response(4).unwrap_err(), err);
        assert_eq!(
            session.record_answer(4, AnswerInput::Option(0)).unwrap_err(),
            err
        );
        assert_eq!(session.is_answered(4).unwrap_err(), err);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = mixed_session();
        session.record_answer(0, AnswerInput::Option(1)).unwrap();
        session.save_and_next();
        session.mark_for_review();
        session.tick();

        session.restart();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.countdown().remaining_secs(), 60);
        let summary = session.status_summary();
        assert_eq!(summary[&ResponseStatus::NotAnswered], 1);
        assert_eq!(summary[&ResponseStatus::NotVisited], 3);
        assert_eq!(summary[&ResponseStatus::Answered], 0);
    }

    #[test]
    fn test_clock_runs_down_without_submitting() {
        let questions = vec![question(
            1,
            QuestionKind::Nat {
                correct_answer: "1".into(),
            },
        )];
        let mut session = ExamSession::new(questions, Duration::from_secs(1)).unwrap();
        session.tick();
        session.tick();
        assert!(session.is_time_up());
        session
            .record_answer(0, AnswerInput::Numeric("1".into()))
            .unwrap();
        assert_eq!(session.submit().score, 1);
    }
}
