//! Scoring of a submitted exam.
//!
//! Pure functions over questions and response records. No partial credit.

use crate::models::{Question, QuestionKind, QuestionType, ResponseRecord};

const NO_ANSWER: &str = "No Answer";

/// Outcome for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub question_id: u64,
    pub correct: bool,
    pub answered: bool,
    pub marked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub verdicts: Vec<Verdict>,
    pub score: usize,
    pub total: usize,
}

impl ScoreReport {
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.score as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn marked_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.marked).count()
    }

    pub fn answered_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.answered).count()
    }

    /// Banner shown above the scorecard.
    pub fn affirmation(&self) -> &'static str {
        match self.score {
            5 => "UNSTOPPABLE! You've mastered this subject. Perfect Score!",
            4 => "EXCELLENT! You are almost there. Great architectural focus.",
            3 => "GOOD JOB! You can do better with a bit more technical practice.",
            2 => "STEADY PROGRESS. Focus more on theoretical depth.",
            _ => "KEEP GOING! Architecture is a journey. Review the explanations below.",
        }
    }
}

/// Whether a response matches the question's answer key.
///
/// NAT answers compare trimmed text exactly, so "12.50" does not match "12.5".
pub fn is_correct(question: &Question, response: &ResponseRecord) -> bool {
    match &question.kind {
        QuestionKind::Nat { correct_answer } => {
            response.numerical_value.trim() == correct_answer.trim()
        }
        QuestionKind::Msq { correct_answer, .. } => {
            response.selected_options.len() == correct_answer.len()
                && response
                    .selected_options
                    .iter()
                    .all(|index| correct_answer.contains(index))
        }
        QuestionKind::Mcq { correct_answer, .. } | QuestionKind::Match { correct_answer, .. } => {
            response.selected_option == Some(*correct_answer)
        }
    }
}

/// Score index-aligned questions and responses.
pub fn score(questions: &[Question], responses: &[ResponseRecord]) -> ScoreReport {
    let verdicts: Vec<Verdict> = questions
        .iter()
        .zip(responses.iter())
        .map(|(question, response)| Verdict {
            question_id: question.id,
            correct: is_correct(question, response),
            answered: response.is_answered(question.question_type()),
            marked: response.status.is_marked(),
        })
        .collect();

    ScoreReport {
        score: verdicts.iter().filter(|v| v.correct).count(),
        total: questions.len(),
        verdicts,
    }
}

pub fn format_correct_answer(question: &Question) -> String {
    match &question.kind {
        QuestionKind::Nat { correct_answer } => correct_answer.clone(),
        QuestionKind::Msq {
            options,
            correct_answer,
        } => join_options(options, correct_answer.iter().copied()),
        QuestionKind::Mcq {
            options,
            correct_answer,
        }
        | QuestionKind::Match {
            options,
            correct_answer,
        } => options
            .get(*correct_answer)
            .cloned()
            .unwrap_or_else(|| "None".to_string()),
    }
}

pub fn format_response(question: &Question, response: &ResponseRecord) -> String {
    let text = match question.question_type() {
        QuestionType::Nat => response.numerical_value.trim().to_string(),
        QuestionType::Msq => join_options(
            question.options(),
            response.selected_options.iter().copied(),
        ),
        _ => response
            .selected_option
            .and_then(|index| question.options().get(index).cloned())
            .unwrap_or_default(),
    };

    if text.is_empty() {
        NO_ANSWER.to_string()
    } else {
        text
    }
}

fn join_options(options: &[String], indices: impl Iterator<Item = usize>) -> String {
    indices
        .filter_map(|index| options.get(index).map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::{Difficulty, ResponseStatus};

    fn question(id: u64, kind: QuestionKind) -> Question {
        Question {
            id,
            subject: "Part B1".to_string(),
            text: String::new(),
            kind,
            difficulty: Difficulty::Hard,
            explanation: String::new(),
        }
    }

    fn mcq(id: u64, correct_answer: usize) -> Question {
        question(
            id,
            QuestionKind::Mcq {
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer,
            },
        )
    }

    fn msq(correct: &[usize]) -> Question {
        question(
            1,
            QuestionKind::Msq {
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: correct.iter().copied().collect(),
            },
        )
    }

    fn picked(id: u64, option: Option<usize>) -> ResponseRecord {
        ResponseRecord {
            selected_option: option,
            status: ResponseStatus::Answered,
            ..ResponseRecord::new(id)
        }
    }

    #[test]
    fn test_mcq_scorecard() {
        let questions: Vec<_> = [1, 1, 2, 1, 3]
            .iter()
            .enumerate()
            .map(|(i, answer)| mcq(i as u64, *answer))
            .collect();
        let responses: Vec<_> = [1, 0, 2, 1, 3]
            .iter()
            .enumerate()
            .map(|(i, selected)| picked(i as u64, Some(*selected)))
            .collect();

        let report = score(&questions, &responses);
        assert_eq!(report.score, 4);
        assert_eq!(report.total, 5);
        assert!(!report.verdicts[1].correct);
        assert!(report.verdicts.iter().enumerate().all(|(i, v)| v.correct == (i != 1)));
        assert_eq!(report.affirmation(), "EXCELLENT! You are almost there. Great architectural focus.");
        assert!((report.percentage() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_unanswered_mcq_never_matches() {
        assert!(!is_correct(&mcq(1, 0), &picked(1, None)));
    }

    #[test]
    fn test_msq_requires_exact_set() {
        let question = msq(&[0, 2]);
        let with = |selected: &[usize]| ResponseRecord {
            selected_options: selected.iter().copied().collect::<BTreeSet<_>>(),
            ..ResponseRecord::new(1)
        };

        assert!(is_correct(&question, &with(&[2, 0])));
        assert!(!is_correct(&question, &with(&[0])));
        assert!(!is_correct(&question, &with(&[0, 1, 2])));
        assert!(!is_correct(&question, &with(&[])));
    }

    #[test]
    fn test_nat_is_literal_match() {
        let question = question(
            1,
            QuestionKind::Nat {
                correct_answer: "12.5".into(),
            },
        );
        let typed = |value: &str| ResponseRecord {
            numerical_value: value.to_string(),
            ..ResponseRecord::new(1)
        };

        assert!(is_correct(&question, &typed("12.5")));
        assert!(is_correct(&question, &typed("  12.5 ")));
        assert!(!is_correct(&question, &typed("12.50")));
        assert!(!is_correct(&question, &typed("")));
    }

    #[test]
    fn test_score_is_stable_under_joint_reorder() {
        let questions = vec![mcq(1, 0), mcq(2, 1), msq(&[1, 3])];
        let mut msq_response = ResponseRecord::new(1);
        msq_response.selected_options = BTreeSet::from([3, 1]);
        let responses = vec![picked(1, Some(0)), picked(2, Some(0)), msq_response];

        let forward = score(&questions, &responses);
        assert_eq!(forward, score(&questions, &responses));

        let reversed_questions: Vec<_> = questions.iter().rev().cloned().collect();
        let reversed_responses: Vec<_> = responses.iter().rev().cloned().collect();
        let backward = score(&reversed_questions, &reversed_responses);
        assert_eq!(forward.score, 2);
        assert_eq!(backward.score, forward.score);
    }

    #[test]
    fn test_counts_and_formatting() {
        let question = msq(&[0, 2]);
        let mut response = ResponseRecord::new(1);
        assert_eq!(format_response(&question, &response), "No Answer");
        response.selected_options = BTreeSet::from([0, 3]);
        response.status = ResponseStatus::AnsweredAndMarked;
        assert_eq!(format_response(&question, &response), "A, D");
        assert_eq!(format_correct_answer(&question), "A, C");

        let report = score(&[question], &[response]);
        assert_eq!(report.marked_count(), 1);
        assert_eq!(report.answered_count(), 1);
        assert_eq!(report.score, 0);
        assert!(report.affirmation().starts_with("KEEP GOING"));
    }
}
