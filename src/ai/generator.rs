use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::bank::{QUESTIONS_PER_EXAM, QuestionSource};
use crate::models::{Difficulty, Question, QuestionKind, QuestionType};

use super::{AiError, Content, GeminiClient, strip_code_fence};

#[derive(Debug, Deserialize)]
struct GeneratedPayload {
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedQuestion {
    text: String,
    #[serde(rename = "type")]
    question_type: QuestionType,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: Value,
    #[serde(default)]
    explanation: String,
}

/// `QuestionSource` backed by Gemini.
pub struct GeminiQuestionGenerator {
    client: Arc<GeminiClient>,
}

impl GeminiQuestionGenerator {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QuestionSource for GeminiQuestionGenerator {
    async fn generate(
        &self,
        subject: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, AiError> {
        let prompt = generation_prompt(subject, difficulty);
        let model = self.client.config().question_model.clone();
        let text = self
            .client
            .generate_content(&model, &[Content::user(prompt)], None, None)
            .await?;

        let id_base = chrono::Utc::now().timestamp_millis().max(0) as u64;
        parse_generated_questions(&text, subject, difficulty, id_base)
    }
}

fn generation_prompt(subject: &str, difficulty: Difficulty) -> String {
    format!(
        "Task: Generate {count} competitive-level architecture exam questions.\n\
         Subject: {subject}\n\
         Difficulty Level: {difficulty}\n\
         Standard: GATE Architecture / JEE B.Arch Paper 2 / NATA.\n\n\
         Favour conceptual depth and scenarios over recall. MCQ distractors must be \
         plausible misconceptions. Cover sustainability, building services, structural \
         systems, urban planning and contemporary architecture. Each explanation should \
         teach the underlying principle.\n\n\
         Return a JSON object {{\"questions\": [...]}} where each item has: \
         \"text\", \"type\" (one of MCQ, MSQ, NAT, MATCH), \"options\" (exactly 4 for \
         MCQ/MSQ/MATCH, omitted for NAT), \"correctAnswer\" (MCQ/MATCH: option index \
         0-3; MSQ: JSON array of indices like [0,2]; NAT: numerical string) and \
         \"explanation\".",
        count = QUESTIONS_PER_EXAM,
        subject = subject,
        difficulty = difficulty,
    )
}

/// Parse and validate a generated question payload.
///
/// `correctAnswer` is accepted as a number, an array, or a string holding
/// either. Ids are `id_base + index`; subject and difficulty come from the
/// request.
pub fn parse_generated_questions(
    text: &str,
    subject: &str,
    difficulty: Difficulty,
    id_base: u64,
) -> Result<Vec<Question>, AiError> {
    let payload: GeneratedPayload = serde_json::from_str(strip_code_fence(text))
        .map_err(|err| AiError::Malformed(err.to_string()))?;

    payload
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let id = id_base + index as u64;
            let kind = build_kind(raw.question_type, raw.options, &raw.correct_answer)
                .ok_or_else(|| {
                    AiError::Malformed(format!(
                        "question {} has an unusable correctAnswer {}",
                        index, raw.correct_answer
                    ))
                })?;

            let question = Question {
                id,
                subject: subject.to_string(),
                text: raw.text,
                kind,
                difficulty,
                explanation: raw.explanation,
            };
            question
                .validate()
                .map_err(|err| AiError::Malformed(err.to_string()))?;
            Ok(question)
        })
        .collect()
}

fn build_kind(
    question_type: QuestionType,
    options: Vec<String>,
    correct_answer: &Value,
) -> Option<QuestionKind> {
    let kind = match question_type {
        QuestionType::Mcq => QuestionKind::Mcq {
            correct_answer: answer_index(correct_answer)?,
            options,
        },
        QuestionType::Match => QuestionKind::Match {
            correct_answer: answer_index(correct_answer)?,
            options,
        },
        QuestionType::Msq => QuestionKind::Msq {
            correct_answer: answer_set(correct_answer)?,
            options,
        },
        QuestionType::Nat => QuestionKind::Nat {
            correct_answer: numeric_literal(correct_answer)?,
        },
    };
    Some(kind)
}

fn answer_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        Value::Array(items) if items.len() == 1 => answer_index(&items[0]),
        _ => None,
    }
}

fn answer_set(value: &Value) -> Option<BTreeSet<usize>> {
    match value {
        Value::Array(items) => items.iter().map(answer_index).collect(),
        Value::Number(_) => answer_index(value).map(|index| BTreeSet::from([index])),
        Value::String(s) => {
            let parsed: Value = serde_json::from_str(s.trim()).ok()?;
            match parsed {
                Value::String(_) => None,
                other => answer_set(&other),
            }
        }
        _ => None,
    }
}

fn numeric_literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
