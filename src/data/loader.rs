use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Question, QuestionError};

/// Error loading a static question bank file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} must contain at least one question", .0.display())]
    Empty(PathBuf),
    #[error("invalid question in {}: {}", .path.display(), .source)]
    Invalid {
        path: PathBuf,
        source: QuestionError,
    },
}

/// Load and validate a static question bank from a JSON array.
pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let questions: Vec<Question> =
        serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if questions.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    for question in &questions {
        question.validate().map_err(|source| LoadError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
    }

    log::info!("loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_bank(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_bank() {
        let file = write_bank(
            r#"[
                {"id": 1, "subject": "Physics", "text": "Pick", "type": "MCQ",
                 "options": ["a", "b"], "correct_answer": 1, "difficulty": "Easy",
                 "explanation": "b"},
                {"id": 2, "subject": "Physics", "text": "Pick all", "type": "MSQ",
                 "options": ["a", "b", "c"], "correct_answer": [0, 2], "difficulty": "Hard"}
            ]"#,
        );
        let questions = load_questions_from_json(file.path()).unwrap();
        assert_eq!(questions.len(), 2);
        assert!(questions[1].explanation.is_empty());
    }

    #[test]
    fn test_load_rejects_bad_banks() {
        let empty = write_bank("[]");
        assert!(matches!(
            load_questions_from_json(empty.path()),
            Err(LoadError::Empty(_))
        ));

        let garbage = write_bank("{not json");
        assert!(matches!(
            load_questions_from_json(garbage.path()),
            Err(LoadError::Parse { .. })
        ));

        let invalid = write_bank(
            r#"[{"id": 9, "subject": "Physics", "text": "?", "type": "MATCH",
                 "options": ["a"], "correct_answer": 4, "difficulty": "Medium"}]"#,
        );
        assert!(matches!(
            load_questions_from_json(invalid.path()),
            Err(LoadError::Invalid {
                source: QuestionError::AnswerOutOfRange { id: 9, .. },
                ..
            })
        ));

        assert!(matches!(
            load_questions_from_json("/definitely/not/here.json"),
            Err(LoadError::Io { .. })
        ));
    }
}
