//! In-memory record of user/assistant interactions.
//!
//! One `InteractionLog` is created per app instance and handed to the
//! components that talk to the assistant. It is only written to disk when the
//! user asks for an export.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_PLATFORM: &str = "Mock Exam Terminal";

/// Sink for prompt/response pairs.
pub trait InteractionLogger: Send + Sync {
    fn record(&self, prompt: &str, response: &str, context: &str);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEntry {
    pub timestamp: DateTime<Utc>,
    pub prompt: String,
    pub response: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub platform: String,
    pub history: Vec<InteractionEntry>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No conversation history to export yet.")]
    Empty,
    #[error("failed to serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write transcript: {0}")]
    Io(#[from] io::Error),
}

pub struct InteractionLog {
    transcript: Mutex<Transcript>,
}

impl InteractionLog {
    pub fn new(platform: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            transcript: Mutex::new(Transcript {
                session_id: Uuid::new_v4(),
                started_at: now,
                last_updated: now,
                platform: platform.into(),
                history: Vec::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Transcript {
        self.lock().clone()
    }

    /// Write the transcript as pretty JSON. Returns the number of entries.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<usize, ExportError> {
        let transcript = self.snapshot();
        if transcript.history.is_empty() {
            return Err(ExportError::Empty);
        }

        let json = serde_json::to_string_pretty(&transcript)?;
        fs::write(path.as_ref(), json)?;
        log::info!(
            "exported {} interactions to {}",
            transcript.history.len(),
            path.as_ref().display()
        );
        Ok(transcript.history.len())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InteractionLog {
    fn default() -> Self {
        Self::new(DEFAULT_PLATFORM)
    }
}

impl InteractionLogger for InteractionLog {
    fn record(&self, prompt: &str, response: &str, context: &str) {
        let entry = InteractionEntry {
            timestamp: Utc::now(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            context: context.to_string(),
        };
        log::debug!("interaction [{}]: {:?} -> {:?}", context, prompt, response);

        let mut transcript = self.lock();
        transcript.last_updated = entry.timestamp;
        transcript.history.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_export() {
        let log = InteractionLog::default();
        assert!(log.is_empty());
        log.record("What is a flying buttress?", "An external support.", "chatbot");
        log.record("Thanks", "Anytime!", "chatbot");
        assert_eq!(log.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.json");
        assert_eq!(log.export(&path).unwrap(), 2);

        let written: Transcript =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, log.snapshot());
        assert_eq!(written.platform, DEFAULT_PLATFORM);
        assert_eq!(written.history[0].prompt, "What is a flying buttress?");
        assert_eq!(written.last_updated, written.history[1].timestamp);
    }

    #[test]
    fn test_export_refuses_empty_log() {
        let log = InteractionLog::new("test");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.json");
        assert!(matches!(log.export(&path), Err(ExportError::Empty)));
        assert!(!path.exists());
    }

    #[test]
    fn test_logs_are_independent() {
        let first = InteractionLog::default();
        let second = InteractionLog::default();
        first.record("a", "b", "chatbot");
        assert_eq!(second.len(), 0);
        assert_ne!(first.snapshot().session_id, second.snapshot().session_id);
    }
}
