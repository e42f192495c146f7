//! Generative-AI collaborators: the Gemini HTTP client, the question
//! generator built on it, and the chat assistant.

mod chat;
mod client;
mod generator;

use thiserror::Error;

pub use chat::{
    COURSES_URL, ChatAssistant, ChatMessage, ChatReply, ChatRole, QuickAction,
    detect_quick_action,
};
pub use client::{
    Content, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_QUESTION_MODEL, GeminiClient,
    GeminiConfig, Part,
};
pub use generator::{GeminiQuestionGenerator, parse_generated_questions};

/// Errors from the generative-AI backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiError {
    #[error("generative AI API key is missing or invalid")]
    ConfigurationMissing,
    #[error("generative AI authentication failed: {0}")]
    Auth(String),
    #[error("generative AI request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("generative AI returned an empty response")]
    EmptyResponse,
    #[error("malformed generative AI payload: {0}")]
    Malformed(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Strip a surrounding Markdown code fence, if any.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // drop the language tag on the opening line
    match rest.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
    }
}
