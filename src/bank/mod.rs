//! Question bank provider: remote generation with a static fallback.

mod fallback;
mod provider;

pub use fallback::builtin_questions;
pub use provider::{
    BankError, DEFAULT_GENERATION_TIMEOUT, QUESTIONS_PER_EXAM, QuestionBank, QuestionSource,
};
