//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::ai::{DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_QUESTION_MODEL, GeminiConfig};

const MAX_DURATION_MINUTES: u64 = 24 * 60;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Terminal mock exam with an AI study assistant", long_about = None)]
pub struct Config {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Model used by the chat assistant
    #[arg(long, default_value = DEFAULT_CHAT_MODEL)]
    pub chat_model: String,

    /// Model used to generate exam questions
    #[arg(long, default_value = DEFAULT_QUESTION_MODEL)]
    pub question_model: String,

    /// JSON file replacing the built-in static question bank
    #[arg(short, long)]
    pub bank: Option<PathBuf>,

    /// Exam duration in minutes (1 to 1440)
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..=MAX_DURATION_MINUTES))]
    pub duration_minutes: u64,

    /// Timeout for each generative AI request, in seconds
    #[arg(long, default_value_t = 60)]
    pub request_timeout_secs: u64,

    /// File receiving diagnostic logs (the terminal is taken by the UI)
    #[arg(long, default_value = "mock-exam.log")]
    pub log_file: PathBuf,

    /// Where the chat transcript is exported
    #[arg(long, default_value = "exam_interactions.json")]
    pub transcript: PathBuf,
}

impl Config {
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            chat_model: self.chat_model.clone(),
            question_model: self.question_model.clone(),
            request_timeout: self.request_timeout(),
        }
    }

    pub fn exam_duration(&self) -> Duration {
        Duration::from_secs(self.duration_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
