use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use env_logger::{Env, Target};
use mock_exam::ai::{ChatAssistant, GeminiClient, GeminiQuestionGenerator};
use mock_exam::bank::{QuestionBank, builtin_questions};
use mock_exam::config::Config;
use mock_exam::logbook::InteractionLog;
use mock_exam::{App, ExamError, MockExam, load_questions_from_json};

/// The UI owns the terminal, so diagnostics go to a file.
fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
        .map_err(std::io::Error::other)
}

async fn run(config: Config) -> Result<(), ExamError> {
    let interactions = Arc::new(InteractionLog::default());
    let mut app = App::new(config.exam_duration());

    let client = match GeminiClient::new(config.gemini()) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            log::warn!("running without generative AI: {}", err);
            app.set_notice(
                "AI features are offline (set GEMINI_API_KEY). Exams use the static question bank.",
            );
            None
        }
    };

    let fallback = match &config.bank {
        Some(path) => load_questions_from_json(path)?,
        None => builtin_questions(),
    };
    let mut bank = QuestionBank::new(fallback).with_timeout(config.request_timeout());
    if let Some(client) = &client {
        bank = bank.with_source(Box::new(GeminiQuestionGenerator::new(Arc::clone(client))));
    }

    let assistant = ChatAssistant::new(client, interactions.clone());

    log::info!(
        "starting mock exam (duration {:?}, generator {})",
        config.exam_duration(),
        if bank.has_source() { "on" } else { "off" }
    );

    MockExam::new(app, bank, assistant, interactions, config.transcript)
        .run()
        .await
}

#[tokio::main]
async fn main() {
    let config = Config::parse();

    if let Err(e) = init_logging(&config.log_file) {
        eprintln!("Logging disabled: {}", e);
    }

    if let Err(e) = run(config).await {
        eprintln!("Error running mock exam: {}", e);
        std::process::exit(1);
    }
}
