use std::sync::Arc;

use serde::Deserialize;

use crate::logbook::InteractionLogger;

use super::{AiError, Content, GeminiClient, strip_code_fence};

pub const COURSES_URL: &str = "https://www.aerieacademy.com/courses";

const CHAT_TEMPERATURE: f32 = 0.7;
const LOG_CONTEXT: &str = "chatbot";

const FALLBACK_TEXT: &str = "Connection Error: I couldn't reach my brain. \
    Please check your internet connection or API key configuration.";
const FALLBACK_SUGGESTIONS: [&str; 2] = ["Retry", "Check Courses"];

const SYSTEM_INSTRUCTION: &str = "\
You are the academy's AI mentor for architecture entrance exams (GATE, NATA, JEE Paper 2).
Tone: optimistic, encouraging and technically precise.
1. Give expert advice on architectural history, structures, design and planning.
2. When the user talks about preparation, exams or subjects, recommend the paid courses at https://www.aerieacademy.com/courses.
3. Remind users they can take a free mock test right here.
Always answer with a JSON object: {\"text\": \"answer, **bold** allowed\", \"suggestions\": [\"up to three short follow-ups\"]}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub suggestions: Vec<String>,
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            suggestions: Vec::new(),
            is_error: false,
        }
    }

    pub fn model(reply: ChatReply) -> Self {
        Self {
            role: ChatRole::Model,
            text: reply.text,
            suggestions: reply.suggestions,
            is_error: reply.is_fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub text: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(skip)]
    pub is_fallback: bool,
}

impl ChatReply {
    /// Canned reply used whenever the backend cannot answer.
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_TEXT.to_string(),
            suggestions: FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            is_fallback: true,
        }
    }
}

/// Chat inputs handled locally instead of being sent to the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    StartMockTest,
    ViewCourses,
}

pub fn detect_quick_action(text: &str) -> Option<QuickAction> {
    let lower = text.to_lowercase();
    if lower.contains("take") && lower.contains("mock test") {
        Some(QuickAction::StartMockTest)
    } else if lower.contains("check out our courses") || lower.contains("view courses") {
        Some(QuickAction::ViewCourses)
    } else {
        None
    }
}

/// Chat front end for the assistant. Never fails: backend problems turn into
/// the canned fallback reply.
pub struct ChatAssistant {
    client: Option<Arc<GeminiClient>>,
    logger: Arc<dyn InteractionLogger>,
}

impl ChatAssistant {
    pub fn new(client: Option<Arc<GeminiClient>>, logger: Arc<dyn InteractionLogger>) -> Self {
        Self { client, logger }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn reply(&self, history: &[ChatMessage], message: &str) -> ChatReply {
        let reply = match &self.client {
            Some(client) => match request_reply(client, history, message).await {
                Ok(reply) => reply,
                Err(err) => {
                    log::warn!("chat request failed, using fallback reply: {}", err);
                    ChatReply::fallback()
                }
            },
            None => {
                log::warn!("chat requested without an API key, using fallback reply");
                ChatReply::fallback()
            }
        };

        let logged = if reply.is_fallback {
            "ERROR: fallback reply"
        } else {
            reply.text.as_str()
        };
        self.logger.record(message, logged, LOG_CONTEXT);
        reply
    }
}

async fn request_reply(
    client: &GeminiClient,
    history: &[ChatMessage],
    message: &str,
) -> Result<ChatReply, AiError> {
    let mut contents: Vec<Content> = history
        .iter()
        .filter(|m| !m.is_error)
        .map(|m| match m.role {
            ChatRole::User => Content::user(m.text.clone()),
            ChatRole::Model => Content::model(m.text.clone()),
        })
        .collect();
    contents.push(Content::user(message));

    let text = client
        .generate_content(
            &client.config().chat_model,
            &contents,
            Some(SYSTEM_INSTRUCTION),
            Some(CHAT_TEMPERATURE),
        )
        .await?;

    serde_json::from_str(strip_code_fence(&text)).map_err(|err| AiError::Malformed(err.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::ai::GeminiConfig;
    use crate::logbook::InteractionLog;

    async fn assistant_for(server: &MockServer, log: Arc<InteractionLog>) -> ChatAssistant {
        let client = GeminiClient::new(GeminiConfig {
            api_key: Some("test-key-123".into()),
            base_url: server.uri(),
            chat_model: "chat-model".into(),
            ..GeminiConfig::default()
        })
        .unwrap();
        ChatAssistant::new(Some(Arc::new(client)), log)
    }

    #[test]
    fn test_quick_actions() {
        assert_eq!(
            detect_quick_action("I want to TAKE a Mock Test"),
            Some(QuickAction::StartMockTest)
        );
        assert_eq!(
            detect_quick_action("View Courses"),
            Some(QuickAction::ViewCourses)
        );
        assert_eq!(detect_quick_action("what is a mock test?"), None);
    }

    #[tokio::test]
    async fn test_reply_sends_history_and_logs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/chat-model:generateContent"))
            .and(body_partial_json(json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "hi"}]},
                    {"role": "model", "parts": [{"text": "hello"}]},
                    {"role": "user", "parts": [{"text": "what is GATE?"}]}
                ],
                "generationConfig": {"temperature": 0.7}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{
                    "text": "{\"text\": \"An exam.\", \"suggestions\": [\"Take Gate Mock Test\"]}"
                }]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let log = Arc::new(InteractionLog::default());
        let assistant = assistant_for(&server, Arc::clone(&log)).await;
        let history = vec![
            ChatMessage::user("hi"),
            ChatMessage::model(ChatReply {
                text: "hello".into(),
                suggestions: Vec::new(),
                is_fallback: false,
            }),
            ChatMessage::model(ChatReply::fallback()),
        ];

        let reply = assistant.reply(&history, "what is GATE?").await;
        assert_eq!(reply.text, "An exam.");
        assert_eq!(reply.suggestions, vec!["Take Gate Mock Test".to_string()]);
        assert!(!reply.is_fallback);

        let transcript = log.snapshot();
        assert_eq!(transcript.history.len(), 1);
        assert_eq!(transcript.history[0].response, "An exam.");
        assert_eq!(transcript.history[0].context, "chatbot");
    }

    #[tokio::test]
    async fn test_reply_falls_back_on_bad_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "plain prose"}]}}]
            })))
            .mount(&server)
            .await;

        let log = Arc::new(InteractionLog::default());
        let assistant = assistant_for(&server, Arc::clone(&log)).await;
        let reply = assistant.reply(&[], "hello").await;
        assert_eq!(reply, ChatReply::fallback());
        assert_eq!(reply.suggestions.len(), 2);
        assert_eq!(log.snapshot().history[0].response, "ERROR: fallback reply");
    }

    #[tokio::test]
    async fn test_reply_without_client() {
        let log = Arc::new(InteractionLog::default());
        let assistant = ChatAssistant::new(None, log.clone());
        assert!(!assistant.is_configured());
        assert!(assistant.reply(&[], "hello").await.is_fallback);
        assert_eq!(log.len(), 1);
    }
}
