use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::AiError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_QUESTION_MODEL: &str = "gemini-3-pro-preview";

const MIN_API_KEY_LEN: usize = 5;

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub question_model: String,
    pub request_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            question_model: DEFAULT_QUESTION_MODEL.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// One turn of a `generateContent` conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role("user", text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::with_role("model", text)
    }

    fn with_role(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }

    fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Client for Gemini's `generateContent` endpoint, JSON responses only.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Build a client, rejecting missing or placeholder API keys.
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| key.len() >= MIN_API_KEY_LEN && *key != "undefined")
            .ok_or(AiError::ConfigurationMissing)?
            .to_string();

        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send a conversation and return the concatenated reply text.
    pub async fn generate_content(
        &self,
        model: &str,
        contents: &[Content],
        system_instruction: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<String, AiError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );
        let payload = GenerateContentRequest {
            contents,
            system_instruction: system_instruction.map(|text| Content {
                role: None,
                parts: vec![Part {
                    text: Some(text.to_string()),
                }],
            }),
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature,
            },
        };

        log::debug!("POST {} ({} turns)", url, contents.len());

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let text = response.text().await.unwrap_or_default();
                return Err(AiError::Auth(text));
            }
            return Err(AiError::HttpStatus(status));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| AiError::Malformed(err.to_string()))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.text())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: Some("test-key-123".to_string()),
            base_url: base_url.to_string(),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn test_rejects_missing_keys() {
        for key in [None, Some(""), Some("   "), Some("undefined"), Some("abc")] {
            let config = GeminiConfig {
                api_key: key.map(str::to_string),
                ..GeminiConfig::default()
            };
            assert!(matches!(
                GeminiClient::new(config),
                Err(AiError::ConfigurationMissing)
            ));
        }
        assert!(GeminiClient::new(config(DEFAULT_BASE_URL)).is_ok());
    }

    #[tokio::test]
    async fn test_generate_content_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(query_param("key", "test-key-123"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "systemInstruction": {"parts": [{"text": "be nice"}]},
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "{\"text\":"}, {"text": "\"hi\"}"}]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(config(&server.uri())).unwrap();
        let text = client
            .generate_content("gemini-test", &[Content::user("hello")], Some("be nice"), Some(0.7))
            .await
            .unwrap();
        assert_eq!(text, "{\"text\":\"hi\"}");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/denied:generateContent"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/broken:generateContent"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/silent:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let client = GeminiClient::new(config(&server.uri())).unwrap();
        let contents = [Content::user("x")];

        match client.generate_content("denied", &contents, None, None).await {
            Err(AiError::Auth(text)) => assert_eq!(text, "bad key"),
            other => panic!("expected auth error, got {:?}", other),
        }
        assert!(matches!(
            client.generate_content("broken", &contents, None, None).await,
            Err(AiError::HttpStatus(StatusCode::INTERNAL_SERVER_ERROR))
        ));
        assert!(matches!(
            client.generate_content("silent", &contents, None, None).await,
            Err(AiError::EmptyResponse)
        ));
    }
}
