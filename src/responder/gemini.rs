// Gemini API responder
//
// Sends the conversation to the Gemini generateContent endpoint with the
// MindAura persona as the system instruction.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Responder;
use crate::config::GeminiConfig;
use crate::conversation::{ChatMessage, Role};

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const PERSONA_PROMPT: &str = "You are MindAura, an AI mental wellness companion. Your goal is to engage users in empathetic, non-judgmental, and reflective conversations. Your tone should be warm, calm, and encouraging.

You are not a therapist and you do not provide medical advice, diagnoses, or treatment. Your purpose is to help users understand their emotions, reflect on their thoughts, and find calmness through conversation.

Key behaviors:
- Active Listening: Reflect the user's message in your own words to show understanding.
- Open-Ended Questions: Encourage introspection.
- Emotional Validation: Acknowledge emotions clearly and compassionately.
- Gentle Encouragement: Support resilience without toxic positivity.
- Safety First: If a user expresses intent for self-harm or is in crisis, respond with empathy and provide a helpline resource, such as calling 988 or the local emergency number.

Keep your responses to 2-4 sentences. Use a gentle and slow-paced speaking style.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Responder backed by the Gemini REST API
#[derive(Clone)]
pub struct GeminiResponder {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiResponder {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    /// Build from config; `None` when no API key is configured
    pub fn from_config(config: &GeminiConfig) -> Result<Option<Self>> {
        match config.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(Some(Self::new(
                key.to_string(),
                config.base_url.clone(),
                config.model.clone(),
            )?)),
            _ => Ok(None),
        }
    }

    fn to_request<'a>(history: &'a [ChatMessage]) -> GenerateRequest<'a> {
        let contents = history
            .iter()
            .map(|m| Content {
                role: Some(match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                }),
                parts: vec![Part { text: &m.content }],
            })
            .collect();

        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: PERSONA_PROMPT,
                }],
            },
            contents,
        }
    }
}

#[async_trait]
impl Responder for GeminiResponder {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::to_request(history))
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, body);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.trim().is_empty())
            .context("Gemini API returned no text")?;

        tracing::debug!(model = %self.model, chars = text.len(), "Gemini reply received");
        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const PATH: &str = "/v1beta/models/gemini-test:generateContent";

    fn history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::user("I had a rough day"),
            ChatMessage::assistant("I'm sorry to hear that."),
            ChatMessage::user("work was a lot"),
        ]
    }

    #[test]
    fn test_request_shape() {
        let messages = history();
        let value = serde_json::to_value(GeminiResponder::to_request(&messages)).unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][2]["parts"][0]["text"], "work was a lot");
        assert!(value["systemInstruction"].get("role").is_none());
        assert!(value["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("You are MindAura"));
    }

    #[tokio::test]
    async fn test_reply_from_first_candidate() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::Regex(r#""role":"model""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"That sounds "},{"text":"heavy. "}]}}]}"#,
            )
            .create_async()
            .await;

        let responder =
            GeminiResponder::new("test-key".into(), server.url(), "gemini-test".into()).unwrap();
        let reply = responder.respond(&history()).await.unwrap();

        assert_eq!(reply, "That sounds heavy.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(429)
            .with_body("quota exceeded")
            .create_async()
            .await;

        let responder =
            GeminiResponder::new("k".into(), server.url(), "gemini-test".into()).unwrap();
        let err = responder.respond(&history()).await.unwrap_err();

        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let responder =
            GeminiResponder::new("k".into(), server.url(), "gemini-test".into()).unwrap();
        assert!(responder.respond(&history()).await.is_err());
    }

    #[test]
    fn test_from_config_without_key() {
        let config = GeminiConfig::default();
        assert!(GeminiResponder::from_config(&config).unwrap().is_none());
    }
}
