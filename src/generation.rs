use axum::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation service error: {0}")]
    Api(String),

    #[error("generation request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("generation response contained no choices")]
    EmptyResponse,
}

/// Client for the external text-generation service. One prompt in, one text
/// blob out; `json_object` asks the service for a single structured JSON
/// object instead of free text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        json_object: bool,
    ) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        json_object: bool,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: json_object.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        debug!(%model, json_object, "sending generation request");
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(error_text));
        }

        let parsed = response.json::<ChatResponse>().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyResponse)?
            .message
            .content;
        Ok(content.trim().to_string())
    }
}
