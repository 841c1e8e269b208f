//! Cohere chat API client implementing the text-generation port.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::text_generation::TextGenerationPort,
    infra::http_client::build_client,
};

#[derive(Clone)]
pub struct CohereClient {
    client: Client,
    api_url: Url,
    api_key: SecretString,
    model: String,
}

impl CohereClient {
    pub fn new(api_url: Url, api_key: SecretString, model: String) -> Self {
        Self {
            client: build_client(),
            api_url,
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Vec<ContentBlock>,
}

/// Non-text blocks (tool calls etc.) deserialize with `text: None`.
#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[async_trait]
impl TextGenerationPort for CohereClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.api_url.clone())
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Cohere request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Cohere returned {status}: {body}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Cohere response parse failed: {e}")))?;

        chat.message
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| AppError::Internal("Cohere reply had no text content".into()))
    }
}
