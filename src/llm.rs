use std::time::Duration;

use async_trait::async_trait;
use reqwest::{ClientBuilder, StatusCode};
use serde::Serialize;

use crate::error::{AppError, Result};

const CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const MODEL: &str = "openai/gpt-oss-20b";

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

/// Capability: produce a summary of `text`, authorized by `credential`.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, credential: &str) -> Result<String>;
}

/// Chat-completions client for Groq's OpenAI-compatible API.
///
/// Holds no credential; the key travels with each call and is never cached.
pub struct GroqClient {
    timeout: Duration,
}

impl GroqClient {
    pub fn new(timeout: Duration) -> Self {
        GroqClient { timeout }
    }
}

#[async_trait]
impl Summarizer for GroqClient {
    async fn summarize(&self, text: &str, credential: &str) -> Result<String> {
        // Checked again here even though validation runs first; this client
        // must never issue an unauthenticated call.
        if credential.trim().is_empty() {
            return Err(AppError::Authentication("API key is empty".to_string()));
        }

        let client = ClientBuilder::new()
            .timeout(self.timeout)
            .build()
            .map_err(|e| AppError::RemoteService(format!("Failed to build HTTP client: {}", e)))?;

        let body = ChatRequest {
            model: MODEL.into(),
            messages: vec![Message {
                role: "user".into(),
                content: build_prompt(text),
            }],
        };

        let response = client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(credential)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::RemoteService(format!("Request to model provider failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Authentication(format!(
                "Model provider rejected the API key (HTTP {})",
                status
            )));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteService(format!(
                "Model provider returned HTTP {}: {}",
                status,
                detail.trim()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::RemoteService(format!("Malformed provider response: {}", e)))?;

        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AppError::Model("Response contained no generated text".to_string()))?
            .to_string();

        if reply.trim().is_empty() {
            return Err(AppError::Model("Model returned empty output".to_string()));
        }

        // Returned verbatim; the 300-word target is advisory to the model.
        Ok(reply)
    }
}

pub fn build_prompt(content: &str) -> String {
    let mut prompt = String::with_capacity(content.len() + 100);
    prompt.push_str(
        "Provide a clear and concise summary of the following content in about 300 words.\n\nContent:\n",
    );
    prompt.push_str(content);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_interpolates_content() {
        let prompt = build_prompt("Hello world.");
        assert!(prompt.contains("about 300 words"));
        assert!(prompt.ends_with("Content:\nHello world."));
    }

    #[tokio::test]
    async fn empty_credential_fails_before_any_request() {
        let client = GroqClient::new(Duration::from_secs(1));
        let err = client.summarize("some text", "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }
}
