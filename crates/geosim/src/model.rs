//! Chat-completion model client
//!
//! One request per simulation: the fixed system instruction plus the
//! assembled prompt. No retry and no client-side timeout are applied; the
//! provider's own behaviour bounds the call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ModelConfig;

#[derive(Debug, Error)]
pub enum ModelError {
  #[error("Model request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Model provider returned {status}: {body}")]
  Provider { status: u16, body: String },
}

/// Messages for one completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
  pub system: String,
  pub prompt: String,
}

impl CompletionRequest {
  pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
    Self { system: system.into(), prompt: prompt.into() }
  }
}

/// Text generation seam, mocked in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
  /// Text of the first choice, or an empty string when the provider sent none
  async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError>;
}

// Wire Types
// ==========

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessage<'a>>,
  temperature: f32,
  max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  #[serde(default)]
  message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

fn first_choice_text(response: ChatResponse) -> String {
  response
    .choices
    .into_iter()
    .next()
    .and_then(|choice| choice.message)
    .and_then(|message| message.content)
    .unwrap_or_default()
}

// OpenAI-compatible Client
// ========================

pub struct OpenAiChatModel {
  client: reqwest::Client,
  endpoint: String,
  api_key: String,
  model: String,
  temperature: f32,
  max_tokens: u32,
}

impl OpenAiChatModel {
  pub fn new(config: &ModelConfig, api_key: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
      api_key: api_key.into(),
      model: config.model.clone(),
      temperature: config.temperature,
      max_tokens: config.max_tokens,
    }
  }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
  async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
    let body = ChatRequest {
      model: &self.model,
      messages: vec![
        ChatMessage { role: "system", content: &request.system },
        ChatMessage { role: "user", content: &request.prompt },
      ],
      temperature: self.temperature,
      max_tokens: self.max_tokens,
    };

    tracing::debug!(model = %self.model, prompt_chars = request.prompt.len(), "Sending completion request");

    let response = self.client.post(&self.endpoint).bearer_auth(&self.api_key).json(&body).send().await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ModelError::Provider { status: status.as_u16(), body });
    }

    let parsed: ChatResponse = response.json().await?;
    Ok(first_choice_text(parsed))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_first_choice_text_extracts_content() {
    let response: ChatResponse = serde_json::from_str(
      r#"{"choices":[{"message":{"role":"assistant","content":"{\"confidenceScore\":0.9}"}},{"message":{"content":"second"}}]}"#,
    )
    .unwrap();

    assert_eq!(first_choice_text(response), r#"{"confidenceScore":0.9}"#);
  }

  #[test]
  fn test_first_choice_text_is_empty_without_content() {
    let no_choices: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
    let null_content: ChatResponse =
      serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
    let missing: ChatResponse = serde_json::from_str(r#"{}"#).unwrap();

    assert_eq!(first_choice_text(no_choices), "");
    assert_eq!(first_choice_text(null_content), "");
    assert_eq!(first_choice_text(missing), "");
  }

  #[test]
  fn test_chat_request_shape() {
    let body = ChatRequest {
      model: "gpt-4",
      messages: vec![
        ChatMessage { role: "system", content: "sys" },
        ChatMessage { role: "user", content: "prompt" },
      ],
      temperature: 0.7,
      max_tokens: 3000,
    };
    let json = serde_json::to_value(&body).unwrap();

    assert_eq!(json["model"], "gpt-4");
    assert_eq!(json["messages"][1]["role"], "user");
    assert_eq!(json["max_tokens"], 3000);
  }

  #[test]
  fn test_endpoint_trims_trailing_slash() {
    let config = ModelConfig { base_url: "https://api.example.com/v1/".to_string(), ..ModelConfig::default() };
    let model = OpenAiChatModel::new(&config, "key");
    assert_eq!(model.endpoint, "https://api.example.com/v1/chat/completions");
  }
}
