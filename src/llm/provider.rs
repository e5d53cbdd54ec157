//! Provider-agnostic completion types and the `LlmProvider` trait.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::LlmError;

/// Role of a chat message. Classification only ever sends user turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A single chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Other(String),
}

impl FinishReason {
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            Some("stop") | None => Self::Stop,
            Some("length") => Self::Length,
            Some("content_filter") => Self::ContentFilter,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

/// One candidate completion.
#[derive(Debug, Clone)]
pub struct CompletionChoice {
    /// Generated text; `None` when the provider returned no content.
    pub content: Option<String>,
    pub finish_reason: FinishReason,
}

/// A completion response. Choices keep the provider's order.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl CompletionResponse {
    /// Text of the first choice, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.content.as_deref())
    }
}

/// A text-generation backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier sent with every request.
    fn model_name(&self) -> &str;

    /// Run a single completion request.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_bounds() {
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")])
            .with_max_tokens(10)
            .with_temperature(0.0);
        assert_eq!(request.max_tokens, Some(10));
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.messages[0].role, Role::User);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::user("x")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "x");
    }

    #[test]
    fn first_text_uses_first_choice_only() {
        let response = CompletionResponse {
            choices: vec![
                CompletionChoice {
                    content: Some("marketing-pitch".into()),
                    finish_reason: FinishReason::Stop,
                },
                CompletionChoice {
                    content: Some("founder-sourcing".into()),
                    finish_reason: FinishReason::Stop,
                },
            ],
            input_tokens: 0,
            output_tokens: 0,
        };
        assert_eq!(response.first_text(), Some("marketing-pitch"));
    }

    #[test]
    fn first_text_empty_choices() {
        let response = CompletionResponse {
            choices: vec![],
            input_tokens: 0,
            output_tokens: 0,
        };
        assert_eq!(response.first_text(), None);
    }

    #[test]
    fn finish_reason_from_wire() {
        assert_eq!(FinishReason::from_wire(Some("length")), FinishReason::Length);
        assert_eq!(FinishReason::from_wire(None), FinishReason::Stop);
        assert_eq!(
            FinishReason::from_wire(Some("tool_calls")),
            FinishReason::Other("tool_calls".into())
        );
    }
}
