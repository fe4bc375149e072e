//! Wire types of the chat-completion contract

use serde::{Deserialize, Serialize};

use crate::models::Message;

/// Request body sent to the generation service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionPayload {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// Set by the gateway according to the invocation mode
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    #[must_use]
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

/// Batch response envelope; only the first choice is used
#[derive(Debug, Deserialize)]
pub(crate) struct CompletionEnvelope {
    pub choices: Vec<EnvelopeChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeChoice {
    pub message: EnvelopeMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeMessage {
    pub content: Option<String>,
}

/// One streamed `data:` payload
#[derive(Debug, Serialize, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: StreamDelta,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StreamDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl StreamChunk {
    /// Chunk carrying a single content token
    pub fn token(content: impl Into<String>) -> Self {
        Self {
            choices: vec![StreamChoice {
                delta: StreamDelta {
                    content: Some(content.into()),
                },
            }],
        }
    }

    /// Incremental content of the first choice, if any
    #[must_use]
    pub fn into_token(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
    }
}
