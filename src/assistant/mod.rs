//! # Language Model
//!
//! The chat front-end talks to the model through [`LanguageModel`]. Calls
//! are stateless: every turn sends the system prompt plus the whole
//! conversation, rebuilt from the stored transcript by [`transcript`].
//!
//! - [`gemini`] - [`GeminiClient`], the production model over HTTP
//! - [`prompt`] - the system prompt
//! - [`transcript`] - stored messages to model contents
//! - [`mock`] - [`ScriptedModel`](mock::ScriptedModel) for tests
//! - [`error`] - [`ModelError`]

pub mod error;
pub mod gemini;
pub mod mock;
pub mod prompt;
pub mod transcript;

pub use error::ModelError;
pub use gemini::GeminiClient;
pub use prompt::SystemPrompt;

use crate::model::ToolInvocation;
use crate::tools::FunctionCall;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, ModelError>;
}

/// Used when no model credentials are configured; every call fails with
/// [`ModelError::NotConfigured`].
pub struct Unconfigured;

#[async_trait]
impl LanguageModel for Unconfigured {
    async fn generate(&self, _request: &ModelRequest) -> Result<ModelReply, ModelError> {
        Err(ModelError::NotConfigured)
    }
}

/// Everything the model sees for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub system_instruction: String,
    pub contents: Vec<Content>,
}

/// What came back: free text and the function calls, in emitted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: String,
    pub function_calls: Vec<FunctionCall>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            function_calls: Vec::new(),
        }
    }

    pub fn calls(function_calls: Vec<FunctionCall>) -> Self {
        Self {
            text: String::new(),
            function_calls,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    User,
    Model,
}

/// One turn of the conversation as the model sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ContentRole>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some(ContentRole::User),
            parts: vec![Part::text(text)],
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Some(ContentRole::Model),
            parts: vec![Part::text(text)],
        }
    }

    /// The model turn that asked for `calls`.
    pub fn function_calls<'a>(calls: impl IntoIterator<Item = &'a FunctionCall>) -> Self {
        Self {
            role: Some(ContentRole::Model),
            parts: calls
                .into_iter()
                .map(|call| Part {
                    function_call: Some(call.clone()),
                    ..Part::default()
                })
                .collect(),
        }
    }

    /// A single user turn carrying every function result.
    pub fn function_responses<'a>(results: impl IntoIterator<Item = &'a ToolInvocation>) -> Self {
        Self {
            role: Some(ContentRole::User),
            parts: results
                .into_iter()
                .map(|invocation| Part {
                    function_response: Some(FunctionResponse {
                        name: invocation.name.clone(),
                        response: invocation.result.clone(),
                    }),
                    ..Part::default()
                })
                .collect(),
        }
    }
}

/// Exactly one of the fields is set on a well-formed part. Unknown fields
/// sent by the vendor are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}
