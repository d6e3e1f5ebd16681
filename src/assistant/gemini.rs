//! Gemini `generateContent` over HTTP.

use super::{Content, LanguageModel, ModelError, ModelReply, ModelRequest, Part};
use crate::tools::{function_declarations, FunctionDeclaration};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    system_instruction: Content,
    tools: [ToolSet; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate are concatenated; function calls
    /// keep their order.
    fn into_reply(self) -> Result<ModelReply, ModelError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => Err(ModelError::Blocked(reason)),
                None => Ok(ModelReply::default()),
            };
        };
        let mut reply = ModelReply::default();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            let Part {
                text,
                function_call,
                ..
            } = part;
            if let Some(text) = text {
                reply.text.push_str(&text);
            }
            if let Some(call) = function_call {
                reply.function_calls.push(call);
            }
        }
        Ok(reply)
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    generation: GenerationConfig,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/{model}:generateContent", base_url.trim_end_matches('/')),
            generation: GenerationConfig::default(),
        })
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    #[instrument(skip_all, fields(contents = request.contents.len()))]
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, ModelError> {
        let body = GenerateContentRequest {
            contents: &request.contents,
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(request.system_instruction.clone())],
            },
            tools: [ToolSet {
                function_declarations: function_declarations(),
            }],
            generation_config: self.generation,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            warn!(status, "Gemini call failed");
            return Err(ModelError::Status { status, body });
        }

        let reply = resp.json::<GenerateContentResponse>().await?.into_reply()?;
        debug!(
            text_len = reply.text.len(),
            calls = reply.function_calls.len(),
            "Gemini reply"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<ModelReply, ModelError> {
        serde_json::from_value::<GenerateContentResponse>(value)
            .unwrap()
            .into_reply()
    }

    #[test]
    fn test_reply_collects_text_and_calls_in_order() {
        let reply = parse(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Con gusto. "},
                        {"functionCall": {"name": "addToOrder", "args": {"itemId": "tiramisu", "quantity": 1}}},
                        {"functionCall": {"name": "getOrderSummary", "args": {}}},
                        {"text": "Listo."}
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(reply.text, "Con gusto. Listo.");
        let names: Vec<_> = reply.function_calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["addToOrder", "getOrderSummary"]);
        assert_eq!(reply.function_calls[0].args["itemId"], "tiramisu");
    }

    #[test]
    fn test_blocked_prompt_is_an_error() {
        let reply = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert_eq!(reply, Err(ModelError::Blocked("SAFETY".to_string())));
    }

    #[test]
    fn test_request_body_shape() {
        let contents = vec![Content::user_text("hola")];
        let body = GenerateContentRequest {
            contents: &contents,
            system_instruction: Content {
                role: None,
                parts: vec![Part::text("be nice")],
            },
            tools: [ToolSet {
                function_declarations: function_declarations(),
            }],
            generation_config: GenerationConfig::default(),
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["systemInstruction"], json!({"parts": [{"text": "be nice"}]}));
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(value["tools"][0]["functionDeclarations"][0]["name"], "addToOrder");
    }
}
