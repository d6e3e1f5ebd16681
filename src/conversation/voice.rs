//! Voice agent webhooks.
//!
//! The voice vendor runs its own model and calls back once per tool, with
//! snake_case tool names and the vendor conversation id in the payload.
//! Tool-level failures are still HTTP 200 with `success: false`.

use crate::engine::SessionContext;
use crate::model::Language;
use crate::tools::{ToolDispatcher, ToolName};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_VOICE_BASE_URL: &str = "https://api.elevenlabs.io";

/// How long a signed conversation URL is advertised as valid.
const SIGNED_URL_TTL_MS: i64 = 15 * 60 * 1000;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Voice service not configured")]
    NotConfigured,

    #[error("Voice vendor request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to generate signed URL: {status} {body}")]
    Vendor { status: u16, body: String },
}

/// Where voice sessions land when the call does not say.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceDefaults {
    pub restaurant_id: String,
    pub table_id: String,
    pub language: Language,
}

/// Addressing fields the vendor may send alongside tool arguments. Each is
/// read on its own, so one malformed field does not cost the others.
#[derive(Debug, Default, PartialEq)]
struct Addressing {
    session_id: Option<String>,
    conversation_id: Option<String>,
    restaurant_id: Option<String>,
    category_id: Option<String>,
}

impl Addressing {
    fn from_params(params: &Value) -> Self {
        Self {
            session_id: string_field(params, "sessionId"),
            conversation_id: string_field(params, "conversation_id"),
            restaurant_id: string_field(params, "restaurantId"),
            category_id: string_field(params, "categoryId"),
        }
    }
}

fn string_field(params: &Value, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::String(value) => Some(value.clone()),
        Value::Null => None,
        other => {
            debug!(key, value = %other, "Ignoring malformed addressing field");
            None
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `sessionId`, then the vendor conversation id, then a fresh `voice_<millis>`.
pub fn resolve_session_id(session_id: Option<String>, conversation_id: Option<String>) -> String {
    non_empty(session_id)
        .or_else(|| non_empty(conversation_id))
        .unwrap_or_else(|| format!("voice_{}", Utc::now().timestamp_millis()))
}

/// The single-endpoint form: `{tool_name, parameters, conversation_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceEnvelope {
    pub tool_name: String,
    #[serde(default)]
    pub parameters: Value,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignedUrlRequest {
    pub restaurant_id: String,
    pub table_id: String,
    pub session_id: String,
    pub language: Option<Language>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrl {
    pub signed_url: String,
    /// Unix millis.
    pub expires_at: i64,
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    signed_url: String,
}

/// Fetches signed conversation URLs so browsers never see the vendor key.
pub struct VoiceSigner {
    client: Client,
    api_key: String,
    agent_id: String,
    base_url: String,
}

impl VoiceSigner {
    pub fn new(
        api_key: impl Into<String>,
        agent_id: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, VoiceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            agent_id: agent_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn signed_url(&self) -> Result<SignedUrl, VoiceError> {
        let resp = self
            .client
            .get(format!("{}/v1/convai/conversation/get_signed_url", self.base_url))
            .query(&[("agent_id", self.agent_id.as_str())])
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            warn!(status, "Signed URL request failed");
            return Err(VoiceError::Vendor { status, body });
        }

        let data: SignedUrlResponse = resp.json().await?;
        Ok(SignedUrl {
            signed_url: data.signed_url,
            expires_at: Utc::now().timestamp_millis() + SIGNED_URL_TTL_MS,
        })
    }
}

#[derive(Clone)]
pub struct VoiceWebhook {
    tools: ToolDispatcher,
    defaults: VoiceDefaults,
    signer: Option<Arc<VoiceSigner>>,
}

impl VoiceWebhook {
    pub fn new(tools: ToolDispatcher, defaults: VoiceDefaults, signer: Option<VoiceSigner>) -> Self {
        Self {
            tools,
            defaults,
            signer: signer.map(Arc::new),
        }
    }

    /// Handles one per-tool callback. Always produces a JSON result.
    #[instrument(skip(self, params))]
    pub async fn handle(&self, tool: &str, params: Value) -> Value {
        let addressing = Addressing::from_params(&params);
        let restaurant_id =
            non_empty(addressing.restaurant_id).unwrap_or_else(|| self.defaults.restaurant_id.clone());

        if tool == "get_menu" {
            return self
                .get_menu(&restaurant_id, non_empty(addressing.category_id).as_deref())
                .await;
        }
        let Some(tool_name) = ToolName::from_voice_name(tool) else {
            warn!(tool, "Unknown voice tool");
            return json!({ "success": false, "message": format!("Unknown tool: {tool}") });
        };

        let ctx = SessionContext {
            session_id: resolve_session_id(addressing.session_id, addressing.conversation_id),
            restaurant_id,
            table_id: self.defaults.table_id.clone(),
            language: self.defaults.language,
            customer_id: None,
        };
        info!(session_id = %ctx.session_id, tool = tool_name.as_str(), "Voice tool call");
        self.tools.dispatch_tool(&ctx, tool_name, &params).await
    }

    /// Handles the envelope form. A top-level `conversation_id` is used
    /// when the parameters carry none.
    pub async fn handle_envelope(&self, envelope: VoiceEnvelope) -> Value {
        let mut params = match envelope.parameters {
            Value::Object(map) => map,
            _ => Default::default(),
        };
        if let Some(conversation_id) = envelope.conversation_id {
            params
                .entry("conversation_id")
                .or_insert(Value::String(conversation_id));
        }
        self.handle(&envelope.tool_name, Value::Object(params)).await
    }

    /// Menu listing for the voice agent. A store failure reads as a menu
    /// that is still loading.
    async fn get_menu(&self, restaurant_id: &str, category_id: Option<&str>) -> Value {
        let menu = match self.tools.engine().catalog().menu(restaurant_id).await {
            Ok(menu) => menu,
            Err(e) => {
                warn!(restaurant_id, error = %e, "Voice menu load failed");
                return json!({
                    "success": true,
                    "items": [],
                    "message": "Menu is currently loading",
                });
            }
        };
        let items: Vec<Value> = menu
            .iter()
            .filter(|item| category_id.map_or(true, |c| item.category_id == c))
            .map(|item| {
                json!({
                    "id": item.id,
                    "name": item.name,
                    "description": item.description,
                    "price": item.price,
                    "available": item.is_available(),
                    "allergens": item.allergens,
                    "dietaryFlags": item.dietary_flags,
                    "imageUrl": item.image_url,
                })
            })
            .collect();
        json!({ "success": true, "items": items })
    }

    #[instrument(skip(self, request), fields(session_id = %request.session_id))]
    pub async fn signed_url(&self, request: &SignedUrlRequest) -> Result<SignedUrl, VoiceError> {
        let required = [&request.restaurant_id, &request.table_id, &request.session_id];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(VoiceError::MissingFields);
        }
        let signer = self.signer.as_ref().ok_or(VoiceError::NotConfigured)?;
        let url = signer.signed_url().await?;
        info!(table_id = %request.table_id, "Issued signed voice URL");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistance::BroadcastNotifier;
    use crate::catalog::testing::demo_catalog;
    use crate::engine::OrderEngine;
    use crate::session_actor;
    use axum::extract::Query;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    fn webhook(signer: Option<VoiceSigner>) -> VoiceWebhook {
        let (actor, sessions) = session_actor::new(16);
        tokio::spawn(actor.run(()));
        let engine = OrderEngine::new(sessions, demo_catalog("demo_restaurant"), 0.08, 3);
        let tools = ToolDispatcher::new(engine, Arc::new(BroadcastNotifier::new(4)), "/checkout");
        let defaults = VoiceDefaults {
            restaurant_id: "demo_restaurant".to_string(),
            table_id: "table_1".to_string(),
            language: Language::Es,
        };
        VoiceWebhook::new(tools, defaults, signer)
    }

    #[test]
    fn test_session_id_resolution_order() {
        assert_eq!(
            resolve_session_id(Some("s1".into()), Some("conv_9".into())),
            "s1"
        );
        assert_eq!(resolve_session_id(Some("".into()), Some("conv_9".into())), "conv_9");
        assert!(resolve_session_id(None, None).starts_with("voice_"));
    }

    #[tokio::test]
    async fn test_conversation_id_keeps_one_draft_across_calls() {
        let voice = webhook(None);

        let added = voice
            .handle(
                "add_to_order",
                json!({"itemId": "tomato-soup", "quantity": 2, "conversation_id": "conv_1"}),
            )
            .await;
        assert_eq!(added["success"], true);

        let summary = voice
            .handle_envelope(VoiceEnvelope {
                tool_name: "get_order_summary".to_string(),
                parameters: json!({}),
                conversation_id: Some("conv_1".to_string()),
            })
            .await;
        assert_eq!(summary["itemCount"], 1);
        assert_eq!(summary["subtotal"], 17.98);

        let session = voice
            .tools
            .engine()
            .session(&SessionContext {
                session_id: "conv_1".to_string(),
                restaurant_id: "demo_restaurant".to_string(),
                table_id: "ignored".to_string(),
                language: Language::En,
                customer_id: None,
            })
            .await
            .unwrap();
        assert_eq!(session.entity.table_id, "table_1");
        assert_eq!(session.entity.language, Language::Es);
    }

    #[test]
    fn test_malformed_addressing_field_keeps_the_others() {
        let addressing = Addressing::from_params(&json!({
            "restaurantId": 42,
            "conversation_id": "conv_2",
            "categoryId": null,
        }));
        assert_eq!(
            addressing,
            Addressing {
                conversation_id: Some("conv_2".to_string()),
                ..Addressing::default()
            }
        );
    }

    #[tokio::test]
    async fn test_wrongly_typed_restaurant_still_reaches_the_conversation_draft() {
        let voice = webhook(None);

        voice
            .handle(
                "add_to_order",
                json!({"itemId": "iced-tea", "conversation_id": "conv_2"}),
            )
            .await;
        let summary = voice
            .handle(
                "get_order_summary",
                json!({"restaurantId": 42, "conversation_id": "conv_2"}),
            )
            .await;

        assert_eq!(summary["itemCount"], 1);
        assert_eq!(summary["subtotal"], 3.99);
    }

    #[tokio::test]
    async fn test_get_menu_filters_by_category() {
        let voice = webhook(None);

        let all = voice.handle("get_menu", json!({})).await;
        assert_eq!(all["items"].as_array().unwrap().len(), 10);

        let drinks = voice.handle("get_menu", json!({"categoryId": "drinks"})).await;
        let drinks = drinks["items"].as_array().unwrap();
        assert_eq!(drinks.len(), 3);
        assert_eq!(drinks[0]["id"], "fresh-lemonade");
        assert_eq!(drinks[0]["available"], true);
        assert_eq!(drinks[0]["imageUrl"], Value::Null);
    }

    #[tokio::test]
    async fn test_unknown_voice_tool() {
        let voice = webhook(None);
        let result = voice.handle("order_pizza", json!({})).await;
        assert_eq!(
            result,
            json!({"success": false, "message": "Unknown tool: order_pizza"})
        );
    }

    #[tokio::test]
    async fn test_signed_url_requires_fields_and_configuration() {
        let voice = webhook(None);
        let mut request = SignedUrlRequest {
            restaurant_id: "demo_restaurant".to_string(),
            table_id: "table_1".to_string(),
            session_id: String::new(),
            language: None,
        };
        assert!(matches!(
            voice.signed_url(&request).await,
            Err(VoiceError::MissingFields)
        ));

        request.session_id = "s1".to_string();
        assert!(matches!(
            voice.signed_url(&request).await,
            Err(VoiceError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_signed_url_from_vendor() {
        let vendor = Router::new().route(
            "/v1/convai/conversation/get_signed_url",
            get(
                |headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                    let key = headers
                        .get("xi-api-key")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({
                        "signed_url": format!("wss://voice.test/{}?key={key}", query["agent_id"])
                    }))
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, vendor).await });

        let signer = VoiceSigner::new(
            "secret",
            "agent_7",
            &format!("http://{addr}"),
            Duration::from_secs(5),
        )
        .unwrap();
        let voice = webhook(Some(signer));
        let before = Utc::now().timestamp_millis();

        let url = voice
            .signed_url(&SignedUrlRequest {
                restaurant_id: "demo_restaurant".to_string(),
                table_id: "table_1".to_string(),
                session_id: "s1".to_string(),
                language: Some(Language::En),
            })
            .await
            .unwrap();

        assert_eq!(url.signed_url, "wss://voice.test/agent_7?key=secret");
        assert!(url.expires_at >= before + SIGNED_URL_TTL_MS);
    }
}
