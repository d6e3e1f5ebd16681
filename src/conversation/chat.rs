//! Text chat: one user message in, one assistant message out.

use crate::assistant::{transcript, Content, LanguageModel, ModelError, SystemPrompt};
use crate::catalog::CatalogError;
use crate::engine::{EngineError, SessionContext};
use crate::model::{ChatMessage, Language, OrderDraft, ToolInvocation};
use crate::session_actor::SessionError;
use crate::tools::ToolDispatcher;
use actor_framework::ActorClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Session ID required")]
    SessionIdRequired,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    pub session_id: String,
    pub restaurant_id: String,
    pub table_id: String,
    pub message: String,
    pub language: Option<Language>,
    pub customer_id: Option<String>,
}

impl ChatRequest {
    fn context(&self) -> Result<SessionContext, ChatError> {
        let required = [
            &self.session_id,
            &self.restaurant_id,
            &self.table_id,
            &self.message,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(ChatError::MissingFields);
        }
        Ok(SessionContext {
            session_id: self.session_id.clone(),
            restaurant_id: self.restaurant_id.clone(),
            table_id: self.table_id.clone(),
            language: self.language.unwrap_or_default(),
            customer_id: self.customer_id.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    pub tool_calls: Vec<ToolInvocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
    pub messages: Vec<ChatMessage>,
    pub current_order: Option<OrderDraft>,
}

#[derive(Clone)]
pub struct ChatService {
    tools: ToolDispatcher,
    model: Arc<dyn LanguageModel>,
    restaurant_name: String,
}

impl ChatService {
    pub fn new(
        tools: ToolDispatcher,
        model: Arc<dyn LanguageModel>,
        restaurant_name: impl Into<String>,
    ) -> Self {
        Self {
            tools,
            model,
            restaurant_name: restaurant_name.into(),
        }
    }

    /// Runs one chat turn.
    ///
    /// Every function call of the first reply is executed in order, then the
    /// model gets a single follow-up carrying all results. Its text wins when
    /// it has any; function calls in the follow-up are not executed.
    #[instrument(skip(self, request), fields(session_id = %request.session_id))]
    pub async fn send(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        let ctx = request.context()?;
        let engine = self.tools.engine();
        let session = engine.session(&ctx).await?.entity;
        let menu = engine.catalog().menu(&ctx.restaurant_id).await?;

        let prompt = SystemPrompt {
            restaurant_name: &self.restaurant_name,
            table_id: &ctx.table_id,
            session_id: &ctx.session_id,
            language: ctx.language,
            menu: &menu,
            current_order: session.current_order.as_ref(),
        }
        .to_string();
        let mut model_request = transcript::request(prompt, &session.messages, &request.message);

        let first = self.model.generate(&model_request).await?;
        debug!(calls = first.function_calls.len(), "Model replied");
        let mut text = first.text;
        let invocations = self.tools.dispatch_all(&ctx, &first.function_calls).await;

        if !invocations.is_empty() {
            model_request
                .contents
                .push(Content::function_calls(&first.function_calls));
            model_request
                .contents
                .push(Content::function_responses(&invocations));
            let follow_up = self.model.generate(&model_request).await?;
            if !follow_up.function_calls.is_empty() {
                warn!(
                    ignored = follow_up.function_calls.len(),
                    "Follow-up function calls not executed"
                );
            }
            if !follow_up.text.is_empty() {
                text = follow_up.text;
            }
        }

        engine
            .sessions()
            .append_messages(
                ctx.session_id.clone(),
                vec![
                    ChatMessage::user(request.message.clone()),
                    ChatMessage::assistant(text.clone(), invocations.clone()),
                ],
            )
            .await?;
        info!(tools = invocations.len(), "Chat turn complete");

        Ok(ChatReply {
            message: text,
            tool_calls: invocations,
        })
    }

    /// Transcript and draft of a session. Unknown sessions read as empty.
    #[instrument(skip(self))]
    pub async fn history(&self, session_id: &str) -> Result<ChatHistory, ChatError> {
        if session_id.trim().is_empty() {
            return Err(ChatError::SessionIdRequired);
        }
        let session = self
            .tools
            .engine()
            .sessions()
            .get(session_id.to_string())
            .await?;
        Ok(session
            .map(|s| ChatHistory {
                messages: s.entity.messages,
                current_order: s.entity.current_order,
            })
            .unwrap_or_default())
    }
}
