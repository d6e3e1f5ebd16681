use super::{AppError, AppState};
use crate::conversation::{ChatHistory, ChatReply, ChatRequest};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

pub async fn send(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.chat.send(request).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
}

pub async fn history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<ChatHistory>, AppError> {
    let Query(query) = query?;
    let session_id = query.session_id.unwrap_or_default();
    Ok(Json(state.chat.history(&session_id).await?))
}
