use super::{AppError, AppState};
use crate::conversation::voice::{SignedUrl, SignedUrlRequest, VoiceEnvelope};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

/// Vendors post an empty body for tools without parameters.
fn parameters(body: &Bytes) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid JSON: {e}")))
}

pub async fn tool(
    State(state): State<AppState>,
    Path(tool): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let params = parameters(&body)?;
    Ok(Json(state.voice.handle(&tool, params).await))
}

pub async fn envelope(
    State(state): State<AppState>,
    payload: Result<Json<VoiceEnvelope>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(envelope) = payload?;
    Ok(Json(state.voice.handle_envelope(envelope).await))
}

pub async fn signed_url(
    State(state): State<AppState>,
    payload: Result<Json<SignedUrlRequest>, JsonRejection>,
) -> Result<Json<SignedUrl>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.voice.signed_url(&request).await?))
}
