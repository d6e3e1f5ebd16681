//! Maps service errors to HTTP responses with an `{"error": ...}` body.

use crate::assistant::ModelError;
use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::conversation::{ChatError, VoiceError};
use crate::menu_actor::MenuError;
use crate::order_actor::OrderError;
use crate::session_actor::SessionError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::ValidationError(_) => AppError::BadRequest(e.to_string()),
            SessionError::NotFound(_) => AppError::NotFound(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(_) => AppError::NotFound(e.to_string()),
            OrderError::NoItems | OrderError::ValidationError(_) => {
                AppError::BadRequest(e.to_string())
            }
            OrderError::ActorCommunicationError(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<MenuError> for AppError {
    fn from(e: MenuError) -> Self {
        match e {
            MenuError::NotFound(_) => AppError::NotFound(e.to_string()),
            MenuError::ValidationError(_) => AppError::BadRequest(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<ModelError> for AppError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::NotConfigured => AppError::Unavailable(e.to_string()),
            _ => AppError::BadGateway(e.to_string()),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::MissingFields | ChatError::SessionIdRequired => {
                AppError::BadRequest(e.to_string())
            }
            ChatError::Model(inner) => inner.into(),
            ChatError::Session(inner) => inner.into(),
            ChatError::Catalog(inner) => inner.into(),
            ChatError::Engine(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Order(inner) => inner.into(),
            CheckoutError::Session(inner) => inner.into(),
            _ => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<VoiceError> for AppError {
    fn from(e: VoiceError) -> Self {
        match e {
            VoiceError::MissingFields => AppError::BadRequest(e.to_string()),
            VoiceError::NotConfigured => AppError::Unavailable(e.to_string()),
            VoiceError::Transport(_) | VoiceError::Vendor { .. } => {
                AppError::BadGateway(e.to_string())
            }
        }
    }
}
