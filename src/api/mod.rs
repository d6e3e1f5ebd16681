//! # HTTP API
//!
//! axum routes over the chat, voice, checkout and menu services. Handlers
//! only translate between HTTP and the services; failures go through
//! [`AppError`].

pub mod chat;
pub mod error;
pub mod menu;
pub mod orders;
pub mod voice;

pub use error::AppError;

use crate::catalog::MenuCatalog;
use crate::checkout::CheckoutService;
use crate::clients::MenuClient;
use crate::conversation::{ChatService, VoiceWebhook};
use axum::http::{header::CONTENT_TYPE, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    pub voice: VoiceWebhook,
    pub checkout: CheckoutService,
    pub menu: MenuClient,
    pub catalog: Arc<MenuCatalog>,
    /// Restaurant seeded when `/api/seed` names none.
    pub default_restaurant_id: String,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/chat", post(chat::send).get(chat::history))
        .route("/api/voice/webhook", post(voice::envelope))
        .route("/api/voice/webhook/:tool", post(voice::tool))
        .route("/api/voice/signed-url", post(voice::signed_url))
        .route(
            "/api/orders",
            post(orders::submit)
                .get(orders::list)
                .patch(orders::update_status),
        )
        .route("/api/orders/:order_id/payment", post(orders::payment))
        .route("/api/orders/:order_id/cancel", post(orders::cancel))
        .route("/api/orders/:order_id/tip", post(orders::tip))
        .route("/api/menu", get(menu::list).patch(menu::set_availability))
        .route("/api/seed", post(menu::seed))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
