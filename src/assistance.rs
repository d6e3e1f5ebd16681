//! # Staff Assistance
//!
//! Escalations from a conversation to a human server. The ordering flow only
//! depends on [`StaffNotifier`]; [`BroadcastNotifier`] logs each request and
//! fans it out to whoever subscribed (a staff dashboard, a pager bridge).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistanceRequest {
    pub session_id: String,
    pub restaurant_id: String,
    pub table_id: String,
    pub reason: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotifyError {
    #[error("Staff notification failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait StaffNotifier: Send + Sync {
    async fn notify(&self, request: AssistanceRequest) -> Result<(), NotifyError>;
}

/// Publishes requests on a Tokio broadcast channel. Nobody listening is not
/// an error.
#[derive(Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<AssistanceRequest>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AssistanceRequest> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl StaffNotifier for BroadcastNotifier {
    async fn notify(&self, request: AssistanceRequest) -> Result<(), NotifyError> {
        info!(
            session_id = %request.session_id,
            table_id = %request.table_id,
            reason = %request.reason,
            "Human assistance requested"
        );
        match self.sender.send(request) {
            Ok(receivers) => debug!(receivers, "Assistance request published"),
            Err(_) => debug!("No staff subscribers"),
        }
        Ok(())
    }
}
