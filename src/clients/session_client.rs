//! # Session Client
//!
//! Reads and writes [`ChatSession`]s. Draft writes are conditional on the
//! version the caller read; transcript appends are not, since appending
//! never overwrites someone else's change.

use crate::model::{ChatMessage, ChatSession, OrderDraft, SessionCreate, SessionUpdate};
use crate::session_actor::SessionError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient, Versioned};
use async_trait::async_trait;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SessionClient {
    inner: ResourceClient<ChatSession>,
}

impl SessionClient {
    pub fn new(inner: ResourceClient<ChatSession>) -> Self {
        Self { inner }
    }

    /// Loads the session, creating it on first contact.
    #[instrument(skip(self, params), fields(restaurant_id = %params.restaurant_id))]
    pub async fn get_or_create(
        &self,
        session_id: String,
        params: SessionCreate,
    ) -> Result<Versioned<ChatSession>, SessionError> {
        debug!("Sending request");
        self.inner
            .get_or_create(session_id, params)
            .await
            .map_err(SessionError::from)
    }

    /// Replaces the draft if the session is still at `expected_version`.
    #[instrument(skip(self, draft))]
    pub async fn replace_order(
        &self,
        session_id: String,
        expected_version: u64,
        draft: Option<OrderDraft>,
    ) -> Result<Versioned<ChatSession>, SessionError> {
        debug!(lines = draft.as_ref().map_or(0, OrderDraft::line_count), "Sending request");
        self.inner
            .update_if(session_id, expected_version, SessionUpdate::ReplaceOrder(draft))
            .await
            .map_err(SessionError::from)
    }

    #[instrument(skip(self, messages), fields(count = messages.len()))]
    pub async fn append_messages(
        &self,
        session_id: String,
        messages: Vec<ChatMessage>,
    ) -> Result<Versioned<ChatSession>, SessionError> {
        debug!("Sending request");
        self.inner
            .update(session_id, SessionUpdate::AppendMessages(messages))
            .await
            .map_err(SessionError::from)
    }
}

#[async_trait]
impl ActorClient<ChatSession> for SessionClient {
    type Error = SessionError;

    fn inner(&self) -> &ResourceClient<ChatSession> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        SessionError::from(e)
    }
}
