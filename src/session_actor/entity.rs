//! [`ActorEntity`] implementation for [`ChatSession`].

use super::SessionError;
use crate::model::{ChatSession, SessionCreate, SessionUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl ActorEntity for ChatSession {
    type Id = String;
    type Create = SessionCreate;
    type Update = SessionUpdate;
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = SessionError;

    fn from_create_params(id: String, params: SessionCreate) -> Result<Self, SessionError> {
        if params.restaurant_id.is_empty() || params.table_id.is_empty() {
            return Err(SessionError::ValidationError(
                "restaurantId and tableId are required".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            restaurant_id: params.restaurant_id,
            table_id: params.table_id,
            language: params.language,
            customer_id: params.customer_id,
            current_order: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// # Updates
    /// - `ReplaceOrder`: stores the draft, collapsing an empty one to `None`
    /// - `AppendMessages`: extends the transcript
    async fn on_update(&mut self, update: SessionUpdate, _ctx: &()) -> Result<(), SessionError> {
        match update {
            SessionUpdate::ReplaceOrder(draft) => {
                self.current_order = draft.and_then(|d| d.into_option());
            }
            SessionUpdate::AppendMessages(messages) => {
                self.messages.extend(messages);
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    // No actions: every change goes through create/update.
    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), SessionError> {
        Ok(())
    }
}
