//! # Session Actor
//!
//! Owns every [`ChatSession`]: the transcript plus the current draft for one
//! chat tab or voice call. Session ids are chosen by the caller (the chat
//! client or the voice vendor), so sessions are created with
//! `get_or_create` rather than `create`.
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation
//! - [`error`] - [`SessionError`]

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::SessionClient;
use crate::model::ChatSession;
use actor_framework::ResourceActor;

/// Creates the Session actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<ChatSession>, SessionClient) {
    let (actor, client) = ResourceActor::keyed(buffer_size);
    (actor, SessionClient::new(client))
}
