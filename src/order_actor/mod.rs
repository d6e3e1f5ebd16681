//! # Order Actor
//!
//! Owns finalized orders. An order is created once from a session draft or a
//! direct cart and afterwards only moves through status, payment and tip
//! updates.
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation
//! - [`error`] - [`OrderError`]

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::model::Order;
use actor_framework::ResourceActor;
use uuid::Uuid;

/// Creates the Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let next_order_id = || format!("order_{}", Uuid::new_v4().simple());
    let (actor, client) = ResourceActor::new(buffer_size, next_order_id);
    (actor, OrderClient::new(client))
}
