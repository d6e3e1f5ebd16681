//! # Menu Actor
//!
//! Owns the menu items of every restaurant, keyed by [`MenuItemKey`]. The
//! ordering flow only reads from it, through the
//! [`MenuCatalog`](crate::catalog::MenuCatalog) cache; writes come from
//! seeding and availability changes.
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation and [`MenuItemKey`]
//! - [`error`] - [`MenuError`]
//! - [`seed`] - the demo menu

pub mod entity;
pub mod error;
pub mod seed;

pub use entity::MenuItemKey;
pub use error::*;

use crate::clients::MenuClient;
use crate::model::MenuItem;
use actor_framework::ResourceActor;

/// Creates the Menu actor and its client. Items are always filed under an
/// explicit [`MenuItemKey`].
pub fn new(buffer_size: usize) -> (ResourceActor<MenuItem>, MenuClient) {
    let (actor, client) = ResourceActor::keyed(buffer_size);
    (actor, MenuClient::new(client))
}
