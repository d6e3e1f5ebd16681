//! # ActorEntity Trait
//!
//! The contract a stored resource (a chat session, a menu item, an order)
//! implements so a [`ResourceActor`](crate::ResourceActor) can own it.
//!
//! Associated types pin down the payloads for each operation, so a
//! `SessionCreate` can never be sent to the menu actor. Hooks receive the
//! actor's `Context`, which is injected at `run()` time rather than at
//! construction.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A resource managed by a [`ResourceActor`](crate::ResourceActor).
///
/// Ids are opaque to the framework. They either come from the id generator
/// handed to [`ResourceActor::new`](crate::ResourceActor::new) or from the
/// caller (`insert`, `get_or_create`).
#[async_trait]
pub trait ActorEntity: Clone + Debug + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// Payload used to build a new instance.
    type Create: Send + Sync + Debug;

    /// Payload applied by `on_update`.
    type Update: Send + Sync + Debug;

    /// Resource-specific operations.
    type Action: Send + Sync + Debug;

    type ActionResult: Send + Sync + Debug;

    /// Dependencies injected into every hook. Use `()` when there are none.
    type Context: Send + Sync;

    /// One error enum per actor. Hook failures are boxed into
    /// [`FrameworkError::EntityError`](crate::FrameworkError::EntityError).
    type Error: std::error::Error + Send + Sync + 'static;

    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn on_update(
        &mut self,
        update: Self::Update,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle a resource-specific action. A successful action counts as a
    /// write and bumps the stored version.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}

/// A stored entity together with its write counter.
///
/// The version starts at 1 on insertion and increases by one on every
/// successful update or action. Callers hand it back as `expected_version`
/// to make a write conditional.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub entity: T,
}

impl<T> Versioned<T> {
    pub fn new(entity: T) -> Self {
        Self { version: 1, entity }
    }

    pub fn into_inner(self) -> T {
        self.entity
    }
}
