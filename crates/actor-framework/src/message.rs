//! # Generic Messages
//!
//! The request envelope exchanged between [`ResourceClient`](crate::ResourceClient)
//! and [`ResourceActor`](crate::ResourceActor).

use crate::entity::{ActorEntity, Versioned};
use crate::error::FrameworkError;
use std::fmt;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// A filter evaluated inside the actor against every stored entity.
pub struct Predicate<T>(Box<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Predicate<T> {
    pub fn new(f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(f))
    }

    /// Matches every entity.
    pub fn all() -> Self {
        Self::new(|_| true)
    }

    pub fn matches(&self, entity: &T) -> bool {
        (self.0)(entity)
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Operations an actor accepts.
///
/// - `Create` stores a new entity under a generated id.
/// - `Insert` stores a new entity under a caller-chosen id and fails if it exists.
/// - `GetOrCreate` returns the existing entity or builds one from `params`.
/// - `Update` applies an update, optionally only if the version still matches.
/// - `Action` runs a resource-specific operation.
/// - `Query` returns every entity the predicate accepts.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Insert {
        id: T::Id,
        params: T::Create,
        respond_to: Response<Versioned<T>>,
    },
    GetOrCreate {
        id: T::Id,
        params: T::Create,
        respond_to: Response<Versioned<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<Versioned<T>>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        expected_version: Option<u64>,
        respond_to: Response<Versioned<T>>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Query {
        filter: Predicate<T>,
        respond_to: Response<Vec<Versioned<T>>>,
    },
}
