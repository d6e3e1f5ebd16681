//! # Generic Client
//!
//! The cloneable handle used to talk to a [`ResourceActor`](crate::ResourceActor).

use crate::entity::{ActorEntity, Versioned};
use crate::error::FrameworkError;
use crate::message::{Predicate, ResourceRequest, Response};
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for a `ResourceActor`.
///
/// Holds only the channel sender, so cloning is cheap. Every call sends one
/// request and waits for the actor's reply on a oneshot channel.
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Stores a new entity under a generated id.
    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    /// Stores a new entity under `id`. Fails with `AlreadyExists` if taken.
    pub async fn insert(
        &self,
        id: T::Id,
        params: T::Create,
    ) -> Result<Versioned<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Insert {
            id,
            params,
            respond_to,
        })
        .await
    }

    /// Returns the entity stored under `id`, creating it from `params` first
    /// if there is none.
    pub async fn get_or_create(
        &self,
        id: T::Id,
        params: T::Create,
    ) -> Result<Versioned<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::GetOrCreate {
            id,
            params,
            respond_to,
        })
        .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<Versioned<T>>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    /// Unconditional update.
    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<Versioned<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update {
            id,
            update,
            expected_version: None,
            respond_to,
        })
        .await
    }

    /// Update that only applies if the stored version still equals
    /// `expected_version`; otherwise fails with `VersionConflict`.
    pub async fn update_if(
        &self,
        id: T::Id,
        expected_version: u64,
        update: T::Update,
    ) -> Result<Versioned<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update {
            id,
            update,
            expected_version: Some(expected_version),
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }

    /// Returns every stored entity accepted by `filter`, in no particular order.
    pub async fn query(&self, filter: Predicate<T>) -> Result<Vec<Versioned<T>>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Query { filter, respond_to })
            .await
    }
}
