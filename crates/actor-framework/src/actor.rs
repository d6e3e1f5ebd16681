//! # Generic Actor Server
//!
//! `ResourceActor` owns the store for one entity type and processes requests
//! one at a time on its own Tokio task, so the store needs no lock.

use crate::client::ResourceClient;
use crate::entity::{ActorEntity, Versioned};
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type IdGenerator<Id> = Box<dyn FnMut() -> Id + Send>;

/// The server half of an actor.
///
/// Usage is always the same three steps:
///
/// 1. `ResourceActor::new()` returns the actor and its client.
/// 2. The actor's dependencies are passed to `run(context)`.
/// 3. `run` is spawned on a background task.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Note { id: String, text: String }
/// #[derive(Debug)] struct NoteCreate(String);
/// #[derive(Debug)] struct NoteUpdate(String);
/// #[derive(Debug)] enum NoteAction {}
/// #[derive(Debug, thiserror::Error)] #[error("note error")] struct NoteError;
///
/// #[async_trait]
/// impl ActorEntity for Note {
///     type Id = String;
///     type Create = NoteCreate;
///     type Update = NoteUpdate;
///     type Action = NoteAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = NoteError;
///
///     fn from_create_params(id: String, p: NoteCreate) -> Result<Self, NoteError> {
///         Ok(Self { id, text: p.0 })
///     }
///     async fn on_update(&mut self, u: NoteUpdate, _: &()) -> Result<(), NoteError> {
///         self.text = u.0;
///         Ok(())
///     }
///     async fn handle_action(&mut self, a: NoteAction, _: &()) -> Result<(), NoteError> {
///         match a {}
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let mut seq = 0;
///     let (actor, client) = ResourceActor::<Note>::new(10, move || {
///         seq += 1;
///         format!("note_{seq}")
///     });
///     tokio::spawn(actor.run(()));
///
///     let id = client.create(NoteCreate("hello".into())).await.unwrap();
///     let stored = client.get(id).await.unwrap().unwrap();
///     assert_eq!(stored.version, 1);
/// }
/// ```
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, Versioned<T>>,
    next_id: Option<IdGenerator<T::Id>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates the actor and its client.
    ///
    /// `buffer_size` bounds the request channel; senders wait when it is full.
    /// `next_id` is called for every `Create` request.
    pub fn new(
        buffer_size: usize,
        next_id: impl FnMut() -> T::Id + Send + 'static,
    ) -> (Self, ResourceClient<T>) {
        Self::build(buffer_size, Some(Box::new(next_id)))
    }

    /// Creates an actor whose ids always come from the caller. `Create`
    /// requests are rejected; use `insert` or `get_or_create`.
    pub fn keyed(buffer_size: usize) -> (Self, ResourceClient<T>) {
        Self::build(buffer_size, None)
    }

    fn build(
        buffer_size: usize,
        next_id: Option<IdGenerator<T::Id>>,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let Some(next_id) = self.next_id.as_mut() else {
                        warn!(entity_type, "Create without id generator");
                        let _ = respond_to.send(Err(FrameworkError::IdRequired));
                        continue;
                    };
                    let id = next_id();
                    let result = self
                        .insert_new(id.clone(), params, &context, entity_type)
                        .await
                        .map(|_| id);
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Insert {
                    id,
                    params,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?params, "Insert");
                    let result = if self.store.contains_key(&id) {
                        warn!(entity_type, %id, "Already exists");
                        Err(FrameworkError::AlreadyExists(id.to_string()))
                    } else {
                        self.insert_new(id, params, &context, entity_type).await
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::GetOrCreate {
                    id,
                    params,
                    respond_to,
                } => {
                    let result = match self.store.get(&id) {
                        Some(existing) => {
                            debug!(entity_type, %id, version = existing.version, "GetOrCreate hit");
                            Ok(existing.clone())
                        }
                        None => self.insert_new(id, params, &context, entity_type).await,
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    expected_version,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?expected_version, ?update, "Update");
                    let Some(slot) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Some(expected) = expected_version {
                        if slot.version != expected {
                            warn!(entity_type, %id, expected, actual = slot.version, "Version conflict");
                            let _ = respond_to.send(Err(FrameworkError::VersionConflict {
                                id: id.to_string(),
                                expected,
                                actual: slot.version,
                            }));
                            continue;
                        }
                    }
                    // Hooks work on a copy so a failed update leaves the stored value intact.
                    let mut next = slot.entity.clone();
                    match next.on_update(update, &context).await {
                        Ok(()) => {
                            slot.entity = next;
                            slot.version += 1;
                            info!(entity_type, %id, version = slot.version, "Updated");
                            let _ = respond_to.send(Ok(slot.clone()));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(slot) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = slot.entity.on_delete(&context).await {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.remove(&id);
                    info!(entity_type, %id, size = self.store.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(slot) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut next = slot.entity.clone();
                    let result = match next.handle_action(action, &context).await {
                        Ok(out) => {
                            slot.entity = next;
                            slot.version += 1;
                            info!(entity_type, %id, version = slot.version, "Action ok");
                            Ok(out)
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Action failed");
                            Err(FrameworkError::EntityError(Box::new(e)))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Query { filter, respond_to } => {
                    let matches: Vec<_> = self
                        .store
                        .values()
                        .filter(|slot| filter.matches(&slot.entity))
                        .cloned()
                        .collect();
                    debug!(entity_type, matched = matches.len(), "Query");
                    let _ = respond_to.send(Ok(matches));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    async fn insert_new(
        &mut self,
        id: T::Id,
        params: T::Create,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<Versioned<T>, FrameworkError> {
        let mut item = T::from_create_params(id.clone(), params).map_err(|e| {
            warn!(entity_type, error = %e, "Create failed");
            FrameworkError::EntityError(Box::new(e))
        })?;
        item.on_create(context).await.map_err(|e| {
            warn!(entity_type, error = %e, "on_create failed");
            FrameworkError::EntityError(Box::new(e))
        })?;
        let stored = Versioned::new(item);
        self.store.insert(id.clone(), stored.clone());
        info!(entity_type, %id, size = self.store.len(), "Created");
        Ok(stored)
    }
}
