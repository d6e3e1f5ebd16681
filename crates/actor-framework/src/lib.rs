//! # Actor Framework
//!
//! Resource actors for Tokio: every resource type (sessions, menu items,
//! orders) is owned by a single task that processes requests one at a time,
//! and the rest of the program talks to it through a cloneable client.
//!
//! ```text
//! ┌──────────────────┐  ResourceRequest<T>  ┌────────────────────────────┐
//! │ ResourceClient<T>│ ───────────────────▶ │ ResourceActor<T>           │
//! │ (clone per task) │ ◀─────────────────── │ HashMap<Id, Versioned<T>>  │
//! └──────────────────┘   oneshot reply      └────────────────────────────┘
//! ```
//!
//! ## Versions
//!
//! Each stored entity is wrapped in [`Versioned`]. Successful updates and
//! actions bump the version. [`ResourceClient::update_if`] makes a write
//! conditional on the version the caller read, and reports a lost race as
//! [`FrameworkError::VersionConflict`] so the caller can re-read and retry.
//! Serializing requests inside the actor makes each single request atomic;
//! versions make a read-modify-write spanning several requests safe too.
//!
//! ## Ids
//!
//! `create` asks the actor's id generator for a fresh id. `insert` and
//! `get_or_create` take the id from the caller, for resources whose key is
//! chosen outside the process (a chat session id, a menu item slug). Such
//! actors are built with [`ResourceActor::keyed`] and have no generator.
//!
//! ## Context injection
//!
//! Actors are built without their dependencies and receive them in
//! [`ResourceActor::run`]. Wiring happens after every client exists, which
//! keeps construction free of ordering problems.
//!
//! ## Testing
//!
//! See [`mock`] for expectation-based clients. Integration tests for the
//! real actor live in `tests/`.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::{ActorEntity, Versioned};
pub use error::FrameworkError;
pub use message::{Predicate, ResourceRequest, Response};
