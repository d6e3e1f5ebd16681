//! # ActorClient Trait
//!
//! Shared surface for domain clients that wrap a [`ResourceClient`]: a
//! default `get` and `delete`, with framework errors mapped into the domain
//! error type.
use crate::{ActorEntity, FrameworkError, ResourceClient, Versioned};
use async_trait::async_trait;

/// Implemented by every domain client (`SessionClient`, `OrderClient`, ...).
///
/// ```rust
/// use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Table { id: String }
/// #[derive(Debug)] struct TableCreate;
/// #[derive(Debug)] struct TableUpdate;
/// #[derive(Debug)] enum TableAction {}
/// #[derive(Debug, thiserror::Error)]
/// enum TableError { #[error("store unavailable: {0}")] Store(String) }
///
/// #[async_trait]
/// impl ActorEntity for Table {
///     type Id = String;
///     type Create = TableCreate;
///     type Update = TableUpdate;
///     type Action = TableAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = TableError;
///
///     fn from_create_params(id: String, _: TableCreate) -> Result<Self, TableError> {
///         Ok(Self { id })
///     }
///     async fn on_update(&mut self, _: TableUpdate, _: &()) -> Result<(), TableError> { Ok(()) }
///     async fn handle_action(&mut self, a: TableAction, _: &()) -> Result<(), TableError> {
///         match a {}
///     }
/// }
///
/// struct TableClient { inner: ResourceClient<Table> }
///
/// #[async_trait]
/// impl ActorClient<Table> for TableClient {
///     type Error = TableError;
///     fn inner(&self) -> &ResourceClient<Table> { &self.inner }
///     fn map_error(e: FrameworkError) -> TableError { TableError::Store(e.to_string()) }
/// }
///
/// async fn usage(client: TableClient) {
///     let _ = client.get("table_1".to_string()).await;
///     let _ = client.delete("table_1".to_string()).await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    type Error: Send + Sync;

    fn inner(&self) -> &ResourceClient<T>;

    fn map_error(e: FrameworkError) -> Self::Error;

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<Versioned<T>>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
