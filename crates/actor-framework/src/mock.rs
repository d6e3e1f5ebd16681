//! # Mock Clients
//!
//! Two ways to test code that sits on top of a [`ResourceClient`] without
//! spawning a real actor:
//!
//! - [`MockClient`] answers requests from a queue of expectations set up front
//!   and fails the test on anything unexpected.
//! - [`create_mock_client`] hands the raw request receiver to the test, which
//!   then answers each request itself with the `expect_*` helpers. Use this
//!   when the test needs to look at the payload a client sent.
//!
//! | | MockClient | Real actor |
//! |---|---|---|
//! | State | none, canned replies | real store with versions |
//! | Error injection | `return_err(..)` | needs a specific state |
//! | Use for | logic around a client | the entity and the full system |
//!
//! ```rust
//! use actor_framework::mock::MockClient;
//! use actor_framework::{ActorEntity, FrameworkError, Versioned};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Tab { id: String, open: bool }
//! #[derive(Debug)] struct TabCreate;
//! #[derive(Debug)] struct TabUpdate;
//! #[derive(Debug)] enum TabAction {}
//! #[derive(Debug, thiserror::Error)] #[error("tab error")] struct TabError;
//!
//! #[async_trait]
//! impl ActorEntity for Tab {
//!     type Id = String; type Create = TabCreate; type Update = TabUpdate;
//!     type Action = TabAction; type ActionResult = (); type Context = (); type Error = TabError;
//!     fn from_create_params(id: String, _: TabCreate) -> Result<Self, TabError> {
//!         Ok(Self { id, open: true })
//!     }
//!     async fn on_update(&mut self, _: TabUpdate, _: &()) -> Result<(), TabError> { Ok(()) }
//!     async fn handle_action(&mut self, a: TabAction, _: &()) -> Result<(), TabError> { match a {} }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Tab>::new();
//!     mock.expect_get("tab_1".to_string())
//!         .return_ok(Some(Versioned::new(Tab { id: "tab_1".into(), open: true })));
//!     mock.expect_update("tab_1".to_string())
//!         .return_err(FrameworkError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert!(client.get("tab_1".to_string()).await.unwrap().is_some());
//!     let failed = client.update("tab_1".to_string(), TabUpdate).await;
//!     assert!(matches!(failed, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```

use crate::client::ResourceClient;
use crate::entity::{ActorEntity, Versioned};
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// One queued reply. Variants carrying an id only match a request for that id.
enum Expectation<T: ActorEntity> {
    Create(Result<T::Id, FrameworkError>),
    Insert(T::Id, Result<Versioned<T>, FrameworkError>),
    GetOrCreate(T::Id, Result<Versioned<T>, FrameworkError>),
    Get(T::Id, Result<Option<Versioned<T>>, FrameworkError>),
    Update(T::Id, Result<Versioned<T>, FrameworkError>),
    Delete(T::Id, Result<(), FrameworkError>),
    Action(T::Id, Result<T::ActionResult, FrameworkError>),
    Query(Result<Vec<Versioned<T>>, FrameworkError>),
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn lock<T: ActorEntity>(queue: &Queue<T>) -> MutexGuard<'_, VecDeque<Expectation<T>>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn reply<R>(respond_to: Response<R>, response: Result<R, FrameworkError>) {
    let _ = respond_to.send(response);
}

fn check_id<Id: PartialEq + std::fmt::Debug>(op: &str, expected: &Id, actual: &Id) {
    if expected != actual {
        panic!("{op} expected for {expected:?}, got request for {actual:?}");
    }
}

/// A client whose replies come from a queue of expectations.
///
/// Requests are answered strictly in the order the expectations were set.
/// A request that does not match the next expectation panics the mock task,
/// which surfaces to the caller as `FrameworkError::ActorDropped`.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = lock(&queue).pop_front();
                match (request, next) {
                    (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create(r))) => {
                        reply(respond_to, r)
                    }
                    (
                        ResourceRequest::Insert { id, respond_to, .. },
                        Some(Expectation::Insert(expected, r)),
                    ) => {
                        check_id("insert", &expected, &id);
                        reply(respond_to, r)
                    }
                    (
                        ResourceRequest::GetOrCreate { id, respond_to, .. },
                        Some(Expectation::GetOrCreate(expected, r)),
                    ) => {
                        check_id("get_or_create", &expected, &id);
                        reply(respond_to, r)
                    }
                    (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get(expected, r))) => {
                        check_id("get", &expected, &id);
                        reply(respond_to, r)
                    }
                    (
                        ResourceRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update(expected, r)),
                    ) => {
                        check_id("update", &expected, &id);
                        reply(respond_to, r)
                    }
                    (
                        ResourceRequest::Delete { id, respond_to },
                        Some(Expectation::Delete(expected, r)),
                    ) => {
                        check_id("delete", &expected, &id);
                        reply(respond_to, r)
                    }
                    (
                        ResourceRequest::Action { id, respond_to, .. },
                        Some(Expectation::Action(expected, r)),
                    ) => {
                        check_id("action", &expected, &id);
                        reply(respond_to, r)
                    }
                    (ResourceRequest::Query { respond_to, .. }, Some(Expectation::Query(r))) => {
                        reply(respond_to, r)
                    }
                    (request, _) => panic!("Unexpected request: {request:?}"),
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    fn builder<R>(
        &self,
        wrap: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            wrap: Box::new(wrap),
        }
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        self.builder(Expectation::Create)
    }

    pub fn expect_insert(&mut self, id: T::Id) -> ExpectationBuilder<T, Versioned<T>> {
        self.builder(move |r| Expectation::Insert(id, r))
    }

    pub fn expect_get_or_create(&mut self, id: T::Id) -> ExpectationBuilder<T, Versioned<T>> {
        self.builder(move |r| Expectation::GetOrCreate(id, r))
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<Versioned<T>>> {
        self.builder(move |r| Expectation::Get(id, r))
    }

    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, Versioned<T>> {
        self.builder(move |r| Expectation::Update(id, r))
    }

    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |r| Expectation::Delete(id, r))
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(move |r| Expectation::Action(id, r))
    }

    pub fn expect_query(&mut self) -> ExpectationBuilder<T, Vec<Versioned<T>>> {
        self.builder(Expectation::Query)
    }

    /// Panics if any expectation was never consumed.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

type Wrap<T, R> = Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>;

/// Completes an expectation with the reply the mock should send.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Queue<T>,
    wrap: Wrap<T, R>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        let expectation = (self.wrap)(response);
        lock(&self.expectations).push_back(expectation);
    }
}

/// Creates a client plus the receiving end of its channel, so the test can
/// inspect and answer each request by hand.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next request must be a `Get`.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<Versioned<T>>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Next request must be an `Update`. Yields the payload and the version the
/// caller conditioned on.
pub async fn expect_update<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Update, Option<u64>, Response<Versioned<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update {
            id,
            update,
            expected_version,
            respond_to,
        }) => Some((id, update, expected_version, respond_to)),
        _ => None,
    }
}

/// Next request must be an `Action`.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Ticket {
        id: String,
        seat: u32,
    }

    #[derive(Debug)]
    struct TicketCreate {
        seat: u32,
    }

    #[derive(Debug)]
    struct MoveSeat(u32);

    #[derive(Debug)]
    enum TicketAction {
        Void,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("ticket error")]
    struct TicketError;

    #[async_trait]
    impl ActorEntity for Ticket {
        type Id = String;
        type Create = TicketCreate;
        type Update = MoveSeat;
        type Action = TicketAction;
        type ActionResult = bool;
        type Context = ();
        type Error = TicketError;

        fn from_create_params(id: String, params: TicketCreate) -> Result<Self, TicketError> {
            Ok(Self {
                id,
                seat: params.seat,
            })
        }

        async fn on_update(&mut self, update: MoveSeat, _ctx: &()) -> Result<(), TicketError> {
            self.seat = update.0;
            Ok(())
        }

        async fn handle_action(&mut self, _action: TicketAction, _ctx: &()) -> Result<bool, TicketError> {
            Ok(true)
        }
    }

    fn ticket(id: &str, seat: u32) -> Versioned<Ticket> {
        Versioned::new(Ticket {
            id: id.to_string(),
            seat,
        })
    }

    #[tokio::test]
    async fn test_manual_mock_sees_conditional_update() {
        let (client, mut receiver) = create_mock_client::<Ticket>(10);

        let task = tokio::spawn(async move {
            client
                .update_if("t_1".to_string(), 4, MoveSeat(12))
                .await
        });

        let (id, update, expected, responder) = expect_update(&mut receiver)
            .await
            .expect("Expected Update request");
        assert_eq!(id, "t_1");
        assert_eq!(update.0, 12);
        assert_eq!(expected, Some(4));
        responder
            .send(Err(FrameworkError::VersionConflict {
                id,
                expected: 4,
                actual: 5,
            }))
            .unwrap();

        let result = task.await.unwrap();
        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_mock_client_replays_expectations_in_order() {
        let mut mock = MockClient::<Ticket>::new();
        mock.expect_get_or_create("t_1".to_string())
            .return_ok(ticket("t_1", 3));
        mock.expect_action("t_1".to_string()).return_ok(true);
        mock.expect_query().return_ok(vec![ticket("t_1", 3)]);

        let client = mock.client();
        let stored = client
            .get_or_create("t_1".to_string(), TicketCreate { seat: 3 })
            .await
            .unwrap();
        assert_eq!(stored.entity.seat, 3);
        assert!(client
            .perform_action("t_1".to_string(), TicketAction::Void)
            .await
            .unwrap());
        let all = client
            .query(crate::message::Predicate::all())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);

        mock.verify();
    }

    #[tokio::test]
    async fn test_mock_client_wrong_id_surfaces_as_dropped() {
        let mut mock = MockClient::<Ticket>::new();
        mock.expect_get("t_1".to_string()).return_ok(None);

        let result = mock.client().get("t_2".to_string()).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }
}
