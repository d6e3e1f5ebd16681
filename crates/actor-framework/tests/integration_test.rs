use actor_framework::{ActorEntity, FrameworkError, Predicate, ResourceActor, ResourceClient};
use async_trait::async_trait;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Tab {
    id: String,
    table: String,
    balance: f64,
    closed: bool,
}

#[derive(Debug)]
struct TabCreate {
    table: String,
}

#[derive(Debug)]
enum TabUpdate {
    Charge(f64),
    Refund(f64),
}

#[derive(Debug)]
enum TabAction {
    Close,
}

#[derive(Debug, thiserror::Error)]
enum TabError {
    #[error("refund exceeds balance")]
    Overdrawn,
    #[error("tab already closed")]
    Closed,
}

#[async_trait]
impl ActorEntity for Tab {
    type Id = String;
    type Create = TabCreate;
    type Update = TabUpdate;
    type Action = TabAction;
    type ActionResult = f64;
    type Context = ();
    type Error = TabError;

    fn from_create_params(id: String, params: TabCreate) -> Result<Self, TabError> {
        Ok(Self {
            id,
            table: params.table,
            balance: 0.0,
            closed: false,
        })
    }

    async fn on_update(&mut self, update: TabUpdate, _ctx: &()) -> Result<(), TabError> {
        match update {
            TabUpdate::Charge(amount) => self.balance += amount,
            TabUpdate::Refund(amount) => {
                // Mutate first so the test proves the actor discards partial writes.
                self.balance -= amount;
                if self.balance < 0.0 {
                    return Err(TabError::Overdrawn);
                }
            }
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: TabAction, _ctx: &()) -> Result<f64, TabError> {
        match action {
            TabAction::Close if self.closed => Err(TabError::Closed),
            TabAction::Close => {
                self.closed = true;
                Ok(self.balance)
            }
        }
    }
}

fn spawn_tabs() -> ResourceClient<Tab> {
    let mut seq = 0u32;
    let (actor, client) = ResourceActor::<Tab>::new(10, move || {
        seq += 1;
        format!("tab_{seq}")
    });
    tokio::spawn(actor.run(()));
    client
}

fn table(name: &str) -> TabCreate {
    TabCreate {
        table: name.to_string(),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_generated_ids_and_versions() {
    let client = spawn_tabs();

    let first = client.create(table("t1")).await.unwrap();
    let second = client.create(table("t2")).await.unwrap();
    assert_eq!(first, "tab_1");
    assert_eq!(second, "tab_2");

    let stored = client.get(first.clone()).await.unwrap().unwrap();
    assert_eq!(stored.version, 1);

    let updated = client
        .update(first.clone(), TabUpdate::Charge(12.5))
        .await
        .unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.entity.balance, 12.5);

    let total = client
        .perform_action(first.clone(), TabAction::Close)
        .await
        .unwrap();
    assert_eq!(total, 12.5);
    assert_eq!(client.get(first).await.unwrap().unwrap().version, 3);
}

#[tokio::test]
async fn test_caller_supplied_ids() {
    let client = spawn_tabs();

    let inserted = client.insert("bar".to_string(), table("t9")).await.unwrap();
    assert_eq!(inserted.entity.table, "t9");

    let again = client.insert("bar".to_string(), table("t10")).await;
    assert!(matches!(again, Err(FrameworkError::AlreadyExists(id)) if id == "bar"));

    // get_or_create ignores the params when the entity exists.
    let existing = client
        .get_or_create("bar".to_string(), table("ignored"))
        .await
        .unwrap();
    assert_eq!(existing.entity.table, "t9");

    let fresh = client
        .get_or_create("patio".to_string(), table("p1"))
        .await
        .unwrap();
    assert_eq!(fresh.version, 1);
    assert_eq!(fresh.entity.table, "p1");
}

#[tokio::test]
async fn test_conditional_update_rejects_stale_version() {
    let client = spawn_tabs();
    let id = client.create(table("t1")).await.unwrap();

    let read = client.get(id.clone()).await.unwrap().unwrap();
    client
        .update(id.clone(), TabUpdate::Charge(5.0))
        .await
        .unwrap();

    let stale = client
        .update_if(id.clone(), read.version, TabUpdate::Charge(7.0))
        .await;
    match stale {
        Err(FrameworkError::VersionConflict {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("expected a version conflict, got {other:?}"),
    }

    let fresh = client.get(id.clone()).await.unwrap().unwrap();
    let applied = client
        .update_if(id, fresh.version, TabUpdate::Charge(7.0))
        .await
        .unwrap();
    assert_eq!(applied.entity.balance, 12.0);
    assert_eq!(applied.version, 3);
}

#[tokio::test]
async fn test_failed_hooks_leave_state_untouched() {
    let client = spawn_tabs();
    let id = client.create(table("t1")).await.unwrap();
    client
        .update(id.clone(), TabUpdate::Charge(3.0))
        .await
        .unwrap();

    let overdrawn = client.update(id.clone(), TabUpdate::Refund(10.0)).await;
    assert!(matches!(overdrawn, Err(FrameworkError::EntityError(_))));

    client
        .perform_action(id.clone(), TabAction::Close)
        .await
        .unwrap();
    let closed_twice = client.perform_action(id.clone(), TabAction::Close).await;
    assert!(matches!(closed_twice, Err(FrameworkError::EntityError(_))));

    let stored = client.get(id).await.unwrap().unwrap();
    assert_eq!(stored.entity.balance, 3.0);
    assert_eq!(stored.version, 3);
}

#[tokio::test]
async fn test_query_and_delete() {
    let client = spawn_tabs();
    for name in ["t1", "t2", "t1"] {
        client.create(table(name)).await.unwrap();
    }

    let t1 = client
        .query(Predicate::new(|tab: &Tab| tab.table == "t1"))
        .await
        .unwrap();
    assert_eq!(t1.len(), 2);

    client.delete("tab_1".to_string()).await.unwrap();
    let missing = client.delete("tab_1".to_string()).await;
    assert!(matches!(missing, Err(FrameworkError::NotFound(_))));

    let all = client.query(Predicate::all()).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_dropping_clients_stops_actor() {
    let (actor, client) = ResourceActor::<Tab>::new(4, || "only".to_string());
    let handle = tokio::spawn(actor.run(()));
    client.create(table("t1")).await.unwrap();

    drop(client);
    handle.await.unwrap();
}
