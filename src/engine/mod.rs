//! # Order Mutation Engine
//!
//! Applies cart operations to a session's draft. Every mutation is a
//! read-modify-write against the Session actor:
//!
//! ```text
//! get_or_create ──▶ apply to a copy ──▶ replace_order(expected_version)
//!       ▲                                        │
//!       └──────────── VersionConflict ───────────┘   (bounded)
//! ```
//!
//! The arithmetic lives in [`OrderDraft`]; this module only resolves menu
//! references and handles persistence.
//!
//! - [`error`] - [`EngineError`]
//! - [`recommend`] - recommendation rules

pub mod error;
pub mod recommend;

pub use error::*;
pub use recommend::{recommend, Recommendation, RecommendationKind};

use crate::catalog::{resolve_in, MenuCatalog};
use crate::clients::SessionClient;
use crate::model::{
    ChatSession, DraftLineItem, EditOutcome, Language, LineAddition, LineEdit, LineSelector, OrderDraft,
    SessionCreate,
};
use crate::session_actor::SessionError;
use actor_framework::Versioned;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Who is ordering: identifies the session and how to create it on first
/// contact.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub session_id: String,
    pub restaurant_id: String,
    pub table_id: String,
    pub language: Language,
    pub customer_id: Option<String>,
}

impl SessionContext {
    fn create_params(&self) -> SessionCreate {
        SessionCreate {
            restaurant_id: self.restaurant_id.clone(),
            table_id: self.table_id.clone(),
            language: self.language,
            customer_id: self.customer_id.clone(),
        }
    }
}

/// A request to put a menu item in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct AddRequest {
    /// Menu item id, or a name to fall back on.
    pub reference: String,
    pub quantity: u32,
    pub modifiers: Vec<String>,
    pub special_instructions: Option<String>,
}

/// Result of a committed mutation plus the draft total afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    pub outcome: T,
    /// Zero once the draft is gone.
    pub order_total: f64,
}

#[derive(Clone)]
pub struct OrderEngine {
    sessions: SessionClient,
    catalog: Arc<MenuCatalog>,
    tax_rate: f64,
    max_retries: u32,
}

impl OrderEngine {
    pub fn new(
        sessions: SessionClient,
        catalog: Arc<MenuCatalog>,
        tax_rate: f64,
        max_retries: u32,
    ) -> Self {
        Self {
            sessions,
            catalog,
            tax_rate,
            max_retries,
        }
    }

    pub fn sessions(&self) -> &SessionClient {
        &self.sessions
    }

    pub fn catalog(&self) -> &Arc<MenuCatalog> {
        &self.catalog
    }

    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    /// Loads the session, creating it on first contact.
    pub async fn session(
        &self,
        ctx: &SessionContext,
    ) -> Result<Versioned<ChatSession>, EngineError> {
        Ok(self
            .sessions
            .get_or_create(ctx.session_id.clone(), ctx.create_params())
            .await?)
    }

    /// The current draft, `None` when the cart is empty.
    pub async fn current_order(&self, ctx: &SessionContext) -> Result<Option<OrderDraft>, EngineError> {
        Ok(self.session(ctx).await?.entity.current_order)
    }

    /// Adds `request.quantity` of a menu item, merging into an existing line.
    #[instrument(skip(self, ctx), fields(session_id = %ctx.session_id))]
    pub async fn add_item(
        &self,
        ctx: &SessionContext,
        request: AddRequest,
    ) -> Result<Applied<DraftLineItem>, EngineError> {
        let menu = self.catalog.menu(&ctx.restaurant_id).await?;
        let Some(item) = resolve_in(&menu, &request.reference) else {
            debug!(reference = %request.reference, "No menu match");
            return Err(EngineError::ItemNotInMenu {
                reference: request.reference,
                available: menu.iter().map(|i| i.name.en.clone()).collect(),
            });
        };

        let tax_rate = self.tax_rate;
        let applied = self
            .mutate(ctx, |draft| {
                Ok(draft.add(
                    LineAddition {
                        item,
                        quantity: request.quantity,
                        modifiers: request.modifiers.clone(),
                        special_instructions: request.special_instructions.clone(),
                    },
                    tax_rate,
                )?)
            })
            .await?;
        info!(item_id = %item.id, quantity = applied.outcome.quantity, "Added to order");
        Ok(applied)
    }

    #[instrument(skip(self, ctx), fields(session_id = %ctx.session_id))]
    pub async fn remove_item(
        &self,
        ctx: &SessionContext,
        selector: &LineSelector,
    ) -> Result<Applied<DraftLineItem>, EngineError> {
        let tax_rate = self.tax_rate;
        let applied = self
            .mutate(ctx, |draft| {
                if draft.is_empty() {
                    return Err(EngineError::EmptyOrder);
                }
                draft
                    .remove(selector, tax_rate)
                    .ok_or(EngineError::LineNotFound)
            })
            .await?;
        info!(item_id = %applied.outcome.menu_item_id, "Removed from order");
        Ok(applied)
    }

    /// Replaces quantity, modifiers or instructions of one line. A quantity
    /// of zero or less removes the line.
    #[instrument(skip(self, ctx), fields(session_id = %ctx.session_id))]
    pub async fn modify_item(
        &self,
        ctx: &SessionContext,
        selector: &LineSelector,
        edit: LineEdit,
    ) -> Result<Applied<EditOutcome>, EngineError> {
        let tax_rate = self.tax_rate;
        self.mutate(ctx, |draft| {
            if draft.is_empty() {
                return Err(EngineError::EmptyOrder);
            }
            draft
                .edit(selector, edit.clone(), tax_rate)?
                .ok_or(EngineError::LineNotFound)
        })
        .await
    }

    /// Runs `apply` against the latest draft until the conditional write
    /// lands or the retry budget is spent. `apply` may run more than once
    /// and must not have side effects.
    async fn mutate<T>(
        &self,
        ctx: &SessionContext,
        mut apply: impl FnMut(&mut OrderDraft) -> Result<T, EngineError>,
    ) -> Result<Applied<T>, EngineError> {
        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            let stored = self.session(ctx).await?;
            let mut draft = stored.entity.current_order.unwrap_or_default();
            let outcome = apply(&mut draft)?;
            let order_total = draft.total;

            match self
                .sessions
                .replace_order(ctx.session_id.clone(), stored.version, draft.into_option())
                .await
            {
                Ok(_) => return Ok(Applied { outcome, order_total }),
                Err(SessionError::VersionConflict { expected, actual, .. }) => {
                    warn!(
                        session_id = %ctx.session_id,
                        attempt, expected, actual, "Draft changed concurrently, retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(EngineError::RetriesExhausted {
            session_id: ctx.session_id.clone(),
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::demo_catalog;
    use crate::model::round2;
    use crate::session_actor;
    use actor_framework::mock::MockClient;
    use actor_framework::FrameworkError;
    use chrono::Utc;

    const TAX: f64 = 0.08;

    fn ctx(session_id: &str) -> SessionContext {
        SessionContext {
            session_id: session_id.to_string(),
            restaurant_id: "demo_restaurant".to_string(),
            table_id: "table_5".to_string(),
            language: Language::En,
            customer_id: None,
        }
    }

    fn add(reference: &str, quantity: u32) -> AddRequest {
        AddRequest {
            reference: reference.to_string(),
            quantity,
            modifiers: vec![],
            special_instructions: None,
        }
    }

    fn by_menu_id(id: &str) -> LineSelector {
        LineSelector {
            order_item_id: None,
            item_id: Some(id.to_string()),
        }
    }

    fn real_engine() -> (OrderEngine, SessionClient, tokio::task::JoinHandle<()>) {
        let (actor, sessions) = session_actor::new(16);
        let handle = tokio::spawn(actor.run(()));
        let engine = OrderEngine::new(sessions.clone(), demo_catalog("demo_restaurant"), TAX, 3);
        (engine, sessions, handle)
    }

    #[tokio::test]
    async fn test_salmon_scenario() {
        let (engine, _sessions, _handle) = real_engine();
        let ctx = ctx("s1");

        let added = engine.add_item(&ctx, add("grilled-salmon", 2)).await.unwrap();
        assert_eq!(added.outcome.quantity, 2);
        assert_eq!(added.order_total, round2(49.98 + round2(49.98 * TAX)));

        let added = engine.add_item(&ctx, add("Grilled Salmon", 1)).await.unwrap();
        assert_eq!(added.outcome.quantity, 3);

        let draft = engine.current_order(&ctx).await.unwrap().unwrap();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.subtotal, 74.97);

        let removed = engine
            .remove_item(&ctx, &by_menu_id("grilled-salmon"))
            .await
            .unwrap();
        assert_eq!(removed.outcome.quantity, 3);
        assert_eq!(removed.order_total, 0.0);
        assert_eq!(engine.current_order(&ctx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejections_leave_draft_untouched() {
        let (engine, _sessions, _handle) = real_engine();
        let ctx = ctx("s2");

        let err = engine.remove_item(&ctx, &by_menu_id("tiramisu")).await.unwrap_err();
        assert_eq!(err, EngineError::EmptyOrder);

        engine.add_item(&ctx, add("tiramisu", 1)).await.unwrap();
        let before = engine.current_order(&ctx).await.unwrap();

        let err = engine.add_item(&ctx, add("lobster", 1)).await.unwrap_err();
        assert!(err.is_rejection());
        assert!(err
            .to_string()
            .starts_with("Item not found in menu. Looking for: lobster. Available items: Caesar Salad, Tomato Soup"));

        let err = engine.remove_item(&ctx, &by_menu_id("iced-tea")).await.unwrap_err();
        assert_eq!(err, EngineError::LineNotFound);

        assert_eq!(engine.current_order(&ctx).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_modify_zero_quantity_removes_and_collapses() {
        let (engine, _sessions, _handle) = real_engine();
        let ctx = ctx("s3");
        let line = engine.add_item(&ctx, add("iced-tea", 2)).await.unwrap().outcome;

        let selector = LineSelector {
            order_item_id: Some(line.id.clone()),
            item_id: None,
        };
        let updated = engine
            .modify_item(
                &ctx,
                &selector,
                LineEdit {
                    quantity: Some(5),
                    ..LineEdit::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(updated.outcome, EditOutcome::Updated(ref l) if l.quantity == 5));
        assert_eq!(updated.order_total, round2(19.95 + round2(19.95 * TAX)));

        let removed = engine
            .modify_item(
                &ctx,
                &selector,
                LineEdit {
                    quantity: Some(0),
                    ..LineEdit::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(removed.outcome, EditOutcome::Removed(_)));
        assert_eq!(engine.current_order(&ctx).await.unwrap(), None);
    }

    fn stored(version: u64, draft: Option<OrderDraft>) -> Versioned<ChatSession> {
        Versioned {
            version,
            entity: ChatSession {
                id: "s4".to_string(),
                restaurant_id: "demo_restaurant".to_string(),
                table_id: "table_5".to_string(),
                language: Language::En,
                customer_id: None,
                current_order: draft,
                messages: vec![],
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        }
    }

    fn conflict(expected: u64, actual: u64) -> FrameworkError {
        FrameworkError::VersionConflict {
            id: "s4".to_string(),
            expected,
            actual,
        }
    }

    #[tokio::test]
    async fn test_conflict_rereads_and_keeps_concurrent_line() {
        let catalog = demo_catalog("demo_restaurant");
        let menu = catalog.menu("demo_restaurant").await.unwrap();
        let tea = menu.iter().find(|i| i.id == "iced-tea").unwrap();
        let mut concurrent = OrderDraft::default();
        concurrent.add(
            LineAddition {
                item: tea,
                quantity: 1,
                modifiers: vec![],
                special_instructions: None,
            },
            TAX,
        )
        .unwrap();

        let mut mock = MockClient::<ChatSession>::new();
        let id = "s4".to_string();
        mock.expect_get_or_create(id.clone()).return_ok(stored(1, None));
        mock.expect_update(id.clone()).return_err(conflict(1, 2));
        mock.expect_get_or_create(id.clone())
            .return_ok(stored(2, Some(concurrent)));
        mock.expect_update(id.clone()).return_ok(stored(3, None));

        let engine = OrderEngine::new(SessionClient::new(mock.client()), catalog, TAX, 3);
        let added = engine.add_item(&ctx("s4"), add("cappuccino", 1)).await.unwrap();

        // tea from the concurrent writer plus the cappuccino
        let subtotal = round2(3.99 + 5.99);
        assert_eq!(added.order_total, round2(subtotal + round2(subtotal * TAX)));
        mock.verify();
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let mut mock = MockClient::<ChatSession>::new();
        let id = "s4".to_string();
        for version in 1..=3 {
            mock.expect_get_or_create(id.clone())
                .return_ok(stored(version, None));
            mock.expect_update(id.clone())
                .return_err(conflict(version, version + 1));
        }

        let engine = OrderEngine::new(
            SessionClient::new(mock.client()),
            demo_catalog("demo_restaurant"),
            TAX,
            2,
        );
        let err = engine.add_item(&ctx("s4"), add("tiramisu", 1)).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::RetriesExhausted {
                session_id: "s4".to_string(),
                attempts: 3
            }
        );
        mock.verify();
    }
}
