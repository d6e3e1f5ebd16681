//! # Checkout Handoff
//!
//! Turns a session draft, or a cart sent by the menu page, into a persisted
//! [`Order`], and drives the order afterwards.
//!
//! ```text
//! session draft ──┐
//!                 ├──▶ OrderCreate ──▶ Order actor ──▶ clear draft (if unchanged)
//! direct cart ────┘
//! ```
//!
//! The draft is cleared only after the order exists, with a conditional
//! write against the version that was read. If the customer added something
//! in between, the newer draft stays.

use crate::clients::{OrderClient, OrderFilter, SessionClient};
use crate::model::{
    round2, DraftLineItem, LocalizedText, Order, OrderCreate, OrderItem, OrderStatus, OrderUpdate,
    PaymentStatus,
};
use crate::order_actor::OrderError;
use crate::session_actor::SessionError;
use actor_framework::ActorClient;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const DEFAULT_LIST_LIMIT: usize = 20;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Missing required fields: {0}")]
    MissingFields(&'static str),

    #[error("No items in order")]
    NoItems,

    #[error("No items provided. Either provide items directly or a sessionId with items.")]
    NothingToSubmit,

    #[error("Must provide customerId, sessionId, or restaurantId")]
    MissingOwner,

    #[error("{0}")]
    InvalidStatus(String),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutSource {
    #[default]
    Chat,
    Menu,
}

/// A cart line sent by the menu page. Prices are taken as given; totals
/// are not.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub menu_item_id: String,
    pub name: LocalizedText,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutRequest {
    pub session_id: Option<String>,
    pub restaurant_id: String,
    pub table_id: String,
    pub customer_id: Option<String>,
    pub tip: f64,
    pub special_instructions: Option<String>,
    pub source: CheckoutSource,
    pub items: Vec<CartLine>,
}

/// Listing parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderQuery {
    pub customer_id: Option<String>,
    pub session_id: Option<String>,
    pub restaurant_id: Option<String>,
    /// Comma separated.
    pub status: Option<String>,
    pub limit: Option<usize>,
}

impl OrderQuery {
    /// Only the first of customer, session and restaurant is used.
    fn filter(self) -> Result<OrderFilter, CheckoutError> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let mut filter = OrderFilter {
            limit: self.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            statuses: parse_statuses(self.status.as_deref())?,
            ..OrderFilter::default()
        };
        if let Some(customer_id) = present(self.customer_id) {
            filter.customer_id = Some(customer_id);
        } else if let Some(session_id) = present(self.session_id) {
            filter.session_id = Some(session_id);
        } else if let Some(restaurant_id) = present(self.restaurant_id) {
            filter.restaurant_id = Some(restaurant_id);
        } else {
            return Err(CheckoutError::MissingOwner);
        }
        Ok(filter)
    }
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<OrderStatus>, CheckoutError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(CheckoutError::InvalidStatus))
        .collect()
}

fn order_item(line: &DraftLineItem) -> OrderItem {
    OrderItem {
        id: Uuid::new_v4().to_string(),
        menu_item_id: line.menu_item_id.clone(),
        name: line.name.clone(),
        price: line.price,
        quantity: line.quantity,
        modifiers: line.modifiers.clone(),
        special_instructions: line.special_instructions.clone(),
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    orders: OrderClient,
    sessions: SessionClient,
    tax_rate: f64,
}

impl CheckoutService {
    pub fn new(orders: OrderClient, sessions: SessionClient, tax_rate: f64) -> Self {
        Self {
            orders,
            sessions,
            tax_rate,
        }
    }

    /// Creates an order from the request's cart (`source = menu`) or from
    /// its session's draft.
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id, table_id = %request.table_id))]
    pub async fn submit(&self, request: CheckoutRequest) -> Result<Order, CheckoutError> {
        if request.restaurant_id.trim().is_empty() || request.table_id.trim().is_empty() {
            return Err(CheckoutError::MissingFields("restaurantId, tableId"));
        }
        let session_id = request.session_id.clone().filter(|s| !s.trim().is_empty());

        if request.source == CheckoutSource::Menu && !request.items.is_empty() {
            return self.submit_cart(request, session_id).await;
        }
        let Some(session_id) = session_id else {
            return Err(CheckoutError::NothingToSubmit);
        };

        let session = self
            .sessions
            .get(session_id.clone())
            .await?
            .ok_or(CheckoutError::NoItems)?;
        let version = session.version;
        let Some(draft) = session.entity.current_order.filter(|d| !d.is_empty()) else {
            return Err(CheckoutError::NoItems);
        };

        let order = self
            .orders
            .create_order(OrderCreate {
                restaurant_id: request.restaurant_id,
                table_id: request.table_id,
                session_id: Some(session_id.clone()),
                customer_id: request.customer_id,
                items: draft.items.iter().map(order_item).collect(),
                subtotal: draft.subtotal,
                tax: draft.tax,
                tip: request.tip,
                special_instructions: request.special_instructions,
            })
            .await?;
        info!(order_id = %order.id, total = order.total, "Draft submitted");

        match self
            .sessions
            .replace_order(session_id.clone(), version, None)
            .await
        {
            Ok(_) => {}
            Err(SessionError::VersionConflict { actual, .. }) => {
                warn!(%session_id, read = version, actual, "Draft changed during checkout; keeping it");
            }
            Err(e) => warn!(%session_id, error = %e, "Could not clear draft after checkout"),
        }
        Ok(order)
    }

    async fn submit_cart(
        &self,
        request: CheckoutRequest,
        session_id: Option<String>,
    ) -> Result<Order, CheckoutError> {
        let items: Vec<OrderItem> = request
            .items
            .into_iter()
            .map(|line| OrderItem {
                id: Uuid::new_v4().to_string(),
                menu_item_id: line.menu_item_id,
                name: line.name,
                price: line.price,
                quantity: line.quantity,
                modifiers: Vec::new(),
                special_instructions: None,
            })
            .collect();
        let subtotal = round2(items.iter().map(|i| i.price * f64::from(i.quantity)).sum());
        let tax = round2(subtotal * self.tax_rate);

        let order = self
            .orders
            .create_order(OrderCreate {
                restaurant_id: request.restaurant_id,
                table_id: request.table_id,
                session_id,
                customer_id: request.customer_id,
                items,
                subtotal,
                tax,
                tip: request.tip,
                special_instructions: request.special_instructions,
            })
            .await?;
        info!(order_id = %order.id, total = order.total, "Cart submitted");
        Ok(order)
    }

    pub async fn list(&self, query: OrderQuery) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.orders.list_orders(query.filter()?).await?)
    }

    pub async fn update_status(&self, order_id: &str, status: &str) -> Result<Order, CheckoutError> {
        if order_id.trim().is_empty() || status.trim().is_empty() {
            return Err(CheckoutError::MissingFields("orderId, status"));
        }
        let status: OrderStatus = status.parse().map_err(CheckoutError::InvalidStatus)?;
        Ok(self
            .orders
            .update_order(order_id.to_string(), OrderUpdate::Status(status))
            .await?)
    }

    pub async fn update_payment(
        &self,
        order_id: &str,
        status: PaymentStatus,
        method: Option<String>,
    ) -> Result<Order, CheckoutError> {
        Ok(self
            .orders
            .update_order(order_id.to_string(), OrderUpdate::Payment { status, method })
            .await?)
    }

    pub async fn cancel(&self, order_id: &str, reason: Option<String>) -> Result<Order, CheckoutError> {
        Ok(self
            .orders
            .update_order(order_id.to_string(), OrderUpdate::Cancel { reason })
            .await?)
    }

    pub async fn add_tip(&self, order_id: &str, tip: f64) -> Result<Order, CheckoutError> {
        Ok(self
            .orders
            .update_order(order_id.to_string(), OrderUpdate::Tip(tip))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::demo_catalog;
    use crate::engine::{AddRequest, OrderEngine, SessionContext};
    use crate::model::{ChatSession, Language, LineAddition, OrderDraft};
    use crate::{order_actor, session_actor};
    use actor_framework::mock::MockClient;
    use actor_framework::{FrameworkError, Versioned};
    use chrono::Utc;

    struct Fixture {
        checkout: CheckoutService,
        engine: OrderEngine,
    }

    fn fixture() -> Fixture {
        let (session_actor, sessions) = session_actor::new(16);
        let (order_actor, orders) = order_actor::new(16);
        tokio::spawn(session_actor.run(()));
        tokio::spawn(order_actor.run(()));
        Fixture {
            checkout: CheckoutService::new(orders, sessions.clone(), 0.08),
            engine: OrderEngine::new(sessions, demo_catalog("demo_restaurant"), 0.08, 3),
        }
    }

    fn ctx() -> SessionContext {
        SessionContext {
            session_id: "s1".to_string(),
            restaurant_id: "demo_restaurant".to_string(),
            table_id: "table_2".to_string(),
            language: Language::En,
            customer_id: None,
        }
    }

    fn from_session(tip: f64) -> CheckoutRequest {
        CheckoutRequest {
            session_id: Some("s1".to_string()),
            restaurant_id: "demo_restaurant".to_string(),
            table_id: "table_2".to_string(),
            tip,
            ..CheckoutRequest::default()
        }
    }

    fn add(reference: &str, quantity: u32) -> AddRequest {
        AddRequest {
            reference: reference.to_string(),
            quantity,
            modifiers: vec!["no ice".to_string()],
            special_instructions: None,
        }
    }

    #[tokio::test]
    async fn test_submit_from_session_clears_the_draft() {
        let f = fixture();
        f.engine.add_item(&ctx(), add("grilled-salmon", 2)).await.unwrap();

        let order = f.checkout.submit(from_session(5.0)).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.subtotal, 49.98);
        assert_eq!(order.tax, 4.0);
        assert_eq!(order.total, 58.98);
        assert_eq!(order.items[0].modifiers, ["no ice"]);
        assert_ne!(order.items[0].id, order.items[0].menu_item_id);
        assert_eq!(f.engine.current_order(&ctx()).await.unwrap(), None);

        let again = f.checkout.submit(from_session(0.0)).await.unwrap_err();
        assert_eq!(again, CheckoutError::NoItems);
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let f = fixture();

        let missing = CheckoutRequest {
            table_id: "table_2".to_string(),
            ..CheckoutRequest::default()
        };
        assert_eq!(
            f.checkout.submit(missing).await.unwrap_err(),
            CheckoutError::MissingFields("restaurantId, tableId")
        );

        let nothing = CheckoutRequest {
            restaurant_id: "demo_restaurant".to_string(),
            table_id: "table_2".to_string(),
            ..CheckoutRequest::default()
        };
        assert_eq!(
            f.checkout.submit(nothing).await.unwrap_err(),
            CheckoutError::NothingToSubmit
        );

        assert_eq!(
            f.checkout.submit(from_session(0.0)).await.unwrap_err(),
            CheckoutError::NoItems
        );
    }

    #[tokio::test]
    async fn test_cart_totals_are_recomputed() {
        let f = fixture();
        let request = CheckoutRequest {
            restaurant_id: "demo_restaurant".to_string(),
            table_id: "table_9".to_string(),
            source: CheckoutSource::Menu,
            tip: 1.5,
            items: vec![CartLine {
                menu_item_id: "cappuccino".to_string(),
                name: LocalizedText::new("Cappuccino", "Capuchino"),
                price: 5.99,
                quantity: 3,
            }],
            ..CheckoutRequest::default()
        };

        let order = f.checkout.submit(request).await.unwrap();

        assert_eq!(order.subtotal, 17.97);
        assert_eq!(order.tax, 1.44);
        assert_eq!(order.total, 20.91);
        assert_eq!(order.session_id, None);
    }

    #[tokio::test]
    async fn test_newer_draft_survives_checkout() {
        let menu = crate::menu_actor::seed::demo_items("demo_restaurant");
        let mut draft = OrderDraft::default();
        draft.add(
            LineAddition {
                item: &menu[0],
                quantity: 1,
                modifiers: Vec::new(),
                special_instructions: None,
            },
            0.08,
        )
        .unwrap();
        let now = Utc::now();
        let session = ChatSession {
            id: "s1".to_string(),
            restaurant_id: "demo_restaurant".to_string(),
            table_id: "table_2".to_string(),
            language: Language::En,
            customer_id: None,
            current_order: Some(draft),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let mut mock = MockClient::<ChatSession>::new();
        mock.expect_get("s1".to_string()).return_ok(Some(Versioned {
            version: 4,
            entity: session,
        }));
        mock.expect_update("s1".to_string())
            .return_err(FrameworkError::VersionConflict {
                id: "s1".to_string(),
                expected: 4,
                actual: 5,
            });

        let (order_actor, orders) = order_actor::new(4);
        tokio::spawn(order_actor.run(()));
        let checkout = CheckoutService::new(orders, SessionClient::new(mock.client()), 0.08);

        let order = checkout.submit(from_session(0.0)).await.unwrap();

        assert_eq!(order.items[0].menu_item_id, "caesar-salad");
        mock.verify();
    }

    #[tokio::test]
    async fn test_listing_and_updates() {
        let f = fixture();
        f.engine.add_item(&ctx(), add("iced tea", 1)).await.unwrap();
        let order = f.checkout.submit(from_session(0.0)).await.unwrap();

        assert_eq!(
            f.checkout.list(OrderQuery::default()).await.unwrap_err(),
            CheckoutError::MissingOwner
        );
        let by_session = f
            .checkout
            .list(OrderQuery {
                session_id: Some("s1".to_string()),
                status: Some("pending,confirmed".to_string()),
                ..OrderQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(by_session.len(), 1);
        assert!(matches!(
            f.checkout
                .list(OrderQuery {
                    restaurant_id: Some("demo_restaurant".to_string()),
                    status: Some("lost".to_string()),
                    ..OrderQuery::default()
                })
                .await,
            Err(CheckoutError::InvalidStatus(_))
        ));

        let confirmed = f.checkout.update_status(&order.id, "confirmed").await.unwrap();
        assert!(confirmed.confirmed_at.is_some());
        assert!(matches!(
            f.checkout.update_status(&order.id, "eaten").await,
            Err(CheckoutError::InvalidStatus(_))
        ));

        let tipped = f.checkout.add_tip(&order.id, 2.0).await.unwrap();
        assert_eq!(tipped.total, Order::grand_total(tipped.subtotal, tipped.tax, 2.0));

        let paid = f
            .checkout
            .update_payment(&order.id, PaymentStatus::Completed, Some("card".to_string()))
            .await
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);
        assert!(paid.completed_at.is_some());
        assert!(f.checkout.cancel(&order.id, None).await.is_err());

        assert_eq!(
            f.checkout.update_status("order_missing", "ready").await.unwrap_err(),
            CheckoutError::Order(OrderError::NotFound("order_missing".to_string()))
        );
    }
}
