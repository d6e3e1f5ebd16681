//! # Order Client
//!
//! Creates finalized orders and drives them through status, payment and tip
//! changes.

use crate::model::{Order, OrderCreate, OrderStatus, OrderUpdate};
use crate::order_actor::OrderError;
use actor_framework::{ActorClient, FrameworkError, Predicate, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Which orders to list. Every set field must match.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub customer_id: Option<String>,
    pub session_id: Option<String>,
    pub restaurant_id: Option<String>,
    /// Empty means any status.
    pub statuses: Vec<OrderStatus>,
    pub limit: usize,
}

impl OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        let same = |wanted: &Option<String>, actual: Option<&str>| {
            wanted.as_deref().map_or(true, |w| actual == Some(w))
        };
        same(&self.customer_id, order.customer_id.as_deref())
            && same(&self.session_id, order.session_id.as_deref())
            && same(&self.restaurant_id, Some(order.restaurant_id.as_str()))
            && (self.statuses.is_empty() || self.statuses.contains(&order.status))
    }
}

#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Stores a new order and returns it as persisted.
    #[instrument(skip(self, params), fields(table_id = %params.table_id))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        debug!(?params, "create_order called");
        let id = self.inner.create(params).await.map_err(OrderError::from)?;
        info!(order_id = %id, "Order created");
        self.inner
            .get(id.clone())
            .await
            .map_err(OrderError::from)?
            .map(|stored| stored.into_inner())
            .ok_or(OrderError::NotFound(id))
    }

    /// Orders matching `filter`, newest first, at most `filter.limit`.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let limit = filter.limit;
        let mut orders: Vec<Order> = self
            .inner
            .query(Predicate::new(move |order: &Order| filter.matches(order)))
            .await
            .map_err(OrderError::from)?
            .into_iter()
            .map(|stored| stored.into_inner())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit);
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn update_order(&self, id: String, update: OrderUpdate) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner
            .update(id, update)
            .await
            .map(|stored| stored.into_inner())
            .map_err(OrderError::from)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        OrderError::from(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocalizedText, OrderItem};
    use crate::order_actor;
    use actor_framework::mock::MockClient;

    fn params(restaurant: &str, session: &str) -> OrderCreate {
        OrderCreate {
            restaurant_id: restaurant.to_string(),
            table_id: "table_1".to_string(),
            session_id: Some(session.to_string()),
            customer_id: None,
            items: vec![OrderItem {
                id: "l1".to_string(),
                menu_item_id: "iced-tea".to_string(),
                name: LocalizedText::new("Iced Tea", "Te Helado"),
                price: 3.99,
                quantity: 1,
                modifiers: vec![],
                special_instructions: None,
            }],
            subtotal: 3.99,
            tax: 0.32,
            tip: 0.0,
            special_instructions: None,
        }
    }

    #[tokio::test]
    async fn test_list_filters_sorts_and_limits() {
        let (actor, client) = order_actor::new(16);
        let handle = tokio::spawn(actor.run(()));

        let first = client.create_order(params("r1", "s1")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = client.create_order(params("r1", "s1")).await.unwrap();
        client.create_order(params("r2", "s9")).await.unwrap();
        client
            .update_order(first.id.clone(), OrderUpdate::Status(OrderStatus::Confirmed))
            .await
            .unwrap();

        let all_r1 = client
            .list_orders(OrderFilter {
                restaurant_id: Some("r1".to_string()),
                limit: 20,
                ..OrderFilter::default()
            })
            .await
            .unwrap();
        let ids: Vec<_> = all_r1.iter().map(|o| o.id.clone()).collect();
        assert_eq!(ids, [second.id.clone(), first.id.clone()]);

        let confirmed = client
            .list_orders(OrderFilter {
                session_id: Some("s1".to_string()),
                statuses: vec![OrderStatus::Confirmed],
                limit: 20,
                ..OrderFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert!(confirmed[0].confirmed_at.is_some());

        let limited = client
            .list_orders(OrderFilter {
                restaurant_id: Some("r1".to_string()),
                limit: 1,
                ..OrderFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_no_items_surfaces_as_domain_error() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_create()
            .return_err(FrameworkError::EntityError(Box::new(OrderError::NoItems)));

        let client = OrderClient::new(mock.client());
        let err = client.create_order(params("r1", "s1")).await.unwrap_err();
        assert_eq!(err, OrderError::NoItems);
        mock.verify();
    }

    #[tokio::test]
    async fn test_update_unknown_order_is_not_found() {
        let (actor, client) = order_actor::new(4);
        let handle = tokio::spawn(actor.run(()));

        let err = client
            .update_order("order_missing".to_string(), OrderUpdate::Tip(2.0))
            .await
            .unwrap_err();
        assert_eq!(err, OrderError::NotFound("order_missing".to_string()));

        drop(client);
        handle.await.unwrap();
    }
}
