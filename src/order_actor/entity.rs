//! [`ActorEntity`] implementation for [`Order`].

use super::OrderError;
use crate::model::{Order, OrderCreate, OrderStatus, OrderUpdate, PaymentStatus};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl ActorEntity for Order {
    type Id = String;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = OrderError;

    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::NoItems);
        }
        if params.restaurant_id.is_empty() || params.table_id.is_empty() {
            return Err(OrderError::ValidationError(
                "restaurantId and tableId are required".to_string(),
            ));
        }
        validate_tip(params.tip)?;

        let now = Utc::now();
        Ok(Self {
            id,
            restaurant_id: params.restaurant_id,
            table_id: params.table_id,
            session_id: params.session_id,
            customer_id: params.customer_id,
            items: params.items,
            subtotal: params.subtotal,
            tax: params.tax,
            tip: params.tip,
            total: Order::grand_total(params.subtotal, params.tax, params.tip),
            status: OrderStatus::Pending,
            payment_method: None,
            payment_status: PaymentStatus::Pending,
            special_instructions: params.special_instructions,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            completed_at: None,
        })
    }

    /// # Updates
    /// - `Status`: moves the order, stamping `confirmed_at`/`completed_at`
    /// - `Payment`: a completed payment also marks the order paid
    /// - `Tip`: replaces the tip and the grand total
    /// - `Cancel`: records the reason
    async fn on_update(&mut self, update: OrderUpdate, _ctx: &()) -> Result<(), OrderError> {
        let now = Utc::now();
        match update {
            OrderUpdate::Status(status) => self.set_status(status, now),
            OrderUpdate::Payment { status, method } => {
                self.payment_status = status;
                if method.is_some() {
                    self.payment_method = method;
                }
                if status == PaymentStatus::Completed {
                    self.set_status(OrderStatus::Paid, now);
                }
            }
            OrderUpdate::Tip(tip) => {
                validate_tip(tip)?;
                self.tip = tip;
                self.total = Order::grand_total(self.subtotal, self.tax, tip);
            }
            OrderUpdate::Cancel { reason } => {
                if self.status == OrderStatus::Paid {
                    return Err(OrderError::ValidationError(format!(
                        "order {} is already paid",
                        self.id
                    )));
                }
                self.set_status(OrderStatus::Cancelled, now);
                self.cancellation_reason = reason;
            }
        }
        self.updated_at = now;
        Ok(())
    }

    // No actions: every change goes through create/update.
    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), OrderError> {
        Ok(())
    }
}

fn validate_tip(tip: f64) -> Result<(), OrderError> {
    if tip.is_finite() && tip >= 0.0 {
        Ok(())
    } else {
        Err(OrderError::ValidationError(format!("invalid tip {tip}")))
    }
}
