use super::{round2, LocalizedText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Delivered,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Delivered,
        OrderStatus::Paid,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
                format!("Invalid status. Must be one of: {}", valid.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub menu_item_id: String,
    pub name: LocalizedText,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub special_instructions: Option<String>,
}

/// A submitted order. Created once from a draft or a cart and never turned
/// back into a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    pub table_id: String,
    pub session_id: Option<String>,
    pub customer_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub special_instructions: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// `subtotal + tax + tip`, to the cent.
    pub fn grand_total(subtotal: f64, tax: f64, tip: f64) -> f64 {
        round2(subtotal + tax + tip)
    }

    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        match status {
            OrderStatus::Confirmed => self.confirmed_at = Some(now),
            OrderStatus::Paid | OrderStatus::Delivered => self.completed_at = Some(now),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderCreate {
    pub restaurant_id: String,
    pub table_id: String,
    pub session_id: Option<String>,
    pub customer_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderUpdate {
    Status(OrderStatus),
    Payment {
        status: PaymentStatus,
        method: Option<String>,
    },
    Tip(f64),
    Cancel {
        reason: Option<String>,
    },
}
