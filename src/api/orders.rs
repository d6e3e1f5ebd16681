use super::{AppError, AppState};
use crate::checkout::{CheckoutRequest, OrderQuery};
use crate::model::{LocalizedText, Order, OrderItem, OrderStatus, PaymentStatus};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedOrder {
    pub id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub order: SubmittedOrder,
    pub message: &'static str,
}

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(request) = payload?;
    let order = state.checkout.submit(request).await?;
    Ok(Json(SubmitResponse {
        success: true,
        order: SubmittedOrder {
            id: order.id,
            status: order.status,
            items: order.items,
            subtotal: order.subtotal,
            tax: order.tax,
            tip: order.tip,
            total: order.total,
        },
        message: "Order submitted successfully",
    }))
}

#[derive(Debug, Serialize)]
pub struct LineView {
    pub name: LocalizedText,
    pub quantity: u32,
    pub price: f64,
}

/// Listing shape: line items trimmed to what a receipt shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub restaurant_id: String,
    pub table_id: String,
    pub status: OrderStatus,
    pub items: Vec<LineView>,
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            restaurant_id: order.restaurant_id,
            table_id: order.table_id,
            status: order.status,
            items: order
                .items
                .into_iter()
                .map(|item| LineView {
                    name: item.name,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            subtotal: order.subtotal,
            tax: order.tax,
            tip: order.tip,
            total: order.total,
            payment_status: order.payment_status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<OrderView>,
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<OrderQuery>, QueryRejection>,
) -> Result<Json<OrderList>, AppError> {
    let Query(query) = query?;
    let orders = state.checkout.list(query).await?;
    Ok(Json(OrderList {
        orders: orders.into_iter().map(OrderView::from).collect(),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusChange {
    pub order_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct Acknowledged {
    pub success: bool,
    pub message: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    payload: Result<Json<StatusChange>, JsonRejection>,
) -> Result<Json<Acknowledged>, AppError> {
    let Json(change) = payload?;
    let order = state
        .checkout
        .update_status(&change.order_id, &change.status)
        .await?;
    Ok(Json(Acknowledged {
        success: true,
        message: format!("Order status updated to {}", order.status),
    }))
}

#[derive(Debug, Serialize)]
pub struct UpdatedOrder {
    pub success: bool,
    pub order: Order,
}

impl From<Order> for UpdatedOrder {
    fn from(order: Order) -> Self {
        Self {
            success: true,
            order,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChange {
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<String>,
}

pub async fn payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    payload: Result<Json<PaymentChange>, JsonRejection>,
) -> Result<Json<UpdatedOrder>, AppError> {
    let Json(change) = payload?;
    let order = state
        .checkout
        .update_payment(&order_id, change.payment_status, change.payment_method)
        .await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Cancellation {
    pub reason: Option<String>,
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    payload: Result<Json<Cancellation>, JsonRejection>,
) -> Result<Json<UpdatedOrder>, AppError> {
    let Json(cancellation) = payload?;
    let order = state.checkout.cancel(&order_id, cancellation.reason).await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Deserialize)]
pub struct Tip {
    pub tip: f64,
}

pub async fn tip(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    payload: Result<Json<Tip>, JsonRejection>,
) -> Result<Json<UpdatedOrder>, AppError> {
    let Json(Tip { tip }) = payload?;
    let order = state.checkout.add_tip(&order_id, tip).await?;
    Ok(Json(order.into()))
}
