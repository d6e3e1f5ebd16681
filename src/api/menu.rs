use super::{AppError, AppState};
use crate::menu_actor::MenuItemKey;
use crate::model::{Availability, MenuItem};
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuQuery {
    pub restaurant_id: Option<String>,
    pub category_id: Option<String>,
    pub available_only: bool,
}

#[derive(Debug, Serialize)]
pub struct MenuItems {
    pub items: Vec<MenuItem>,
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<MenuQuery>, QueryRejection>,
) -> Result<Json<MenuItems>, AppError> {
    let Query(query) = query?;
    let Some(restaurant_id) = query.restaurant_id.filter(|id| !id.trim().is_empty()) else {
        return Err(AppError::BadRequest("Restaurant ID required".into()));
    };

    let menu = state.catalog.menu(&restaurant_id).await?;
    let items = menu
        .iter()
        .filter(|item| {
            query
                .category_id
                .as_deref()
                .map_or(true, |category| item.category_id == category)
        })
        .filter(|item| !query.available_only || item.is_available())
        .cloned()
        .collect();
    Ok(Json(MenuItems { items }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityChange {
    pub restaurant_id: String,
    pub item_id: String,
    pub is_available: bool,
    #[serde(default)]
    pub stock_count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedItem {
    pub success: bool,
    pub item: MenuItem,
}

/// Marks an item (un)available and drops the cached menu so the assistant
/// sees the change on its next turn.
pub async fn set_availability(
    State(state): State<AppState>,
    payload: Result<Json<AvailabilityChange>, JsonRejection>,
) -> Result<Json<UpdatedItem>, AppError> {
    let Json(change) = payload?;
    let item = state
        .menu
        .set_availability(
            MenuItemKey::new(&change.restaurant_id, change.item_id),
            Availability {
                is_available: change.is_available,
                stock_count: change.stock_count,
            },
        )
        .await?;
    state.catalog.invalidate(&change.restaurant_id).await;
    Ok(Json(UpdatedItem {
        success: true,
        item,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedRequest {
    pub restaurant_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seeded {
    pub success: bool,
    pub message: &'static str,
    pub restaurant_id: String,
    pub added: usize,
}

pub async fn seed(State(state): State<AppState>, body: Bytes) -> Result<Json<Seeded>, AppError> {
    let request: SeedRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SeedRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {e}")))?
    };
    let restaurant_id = request
        .restaurant_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| state.default_restaurant_id.clone());

    let added = state.menu.seed_demo(&restaurant_id).await?;
    state.catalog.invalidate(&restaurant_id).await;
    info!(%restaurant_id, added, "Seed requested");
    Ok(Json(Seeded {
        success: true,
        message: "Data seeded successfully",
        restaurant_id,
        added,
    }))
}
