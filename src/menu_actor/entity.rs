//! [`ActorEntity`] implementation for [`MenuItem`].

use super::MenuError;
use crate::model::{MenuItem, MenuItemCreate, MenuItemUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store key for a menu item. Item ids are only unique within a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MenuItemKey {
    pub restaurant_id: String,
    pub item_id: String,
}

impl MenuItemKey {
    pub fn new(restaurant_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            restaurant_id: restaurant_id.into(),
            item_id: item_id.into(),
        }
    }
}

impl fmt::Display for MenuItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.restaurant_id, self.item_id)
    }
}

#[async_trait]
impl ActorEntity for MenuItem {
    type Id = MenuItemKey;
    type Create = MenuItemCreate;
    type Update = MenuItemUpdate;
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = MenuError;

    fn from_create_params(key: MenuItemKey, params: MenuItemCreate) -> Result<Self, MenuError> {
        if params.restaurant_id != key.restaurant_id {
            return Err(MenuError::ValidationError(format!(
                "item {} filed under restaurant {}",
                key, params.restaurant_id
            )));
        }
        if !params.price.is_finite() || params.price < 0.0 {
            return Err(MenuError::ValidationError(format!(
                "invalid price {} for {}",
                params.price, key
            )));
        }
        Ok(Self {
            id: key.item_id,
            restaurant_id: params.restaurant_id,
            category_id: params.category_id,
            name: params.name,
            description: params.description,
            price: params.price,
            image_url: None,
            allergens: params.allergens,
            dietary_flags: params.dietary_flags,
            preparation_time: params.preparation_time,
            calories: None,
            ingredients: params.ingredients,
            availability: Default::default(),
            sort_order: params.sort_order,
        })
    }

    async fn on_update(&mut self, update: MenuItemUpdate, _ctx: &()) -> Result<(), MenuError> {
        if let Some(price) = update.price {
            if !price.is_finite() || price < 0.0 {
                return Err(MenuError::ValidationError(format!("invalid price {price}")));
            }
            self.price = price;
        }
        if let Some(availability) = update.availability {
            self.availability = availability;
        }
        Ok(())
    }

    // No actions: every change goes through create/update.
    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), MenuError> {
        Ok(())
    }
}
