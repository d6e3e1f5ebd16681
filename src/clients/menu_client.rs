//! # Menu Client
//!
//! High-level API over the Menu actor. The ordering flow reads menus through
//! [`MenuCatalog`](crate::catalog::MenuCatalog), which uses this client as
//! its [`MenuSource`].

use crate::catalog::MenuSource;
use crate::menu_actor::{seed, MenuError, MenuItemKey};
use crate::model::{category, Availability, MenuItem, MenuItemCreate, MenuItemUpdate};
use actor_framework::{ActorClient, FrameworkError, Predicate, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct MenuClient {
    inner: ResourceClient<MenuItem>,
}

impl MenuClient {
    pub fn new(inner: ResourceClient<MenuItem>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params))]
    pub async fn insert_item(
        &self,
        key: MenuItemKey,
        params: MenuItemCreate,
    ) -> Result<MenuItem, MenuError> {
        debug!(?params, "Sending request");
        self.inner
            .insert(key, params)
            .await
            .map(|stored| stored.into_inner())
            .map_err(MenuError::from)
    }

    /// Every item of one restaurant, ordered by category then `sort_order`.
    #[instrument(skip(self))]
    pub async fn list_items(&self, restaurant_id: &str) -> Result<Vec<MenuItem>, MenuError> {
        debug!("Sending request");
        let owner = restaurant_id.to_string();
        let mut items: Vec<MenuItem> = self
            .inner
            .query(Predicate::new(move |item: &MenuItem| item.restaurant_id == owner))
            .await
            .map_err(MenuError::from)?
            .into_iter()
            .map(|stored| stored.into_inner())
            .collect();
        items.sort_by(|a, b| {
            let key = |item: &MenuItem| (category::rank(&item.category_id), item.sort_order);
            key(a).cmp(&key(b)).then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn set_availability(
        &self,
        key: MenuItemKey,
        availability: Availability,
    ) -> Result<MenuItem, MenuError> {
        debug!("Sending request");
        let update = MenuItemUpdate {
            availability: Some(availability),
            ..MenuItemUpdate::default()
        };
        self.inner
            .update(key, update)
            .await
            .map(|stored| stored.into_inner())
            .map_err(MenuError::from)
    }

    /// Files the demo menu under `restaurant_id`. Items that already exist
    /// are left alone. Returns how many items were added.
    #[instrument(skip(self))]
    pub async fn seed_demo(&self, restaurant_id: &str) -> Result<usize, MenuError> {
        let mut added = 0;
        for (key, params) in seed::demo_menu(restaurant_id) {
            match self.insert_item(key, params).await {
                Ok(_) => added += 1,
                Err(MenuError::AlreadyExists(id)) => debug!(%id, "Already seeded"),
                Err(e) => return Err(e),
            }
        }
        info!(restaurant_id, added, "Seeded demo menu");
        Ok(added)
    }
}

#[async_trait]
impl ActorClient<MenuItem> for MenuClient {
    type Error = MenuError;

    fn inner(&self) -> &ResourceClient<MenuItem> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        MenuError::from(e)
    }
}

#[async_trait]
impl MenuSource for MenuClient {
    async fn load_menu(&self, restaurant_id: &str) -> Result<Vec<MenuItem>, MenuError> {
        self.list_items(restaurant_id).await
    }

    async fn seed_demo_menu(&self, restaurant_id: &str) -> Result<usize, MenuError> {
        self.seed_demo(restaurant_id).await
    }
}
