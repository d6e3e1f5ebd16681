//! # Menu Catalog
//!
//! Read-through cache of each restaurant's menu in front of a
//! [`MenuSource`]. Entries expire after a fixed TTL; there is no eviction,
//! so the cache holds one entry per restaurant ever asked for.
//!
//! A restaurant with no items at all gets the demo menu seeded on first
//! load, once.
//!
//! Time comes from [`tokio::time::Instant`], so tests can drive expiry with
//! a paused clock.

use crate::menu_actor::MenuError;
use crate::model::MenuItem;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Where menus are loaded from.
#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn load_menu(&self, restaurant_id: &str) -> Result<Vec<MenuItem>, MenuError>;

    /// Stores the demo menu for `restaurant_id`, returning how many items
    /// were added.
    async fn seed_demo_menu(&self, restaurant_id: &str) -> Result<usize, MenuError>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Menu store error: {0}")]
    Store(#[from] MenuError),
}

struct CachedMenu {
    items: Arc<Vec<MenuItem>>,
    loaded_at: Instant,
}

pub struct MenuCatalog {
    source: Arc<dyn MenuSource>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedMenu>>,
}

impl MenuCatalog {
    pub fn new(source: Arc<dyn MenuSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The restaurant's menu, from cache while it is fresh.
    #[instrument(skip(self))]
    pub async fn menu(&self, restaurant_id: &str) -> Result<Arc<Vec<MenuItem>>, CatalogError> {
        if let Some(cached) = self.entries.read().await.get(restaurant_id) {
            if cached.loaded_at.elapsed() < self.ttl {
                debug!(items = cached.items.len(), "Cache hit");
                return Ok(cached.items.clone());
            }
        }

        let mut items = self.source.load_menu(restaurant_id).await?;
        if items.is_empty() {
            let added = self.source.seed_demo_menu(restaurant_id).await?;
            info!(added, "Seeded empty menu");
            items = self.source.load_menu(restaurant_id).await?;
        }
        debug!(items = items.len(), "Cache refill");

        let items = Arc::new(items);
        self.entries.write().await.insert(
            restaurant_id.to_string(),
            CachedMenu {
                items: items.clone(),
                loaded_at: Instant::now(),
            },
        );
        Ok(items)
    }

    /// Looks an item up by id, falling back to a name match.
    pub async fn resolve(
        &self,
        restaurant_id: &str,
        reference: &str,
    ) -> Result<Option<MenuItem>, CatalogError> {
        let menu = self.menu(restaurant_id).await?;
        Ok(resolve_in(&menu, reference).cloned())
    }

    /// Exact id lookup.
    pub async fn find(
        &self,
        restaurant_id: &str,
        item_id: &str,
    ) -> Result<Option<MenuItem>, CatalogError> {
        let menu = self.menu(restaurant_id).await?;
        Ok(menu.iter().find(|item| item.id == item_id).cloned())
    }

    /// Drops the cached menu so the next read goes to the source.
    pub async fn invalidate(&self, restaurant_id: &str) {
        self.entries.write().await.remove(restaurant_id);
    }
}

/// Exact id first, then an exact name, then a name containing `reference`.
/// Names are compared case-insensitively in both languages.
pub fn resolve_in<'a>(items: &'a [MenuItem], reference: &str) -> Option<&'a MenuItem> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    let lowered = reference.to_lowercase();
    items
        .iter()
        .find(|item| item.id == reference)
        .or_else(|| {
            items.iter().find(|item| {
                item.name.en.to_lowercase() == lowered || item.name.es.to_lowercase() == lowered
            })
        })
        .or_else(|| items.iter().find(|item| item.name.contains_ignore_case(reference)))
}

/// In-memory [`MenuSource`] for unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::menu_actor::seed;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Counts calls. Starts empty unless built with [`CountingSource::with_demo_menu`],
    /// and seeding fills it with the demo menu.
    #[derive(Default)]
    pub struct CountingSource {
        pub loads: AtomicUsize,
        pub seeds: AtomicUsize,
        pub items: Mutex<Vec<MenuItem>>,
        pub fail: bool,
    }

    impl CountingSource {
        pub fn with_demo_menu(restaurant_id: &str) -> Self {
            let source = Self::default();
            *source.items.lock().unwrap() = seed::demo_items(restaurant_id);
            source
        }

        pub fn loads(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }

        pub fn seeds(&self) -> usize {
            self.seeds.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MenuSource for CountingSource {
        async fn load_menu(&self, _restaurant_id: &str) -> Result<Vec<MenuItem>, MenuError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MenuError::ActorCommunicationError("Actor closed".into()));
            }
            Ok(self.items.lock().unwrap().clone())
        }

        async fn seed_demo_menu(&self, restaurant_id: &str) -> Result<usize, MenuError> {
            self.seeds.fetch_add(1, Ordering::SeqCst);
            let seeded = seed::demo_items(restaurant_id);
            let added = seeded.len();
            *self.items.lock().unwrap() = seeded;
            Ok(added)
        }
    }

    /// A catalog over the demo menu with a five minute TTL.
    pub fn demo_catalog(restaurant_id: &str) -> Arc<MenuCatalog> {
        Arc::new(MenuCatalog::new(
            Arc::new(CountingSource::with_demo_menu(restaurant_id)),
            Duration::from_secs(300),
        ))
    }
}
