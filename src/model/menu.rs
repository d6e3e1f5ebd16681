use super::Language;
use serde::{Deserialize, Serialize};

/// Category ids the recommendation rules know about.
pub mod category {
    pub const STARTERS: &str = "starters";
    pub const MAINS: &str = "mains";
    pub const DESSERTS: &str = "desserts";
    pub const DRINKS: &str = "drinks";

    /// Menu position of a category; unknown categories go last.
    pub fn rank(category_id: &str) -> usize {
        [STARTERS, MAINS, DESSERTS, DRINKS]
            .iter()
            .position(|c| *c == category_id)
            .unwrap_or(usize::MAX)
    }
}

/// A display string carried in both supported languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub es: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, es: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            es: es.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Es => &self.es,
        }
    }

    /// Case-insensitive substring match against either language.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.en.to_lowercase().contains(&needle) || self.es.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub is_available: bool,
    pub stock_count: Option<u32>,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            is_available: true,
            stock_count: None,
        }
    }
}

/// A dish or drink on a restaurant's menu. Read-only to the ordering flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub restaurant_id: String,
    pub category_id: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: f64,
    pub image_url: Option<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub dietary_flags: Vec<String>,
    pub preparation_time: u32,
    pub calories: Option<u32>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub availability: Availability,
    pub sort_order: u32,
}

impl MenuItem {
    pub fn is_available(&self) -> bool {
        self.availability.is_available
    }
}

/// Payload for storing a menu item. The id is chosen by the caller.
#[derive(Debug, Clone)]
pub struct MenuItemCreate {
    pub restaurant_id: String,
    pub category_id: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: f64,
    pub allergens: Vec<String>,
    pub dietary_flags: Vec<String>,
    pub preparation_time: u32,
    pub ingredients: Vec<String>,
    pub sort_order: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MenuItemUpdate {
    pub price: Option<f64>,
    pub availability: Option<Availability>,
}
