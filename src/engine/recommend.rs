//! Fixed recommendation rules over a restaurant's available items.

use crate::model::{category, MenuItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationKind {
    Popular,
    Pairing,
    /// Any other type the model asks for, e.g. `dietary` or `upsell`.
    Other(String),
}

impl From<&str> for RecommendationKind {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "popular" => RecommendationKind::Popular,
            "pairing" => RecommendationKind::Pairing,
            other => RecommendationKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation<'a> {
    pub item: &'a MenuItem,
    pub reason: &'static str,
}

/// Picks up to two items for `kind`. Only available items are considered,
/// in menu order.
///
/// `popular` takes the first two mains, `pairing` the first drink and the
/// first dessert. Every other kind, and `popular` on a menu without mains,
/// gets the first two starters.
pub fn recommend<'a>(items: &'a [MenuItem], kind: &RecommendationKind) -> Vec<Recommendation<'a>> {
    let in_category = |category_id: &'static str| {
        items
            .iter()
            .filter(move |item| item.is_available() && item.category_id == category_id)
    };
    let pick = |category_id: &'static str, reasons: &[&'static str]| {
        in_category(category_id)
            .zip(reasons.iter())
            .map(|(item, reason)| Recommendation { item, reason })
            .collect::<Vec<_>>()
    };

    let picked = match kind {
        RecommendationKind::Popular => {
            pick(category::MAINS, &["Our most popular dish!", "Customer favorite!"])
        }
        RecommendationKind::Pairing => {
            let mut picked = pick(category::DRINKS, &["Perfect to refresh your palate"]);
            picked.extend(pick(category::DESSERTS, &["A sweet finish to your meal"]));
            picked
        }
        RecommendationKind::Other(_) => Vec::new(),
    };

    if picked.is_empty() && *kind != RecommendationKind::Pairing {
        pick(
            category::STARTERS,
            &["Light and fresh start", "Comfort food classic"],
        )
    } else {
        picked
    }
}
