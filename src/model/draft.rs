//! The in-progress cart attached to a chat session.
//!
//! Everything here is pure: the engine loads a draft, applies one of these
//! operations and writes the result back conditionally. Totals are only ever
//! written by [`OrderDraft::recompute`].

use super::{LocalizedText, MenuItem};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Most units of one menu item a draft line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Quantity too large: at most {MAX_LINE_QUANTITY} of one item per order")]
pub struct QuantityLimit;

/// Rounds a money amount to cents.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLineItem {
    /// Line id, unrelated to the menu item id.
    pub id: String,
    pub menu_item_id: String,
    pub name: LocalizedText,
    /// Unit price captured when the line was created.
    pub price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

impl DraftLineItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<DraftLineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// What to add: a resolved menu item and the requested amount.
#[derive(Debug, Clone)]
pub struct LineAddition<'a> {
    pub item: &'a MenuItem,
    pub quantity: u32,
    pub modifiers: Vec<String>,
    pub special_instructions: Option<String>,
}

/// Picks a line either by its own id or by the menu item it holds.
///
/// `item_id` falls back to `order_item_id`, because models routinely put a
/// menu item id in the `orderItemId` slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSelector {
    pub order_item_id: Option<String>,
    pub item_id: Option<String>,
}

impl LineSelector {
    pub fn matches(&self, line: &DraftLineItem) -> bool {
        let by_line_id = self.order_item_id.as_deref() == Some(line.id.as_str());
        let menu_ref = self.item_id.as_deref().or(self.order_item_id.as_deref());
        by_line_id || menu_ref == Some(line.menu_item_id.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineEdit {
    /// Replaces the quantity. Zero or below removes the line.
    pub quantity: Option<i64>,
    pub modifiers: Option<Vec<String>>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Updated(DraftLineItem),
    Removed(DraftLineItem),
}

impl OrderDraft {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Collapses a draft without lines to `None`, so "no order" has one
    /// representation.
    pub fn into_option(self) -> Option<Self> {
        (!self.items.is_empty()).then_some(self)
    }

    pub fn recompute(&mut self, tax_rate: f64) {
        let subtotal: f64 = self.items.iter().map(DraftLineItem::line_total).sum();
        self.subtotal = round2(subtotal);
        self.tax = round2(self.subtotal * tax_rate);
        self.total = round2(self.subtotal + self.tax);
    }

    /// Adds to the existing line for this menu item, or appends a new one.
    /// Returns the affected line. A line never exceeds
    /// [`MAX_LINE_QUANTITY`]; on overflow the draft is left unchanged.
    pub fn add(
        &mut self,
        addition: LineAddition<'_>,
        tax_rate: f64,
    ) -> Result<DraftLineItem, QuantityLimit> {
        let LineAddition {
            item,
            quantity,
            modifiers,
            special_instructions,
        } = addition;

        let existing = self.items.iter().position(|l| l.menu_item_id == item.id);
        let held = existing.map_or(0, |index| self.items[index].quantity);
        let combined = held
            .checked_add(quantity)
            .filter(|q| *q <= MAX_LINE_QUANTITY)
            .ok_or(QuantityLimit)?;

        let index = match existing {
            Some(index) => {
                let line = &mut self.items[index];
                line.quantity = combined;
                if !modifiers.is_empty() {
                    line.modifiers = modifiers;
                }
                if special_instructions.is_some() {
                    line.special_instructions = special_instructions;
                }
                index
            }
            None => {
                self.items.push(DraftLineItem {
                    id: Uuid::new_v4().to_string(),
                    menu_item_id: item.id.clone(),
                    name: item.name.clone(),
                    price: item.price,
                    quantity,
                    modifiers,
                    special_instructions,
                });
                self.items.len() - 1
            }
        };

        self.recompute(tax_rate);
        Ok(self.items[index].clone())
    }

    pub fn remove(&mut self, selector: &LineSelector, tax_rate: f64) -> Option<DraftLineItem> {
        let index = self.items.iter().position(|l| selector.matches(l))?;
        let removed = self.items.remove(index);
        self.recompute(tax_rate);
        Some(removed)
    }

    /// `Ok(None)` when no line matches. An oversized quantity is refused
    /// before anything changes.
    pub fn edit(
        &mut self,
        selector: &LineSelector,
        edit: LineEdit,
        tax_rate: f64,
    ) -> Result<Option<EditOutcome>, QuantityLimit> {
        let Some(index) = self.items.iter().position(|l| selector.matches(l)) else {
            return Ok(None);
        };

        if matches!(edit.quantity, Some(q) if q <= 0) {
            let removed = self.items.remove(index);
            self.recompute(tax_rate);
            return Ok(Some(EditOutcome::Removed(removed)));
        }
        let quantity = edit
            .quantity
            .map(|q| {
                u32::try_from(q)
                    .ok()
                    .filter(|q| *q <= MAX_LINE_QUANTITY)
                    .ok_or(QuantityLimit)
            })
            .transpose()?;

        let line = &mut self.items[index];
        if let Some(quantity) = quantity {
            line.quantity = quantity;
        }
        if let Some(modifiers) = edit.modifiers {
            line.modifiers = modifiers;
        }
        if edit.special_instructions.is_some() {
            line.special_instructions = edit.special_instructions;
        }
        let updated = line.clone();
        self.recompute(tax_rate);
        Ok(Some(EditOutcome::Updated(updated)))
    }
}
