//! Function declarations sent to the language model.
//!
//! Names, argument names and descriptions are what the model was tuned
//! against; treat them as a wire format.

use super::ToolName;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    String,
    Number,
    Array,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<&'static str, Schema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<&'static str>,
}

impl Schema {
    fn scalar(kind: SchemaType, description: &'static str) -> Self {
        Self {
            kind,
            description: Some(description),
            items: None,
            properties: None,
            required: Vec::new(),
        }
    }

    fn string(description: &'static str) -> Self {
        Self::scalar(SchemaType::String, description)
    }

    fn number(description: &'static str) -> Self {
        Self::scalar(SchemaType::Number, description)
    }

    fn string_array(description: &'static str) -> Self {
        Self {
            items: Some(Box::new(Self {
                kind: SchemaType::String,
                description: None,
                items: None,
                properties: None,
                required: Vec::new(),
            })),
            ..Self::scalar(SchemaType::Array, description)
        }
    }

    fn object(properties: Vec<(&'static str, Schema)>, required: Vec<&'static str>) -> Self {
        Self {
            kind: SchemaType::Object,
            description: None,
            items: None,
            properties: Some(properties.into_iter().collect()),
            required,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Schema,
}

/// Declarations for every tool in [`ToolName::DECLARED`], in that order.
pub fn function_declarations() -> Vec<FunctionDeclaration> {
    ToolName::DECLARED.into_iter().map(declaration).collect()
}

fn declaration(tool: ToolName) -> FunctionDeclaration {
    let (description, parameters) = match tool {
        ToolName::AddToOrder => (
            "Add a menu item to the customer order",
            Schema::object(
                vec![
                    ("itemId", Schema::string("The unique ID of the menu item to add")),
                    ("quantity", Schema::number("The quantity to add (default 1)")),
                    ("modifiers", Schema::string_array("Array of modifier IDs to apply")),
                    (
                        "specialInstructions",
                        Schema::string("Special instructions for the item"),
                    ),
                ],
                vec!["itemId", "quantity"],
            ),
        ),
        ToolName::RemoveFromOrder => (
            "Remove an item from the order",
            Schema::object(
                vec![
                    ("orderItemId", Schema::string("The ID of the order item to remove")),
                    (
                        "itemId",
                        Schema::string("The menu item ID of the item to remove"),
                    ),
                ],
                vec!["orderItemId"],
            ),
        ),
        ToolName::ModifyOrderItem => (
            "Modify an existing item in the order",
            Schema::object(
                vec![
                    ("orderItemId", Schema::string("The ID of the order item to modify")),
                    ("quantity", Schema::number("New quantity")),
                    ("modifiers", Schema::string_array("New modifiers to apply")),
                    (
                        "specialInstructions",
                        Schema::string("Updated special instructions"),
                    ),
                ],
                vec!["orderItemId"],
            ),
        ),
        ToolName::GetRecommendations => (
            "Get AI-powered menu recommendations based on context",
            Schema::object(
                vec![
                    (
                        "type",
                        Schema::string("Type of recommendation: pairing, popular, dietary, upsell"),
                    ),
                    (
                        "context",
                        Schema::string("Additional context for recommendations"),
                    ),
                ],
                vec!["type"],
            ),
        ),
        ToolName::CheckAvailability => (
            "Check if a specific menu item is currently available",
            Schema::object(
                vec![("itemId", Schema::string("The menu item ID to check"))],
                vec!["itemId"],
            ),
        ),
        ToolName::RequestHumanAssistance => (
            "Request a human server to come to the table",
            Schema::object(
                vec![(
                    "reason",
                    Schema::string("The reason for requesting human assistance"),
                )],
                vec!["reason"],
            ),
        ),
        ToolName::GetOrderSummary => (
            "Get the current order summary with items and totals",
            Schema::object(vec![], vec![]),
        ),
        ToolName::ProceedToCheckout => (
            "Direct the customer to the checkout page to review their order, add tip, and complete payment. Call this when the customer wants to place/submit/pay for their order.",
            Schema::object(vec![], vec![]),
        ),
    };
    FunctionDeclaration {
        name: tool.as_str(),
        description,
        parameters,
    }
}
