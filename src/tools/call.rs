//! Typed tool calls.
//!
//! Models and voice vendors send loosely shaped JSON. [`ToolCall::parse`]
//! validates it once, at the dispatch boundary, into the domain types the
//! engine works with.

use super::ToolError;
use crate::engine::{AddRequest, RecommendationKind};
use crate::model::{LineEdit, LineSelector, MAX_LINE_QUANTITY};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

/// The declared tools, plus aliases accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    AddToOrder,
    RemoveFromOrder,
    ModifyOrderItem,
    GetRecommendations,
    CheckAvailability,
    RequestHumanAssistance,
    GetOrderSummary,
    ProceedToCheckout,
}

impl ToolName {
    pub const DECLARED: [ToolName; 8] = [
        ToolName::AddToOrder,
        ToolName::RemoveFromOrder,
        ToolName::ModifyOrderItem,
        ToolName::GetRecommendations,
        ToolName::CheckAvailability,
        ToolName::RequestHumanAssistance,
        ToolName::GetOrderSummary,
        ToolName::ProceedToCheckout,
    ];

    /// Name as declared to the language model.
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::AddToOrder => "addToOrder",
            ToolName::RemoveFromOrder => "removeFromOrder",
            ToolName::ModifyOrderItem => "modifyOrderItem",
            ToolName::GetRecommendations => "getRecommendations",
            ToolName::CheckAvailability => "checkAvailability",
            ToolName::RequestHumanAssistance => "requestHumanAssistance",
            ToolName::GetOrderSummary => "getOrderSummary",
            ToolName::ProceedToCheckout => "proceedToCheckout",
        }
    }

    /// Name the voice vendor uses for its webhook.
    pub fn voice_name(self) -> &'static str {
        match self {
            ToolName::AddToOrder => "add_to_order",
            ToolName::RemoveFromOrder => "remove_from_order",
            ToolName::ModifyOrderItem => "modify_order_item",
            ToolName::GetRecommendations => "get_recommendations",
            ToolName::CheckAvailability => "check_availability",
            ToolName::RequestHumanAssistance => "request_human_assistance",
            ToolName::GetOrderSummary => "get_order_summary",
            ToolName::ProceedToCheckout => "proceed_to_checkout",
        }
    }

    /// Looks up a model-facing name. `submitOrder` is an older name for
    /// `proceedToCheckout`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "submitOrder" {
            return Some(ToolName::ProceedToCheckout);
        }
        Self::DECLARED.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn from_voice_name(name: &str) -> Option<Self> {
        Self::DECLARED.into_iter().find(|tool| tool.voice_name() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    AddToOrder(AddRequest),
    RemoveFromOrder(LineSelector),
    ModifyOrderItem {
        selector: LineSelector,
        edit: LineEdit,
    },
    GetRecommendations {
        kind: RecommendationKind,
        context: Option<String>,
    },
    CheckAvailability {
        item_id: String,
    },
    RequestHumanAssistance {
        reason: String,
    },
    GetOrderSummary,
    ProceedToCheckout,
}

impl ToolCall {
    /// Validates `args` for the tool called `name`. `null` arguments count
    /// as an empty object.
    pub fn parse(name: &str, args: &Value) -> Result<Self, ToolError> {
        let tool = ToolName::from_name(name)
            .ok_or_else(|| ToolError::UnknownFunction(name.to_string()))?;
        Self::parse_for(tool, args)
    }

    pub fn parse_for(tool: ToolName, args: &Value) -> Result<Self, ToolError> {
        let tool_name = tool.as_str();
        let call = match tool {
            ToolName::AddToOrder => {
                let args: AddToOrderArgs = decode(tool_name, args)?;
                let quantity = args.quantity.unwrap_or(1);
                if quantity < 1 {
                    return Err(ToolError::invalid(tool_name, "quantity must be at least 1"));
                }
                let quantity = u32::try_from(quantity)
                    .ok()
                    .filter(|q| *q <= MAX_LINE_QUANTITY)
                    .ok_or_else(|| ToolError::invalid(tool_name, quantity_too_large()))?;
                ToolCall::AddToOrder(AddRequest {
                    reference: args.item_id,
                    quantity,
                    modifiers: args.modifiers.unwrap_or_default(),
                    special_instructions: args.special_instructions,
                })
            }
            ToolName::RemoveFromOrder => {
                let args: LineArgs = decode(tool_name, args)?;
                ToolCall::RemoveFromOrder(args.selector(tool_name)?)
            }
            ToolName::ModifyOrderItem => {
                let args: ModifyArgs = decode(tool_name, args)?;
                if matches!(args.quantity, Some(q) if q > i64::from(MAX_LINE_QUANTITY)) {
                    return Err(ToolError::invalid(tool_name, quantity_too_large()));
                }
                ToolCall::ModifyOrderItem {
                    selector: args.line.selector(tool_name)?,
                    edit: LineEdit {
                        quantity: args.quantity,
                        modifiers: args.modifiers,
                        special_instructions: args.special_instructions,
                    },
                }
            }
            ToolName::GetRecommendations => {
                let args: RecommendationArgs = decode(tool_name, args)?;
                ToolCall::GetRecommendations {
                    kind: RecommendationKind::from(args.kind.as_str()),
                    context: args.context,
                }
            }
            ToolName::CheckAvailability => {
                let args: AvailabilityArgs = decode(tool_name, args)?;
                ToolCall::CheckAvailability {
                    item_id: args.item_id,
                }
            }
            ToolName::RequestHumanAssistance => {
                let args: AssistanceArgs = decode(tool_name, args)?;
                ToolCall::RequestHumanAssistance {
                    reason: args
                        .reason
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or_else(|| "Not specified".to_string()),
                }
            }
            ToolName::GetOrderSummary => ToolCall::GetOrderSummary,
            ToolName::ProceedToCheckout => ToolCall::ProceedToCheckout,
        };
        Ok(call)
    }

    pub fn name(&self) -> ToolName {
        match self {
            ToolCall::AddToOrder(_) => ToolName::AddToOrder,
            ToolCall::RemoveFromOrder(_) => ToolName::RemoveFromOrder,
            ToolCall::ModifyOrderItem { .. } => ToolName::ModifyOrderItem,
            ToolCall::GetRecommendations { .. } => ToolName::GetRecommendations,
            ToolCall::CheckAvailability { .. } => ToolName::CheckAvailability,
            ToolCall::RequestHumanAssistance { .. } => ToolName::RequestHumanAssistance,
            ToolCall::GetOrderSummary => ToolName::GetOrderSummary,
            ToolCall::ProceedToCheckout => ToolName::ProceedToCheckout,
        }
    }
}

fn quantity_too_large() -> String {
    format!("quantity must be at most {MAX_LINE_QUANTITY}")
}

fn decode<T: DeserializeOwned>(tool: &'static str, args: &Value) -> Result<T, ToolError> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(args).map_err(|e| ToolError::invalid(tool, e.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddToOrderArgs {
    item_id: String,
    #[serde(default, deserialize_with = "lenient_integer")]
    quantity: Option<i64>,
    modifiers: Option<Vec<String>>,
    special_instructions: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineArgs {
    order_item_id: Option<String>,
    item_id: Option<String>,
}

impl LineArgs {
    fn selector(self, tool: &'static str) -> Result<LineSelector, ToolError> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let selector = LineSelector {
            order_item_id: present(self.order_item_id),
            item_id: present(self.item_id),
        };
        if selector.order_item_id.is_none() && selector.item_id.is_none() {
            return Err(ToolError::invalid(tool, "orderItemId or itemId is required"));
        }
        Ok(selector)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModifyArgs {
    #[serde(flatten)]
    line: LineArgs,
    #[serde(default, deserialize_with = "lenient_integer")]
    quantity: Option<i64>,
    modifiers: Option<Vec<String>>,
    special_instructions: Option<String>,
}

#[derive(Deserialize)]
struct RecommendationArgs {
    #[serde(rename = "type")]
    kind: String,
    context: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityArgs {
    item_id: String,
}

#[derive(Deserialize)]
struct AssistanceArgs {
    reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Accepts `2`, `2.0` and `"2"`. Fractions are rejected.
fn lenient_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = match Option::<NumberLike>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(NumberLike::Integer(n)) => n,
        Some(NumberLike::Float(f)) if f.fract() == 0.0 && f.is_finite() => f as i64,
        Some(NumberLike::Float(f)) => {
            return Err(D::Error::custom(format!("expected a whole number, got {f}")))
        }
        Some(NumberLike::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("expected a whole number, got {s:?}")))?,
    };
    Ok(Some(value))
}
