//! Runs tool calls against the engine and the menu catalog.

use super::{ToolCall, ToolError, ToolName};
use crate::assistance::{AssistanceRequest, StaffNotifier};
use crate::engine::{recommend, EngineError, OrderEngine, RecommendationKind, SessionContext};
use crate::model::{round2, EditOutcome, OrderDraft, ToolInvocation};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A call as emitted by a model or a voice vendor, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// A successful tool result. Always a JSON object with a `success` field.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput(Value);

impl ToolOutput {
    pub fn into_value(self) -> Value {
        self.0
    }
}

#[derive(Clone)]
pub struct ToolDispatcher {
    engine: OrderEngine,
    notifier: Arc<dyn StaffNotifier>,
    checkout_url: String,
}

impl ToolDispatcher {
    pub fn new(
        engine: OrderEngine,
        notifier: Arc<dyn StaffNotifier>,
        checkout_url: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            notifier,
            checkout_url: checkout_url.into(),
        }
    }

    pub fn engine(&self) -> &OrderEngine {
        &self.engine
    }

    /// Parses and runs one call. Never fails: every error becomes
    /// `{"success": false, "message": ...}`.
    pub async fn dispatch(&self, ctx: &SessionContext, name: &str, args: &Value) -> Value {
        match ToolName::from_name(name) {
            Some(tool) => self.dispatch_tool(ctx, tool, args).await,
            None => into_result_json(name, Err(ToolError::UnknownFunction(name.to_string()))),
        }
    }

    /// Like [`dispatch`](Self::dispatch) for a tool already looked up.
    pub async fn dispatch_tool(&self, ctx: &SessionContext, tool: ToolName, args: &Value) -> Value {
        let result = match ToolCall::parse_for(tool, args) {
            Ok(call) => self.execute(ctx, call).await,
            Err(e) => Err(e),
        };
        into_result_json(tool.as_str(), result)
    }

    /// Runs `calls` one after another in the order the model emitted them.
    #[instrument(skip_all, fields(session_id = %ctx.session_id, calls = calls.len()))]
    pub async fn dispatch_all(
        &self,
        ctx: &SessionContext,
        calls: &[FunctionCall],
    ) -> Vec<ToolInvocation> {
        let mut invocations = Vec::with_capacity(calls.len());
        for call in calls {
            let result = self.dispatch(ctx, &call.name, &call.args).await;
            invocations.push(ToolInvocation {
                name: call.name.clone(),
                args: call.args.clone(),
                result,
            });
        }
        invocations
    }

    /// Runs an already validated call.
    #[instrument(skip(self, ctx), fields(session_id = %ctx.session_id, tool = call.name().as_str()))]
    pub async fn execute(
        &self,
        ctx: &SessionContext,
        call: ToolCall,
    ) -> Result<ToolOutput, ToolError> {
        match call {
            ToolCall::AddToOrder(request) => {
                let requested = request.quantity;
                let applied = self.engine.add_item(ctx, request).await?;
                let line = applied.outcome;
                Ok(ToolOutput(json!({
                    "success": true,
                    "message": format!("Added {requested}x {} to order", line.name.en),
                    "item": {
                        "menuItemId": line.menu_item_id,
                        "name": line.name,
                        "quantity": line.quantity,
                        "price": line.price,
                    },
                    "orderTotal": round2(applied.order_total),
                })))
            }
            ToolCall::RemoveFromOrder(selector) => {
                let applied = self.engine.remove_item(ctx, &selector).await?;
                Ok(ToolOutput(json!({
                    "success": true,
                    "message": format!("Removed {} from order", applied.outcome.name.en),
                    "orderTotal": round2(applied.order_total),
                })))
            }
            ToolCall::ModifyOrderItem { selector, edit } => {
                let applied = self.engine.modify_item(ctx, &selector, edit).await?;
                if let EditOutcome::Removed(line) = &applied.outcome {
                    debug!(item_id = %line.menu_item_id, "Line removed by modify");
                }
                Ok(ToolOutput(json!({
                    "success": true,
                    "message": "Updated order",
                    "orderTotal": round2(applied.order_total),
                })))
            }
            ToolCall::GetRecommendations { kind, context } => {
                self.recommendations(&ctx.restaurant_id, &kind, context.as_deref())
                    .await
            }
            ToolCall::CheckAvailability { item_id } => {
                let found = self
                    .engine
                    .catalog()
                    .find(&ctx.restaurant_id, &item_id)
                    .await?;
                Ok(ToolOutput(match found {
                    Some(item) => json!({
                        "success": true,
                        "isAvailable": item.availability.is_available,
                        "itemName": item.name,
                        "stockCount": item.availability.stock_count,
                    }),
                    None => json!({
                        "success": false,
                        "isAvailable": false,
                        "message": "Item not found",
                    }),
                }))
            }
            ToolCall::RequestHumanAssistance { reason } => {
                let request = AssistanceRequest {
                    session_id: ctx.session_id.clone(),
                    restaurant_id: ctx.restaurant_id.clone(),
                    table_id: ctx.table_id.clone(),
                    reason,
                    requested_at: Utc::now(),
                };
                if let Err(e) = self.notifier.notify(request).await {
                    warn!(error = %e, "Staff notification failed");
                }
                Ok(ToolOutput(json!({
                    "success": true,
                    "message": "A server has been notified and will be with you shortly.",
                    "estimatedWait": "2-3 minutes",
                })))
            }
            ToolCall::GetOrderSummary => {
                let draft = self.engine.current_order(ctx).await?;
                Ok(ToolOutput(order_summary(draft.as_ref())))
            }
            ToolCall::ProceedToCheckout => {
                let draft = self.engine.current_order(ctx).await?;
                Ok(ToolOutput(self.checkout_gate(draft.as_ref())))
            }
        }
    }

    async fn recommendations(
        &self,
        restaurant_id: &str,
        kind: &RecommendationKind,
        context: Option<&str>,
    ) -> Result<ToolOutput, ToolError> {
        let menu = self
            .engine
            .catalog()
            .menu(restaurant_id)
            .await
            .map_err(EngineError::from)?;
        let picks: Vec<Value> = recommend(&menu, kind)
            .into_iter()
            .map(|rec| {
                json!({
                    "itemId": rec.item.id,
                    "name": rec.item.name,
                    "price": rec.item.price,
                    "reason": rec.reason,
                })
            })
            .collect();
        debug!(?kind, context, count = picks.len(), "Recommendations");
        Ok(ToolOutput(json!({
            "success": true,
            "recommendations": picks,
        })))
    }

    fn checkout_gate(&self, draft: Option<&OrderDraft>) -> Value {
        match draft.filter(|d| !d.is_empty()) {
            None => json!({
                "success": false,
                "message": "Your order is empty. Please add items before proceeding to checkout.",
                "redirectToCheckout": false,
            }),
            Some(draft) => json!({
                "success": true,
                "message": "Please proceed to checkout to review your order, add a tip, and complete payment.",
                "redirectToCheckout": true,
                "checkoutUrl": self.checkout_url,
                "orderSummary": {
                    "itemCount": draft.line_count(),
                    "subtotal": round2(draft.subtotal),
                    "tax": round2(draft.tax),
                    "total": round2(draft.total),
                },
            }),
        }
    }
}

/// Summary of a draft as shown to the model. An absent draft is an empty
/// order, not an error.
pub fn order_summary(draft: Option<&OrderDraft>) -> Value {
    match draft.filter(|d| !d.is_empty()) {
        None => json!({
            "success": true,
            "items": [],
            "subtotal": 0,
            "tax": 0,
            "total": 0,
            "itemCount": 0,
            "message": "Your order is empty",
        }),
        Some(draft) => json!({
            "success": true,
            "items": draft.items.iter().map(|line| json!({
                "name": line.name,
                "quantity": line.quantity,
                "price": line.price,
                "itemTotal": round2(line.line_total()),
            })).collect::<Vec<_>>(),
            "subtotal": round2(draft.subtotal),
            "tax": round2(draft.tax),
            "total": round2(draft.total),
            "itemCount": draft.line_count(),
        }),
    }
}

fn into_result_json(tool: &str, result: Result<ToolOutput, ToolError>) -> Value {
    match result {
        Ok(output) => {
            info!(tool, "Tool succeeded");
            output.into_value()
        }
        Err(e) => {
            if e.is_store_failure() {
                warn!(tool, error = %e, "Tool failed");
            } else {
                debug!(tool, reason = %e, "Tool rejected");
            }
            json!({ "success": false, "message": e.to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistance::BroadcastNotifier;
    use crate::catalog::testing::demo_catalog;
    use crate::model::Language;
    use crate::session_actor;

    fn ctx(session_id: &str) -> SessionContext {
        SessionContext {
            session_id: session_id.to_string(),
            restaurant_id: "demo_restaurant".to_string(),
            table_id: "table_3".to_string(),
            language: Language::Es,
            customer_id: None,
        }
    }

    fn dispatcher() -> (ToolDispatcher, BroadcastNotifier) {
        let (actor, sessions) = session_actor::new(16);
        tokio::spawn(actor.run(()));
        let engine = OrderEngine::new(sessions, demo_catalog("demo_restaurant"), 0.08, 3);
        let notifier = BroadcastNotifier::new(4);
        let dispatcher = ToolDispatcher::new(engine, Arc::new(notifier.clone()), "/checkout");
        (dispatcher, notifier)
    }

    #[tokio::test]
    async fn test_salmon_walkthrough() {
        let (tools, _) = dispatcher();
        let ctx = ctx("s1");

        let added = tools
            .dispatch(&ctx, "addToOrder", &json!({"itemId": "salmon", "quantity": 1}))
            .await;
        assert_eq!(added["success"], true);
        assert_eq!(added["message"], "Added 1x Grilled Salmon to order");
        assert_eq!(added["item"]["menuItemId"], "grilled-salmon");

        let summary = tools.dispatch(&ctx, "getOrderSummary", &json!({})).await;
        assert_eq!(summary["subtotal"], 24.99);
        assert_eq!(summary["tax"], 2.0);
        assert_eq!(summary["total"], 26.99);

        tools
            .dispatch(&ctx, "addToOrder", &json!({"itemId": "salmon", "quantity": 1}))
            .await;
        let summary = tools.dispatch(&ctx, "getOrderSummary", &Value::Null).await;
        assert_eq!(summary["items"].as_array().unwrap().len(), 1);
        assert_eq!(summary["items"][0]["quantity"], 2);
        assert_eq!(summary["subtotal"], 49.98);
        assert_eq!(summary["tax"], 4.0);
        assert_eq!(summary["total"], 53.98);

        let removed = tools
            .dispatch(&ctx, "removeFromOrder", &json!({"orderItemId": "grilled-salmon"}))
            .await;
        assert_eq!(removed["message"], "Removed Grilled Salmon from order");
        assert_eq!(removed["orderTotal"], 0.0);
        assert_eq!(tools.engine().current_order(&ctx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_function_and_bad_arguments_do_not_abort_the_turn() {
        let (tools, _) = dispatcher();
        let calls = vec![
            FunctionCall {
                name: "orderPizza".to_string(),
                args: json!({}),
            },
            FunctionCall {
                name: "addToOrder".to_string(),
                args: json!({"quantity": "lots"}),
            },
            FunctionCall {
                name: "addToOrder".to_string(),
                args: json!({"itemId": "iced-tea", "quantity": 2}),
            },
        ];

        let results = tools.dispatch_all(&ctx("s2"), &calls).await;

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].result,
            json!({"success": false, "message": "Unknown function"})
        );
        assert_eq!(results[1].result["success"], false);
        assert_eq!(results[2].name, "addToOrder");
        assert_eq!(results[2].result["success"], true);
    }

    #[tokio::test]
    async fn test_quantity_limit_is_a_rejection() {
        let (tools, _) = dispatcher();
        let ctx = ctx("s5");

        let huge = tools
            .dispatch(&ctx, "addToOrder", &json!({"itemId": "tiramisu", "quantity": 4294967295u64}))
            .await;
        assert_eq!(huge["success"], false);

        let added = tools
            .dispatch(&ctx, "addToOrder", &json!({"itemId": "tiramisu", "quantity": 98}))
            .await;
        assert_eq!(added["success"], true);

        let over = tools
            .dispatch(&ctx, "addToOrder", &json!({"itemId": "tiramisu", "quantity": 2}))
            .await;
        assert_eq!(
            over,
            json!({
                "success": false,
                "message": "Quantity too large: at most 99 of one item per order",
            })
        );

        let draft = tools.engine().current_order(&ctx).await.unwrap().unwrap();
        assert_eq!(draft.items[0].quantity, 98);
        assert_eq!(draft.subtotal, round2(98.0 * 10.99));
    }

    #[tokio::test]
    async fn test_checkout_gate() {
        let (tools, _) = dispatcher();
        let ctx = ctx("s3");

        let gate = tools.dispatch(&ctx, "proceedToCheckout", &json!({})).await;
        assert_eq!(gate["success"], false);
        assert_eq!(gate["redirectToCheckout"], false);

        tools
            .dispatch(&ctx, "addToOrder", &json!({"itemId": "cappuccino", "quantity": 2}))
            .await;
        let gate = tools.dispatch(&ctx, "submitOrder", &json!({})).await;
        let draft = tools.engine().current_order(&ctx).await.unwrap().unwrap();
        assert_eq!(gate["redirectToCheckout"], true);
        assert_eq!(gate["checkoutUrl"], "/checkout");
        assert_eq!(gate["orderSummary"]["itemCount"], 1);
        assert_eq!(gate["orderSummary"]["total"], draft.total);
    }

    #[tokio::test]
    async fn test_read_only_tools() {
        let (tools, notifier) = dispatcher();
        let mut staff = notifier.subscribe();
        let ctx = ctx("s4");

        let found = tools
            .dispatch(&ctx, "checkAvailability", &json!({"itemId": "tiramisu"}))
            .await;
        assert_eq!(found["isAvailable"], true);
        assert_eq!(found["itemName"]["es"], "Tiramisu");

        let missing = tools
            .dispatch(&ctx, "checkAvailability", &json!({"itemId": "Tiramisu"}))
            .await;
        assert_eq!(
            missing,
            json!({"success": false, "isAvailable": false, "message": "Item not found"})
        );

        let recs = tools
            .dispatch(&ctx, "getRecommendations", &json!({"type": "pairing"}))
            .await;
        assert_eq!(recs["recommendations"][0]["itemId"], "fresh-lemonade");
        assert_eq!(recs["recommendations"][1]["reason"], "A sweet finish to your meal");

        let help = tools
            .dispatch(&ctx, "requestHumanAssistance", &json!({"reason": "allergy"}))
            .await;
        assert_eq!(help["estimatedWait"], "2-3 minutes");
        let request = staff.recv().await.unwrap();
        assert_eq!(request.table_id, "table_3");
        assert_eq!(request.reason, "allergy");
    }
}
