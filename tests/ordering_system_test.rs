use serde_json::json;
use std::sync::Arc;
use tableside::assistant::mock::ScriptedModel;
use tableside::assistant::ModelReply;
use tableside::checkout::{CheckoutRequest, OrderQuery};
use tableside::config::Config;
use tableside::conversation::ChatRequest;
use tableside::model::{Language, OrderStatus};
use tableside::runtime::OrderingSystem;
use tableside::tools::FunctionCall;

const RESTAURANT: &str = "demo_restaurant";
const SESSION: &str = "table_7_session";

fn chat_request(message: &str) -> ChatRequest {
    ChatRequest {
        session_id: SESSION.to_string(),
        restaurant_id: RESTAURANT.to_string(),
        table_id: "table_7".to_string(),
        message: message.to_string(),
        language: Some(Language::En),
        customer_id: None,
    }
}

/// Chat and voice feed one draft, checkout turns it into an order, and the
/// whole system shuts down cleanly afterwards.
#[tokio::test]
async fn test_chat_voice_and_checkout_share_one_session() {
    let model = Arc::new(ScriptedModel::new());
    model.push_reply(ModelReply::calls(vec![FunctionCall {
        name: "addToOrder".to_string(),
        args: json!({"itemId": "grilled-salmon", "quantity": 2}),
    }]));
    model.push_reply(ModelReply::text("Two grilled salmon, coming up."));

    let system = OrderingSystem::with_model(&Config::default(), model.clone())
        .expect("Failed to start system");
    let state = system.state();

    // Chat: the empty menu is seeded on first read.
    let reply = state
        .chat
        .send(chat_request("Two salmon please"))
        .await
        .expect("Chat turn failed");
    assert_eq!(reply.message, "Two grilled salmon, coming up.");
    assert_eq!(reply.tool_calls[0].result["orderTotal"], 53.98);
    model.verify();

    // Voice: same session id, so the same draft.
    let added = state
        .voice
        .handle(
            "add_to_order",
            json!({"sessionId": SESSION, "restaurantId": RESTAURANT, "itemId": "iced-tea"}),
        )
        .await;
    assert_eq!(added["success"], true);

    let history = state.chat.history(SESSION).await.expect("History failed");
    assert_eq!(history.messages.len(), 2);
    let draft = history.current_order.expect("Draft missing");
    assert_eq!(draft.items.len(), 2);
    assert_eq!(draft.subtotal, 53.97);
    assert_eq!(draft.tax, 4.32);
    assert_eq!(draft.total, 58.29);

    // Checkout
    let order = state
        .checkout
        .submit(CheckoutRequest {
            session_id: Some(SESSION.to_string()),
            restaurant_id: RESTAURANT.to_string(),
            table_id: "table_7".to_string(),
            tip: 5.0,
            ..CheckoutRequest::default()
        })
        .await
        .expect("Checkout failed");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.subtotal, 53.97);
    assert_eq!(order.total, 63.29);

    let history = state.chat.history(SESSION).await.expect("History failed");
    assert_eq!(history.current_order, None);

    let orders = state
        .checkout
        .list(OrderQuery {
            session_id: Some(SESSION.to_string()),
            ..OrderQuery::default()
        })
        .await
        .expect("Listing failed");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order.id);

    drop(state);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_assistance_reaches_subscribers() {
    let system = OrderingSystem::with_model(&Config::default(), Arc::new(ScriptedModel::new()))
        .expect("Failed to start system");
    let mut staff = system.notifier.subscribe();
    let state = system.state();

    let result = state
        .voice
        .handle(
            "request_human_assistance",
            json!({"conversation_id": "conv_9", "reason": "Allergy question"}),
        )
        .await;
    assert_eq!(result["success"], true);

    let request = staff.recv().await.expect("No assistance request");
    assert_eq!(request.session_id, "conv_9");
    assert_eq!(request.table_id, "table_1");
    assert_eq!(request.reason, "Allergy question");

    drop(state);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_unconfigured_model_leaves_tools_working() {
    let system = OrderingSystem::new(&Config::default()).expect("Failed to start system");
    let state = system.state();

    assert!(state.chat.send(chat_request("Hello")).await.is_err());

    let summary = state
        .voice
        .handle("get_order_summary", json!({"sessionId": SESSION}))
        .await;
    assert_eq!(summary["success"], true);
    assert_eq!(summary["message"], "Your order is empty");

    drop(state);
    system.shutdown().await.expect("Shutdown failed");
}
