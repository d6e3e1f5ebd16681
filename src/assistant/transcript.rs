//! Rebuilds model contents from a stored transcript.
//!
//! An assistant message that ran tools expands to three turns: the model's
//! function calls, one user turn with all their results, and the final
//! text. System messages are not sent; the prompt carries that role.

use super::{Content, ModelRequest};
use crate::model::{ChatMessage, Role};
use crate::tools::FunctionCall;

pub fn contents(messages: &[ChatMessage]) -> Vec<Content> {
    let mut contents = Vec::with_capacity(messages.len());
    for message in messages {
        match message.role {
            Role::User => contents.push(Content::user_text(message.content.clone())),
            Role::Assistant => {
                if !message.tool_calls.is_empty() {
                    let calls: Vec<FunctionCall> = message
                        .tool_calls
                        .iter()
                        .map(|invocation| FunctionCall {
                            name: invocation.name.clone(),
                            args: invocation.args.clone(),
                        })
                        .collect();
                    contents.push(Content::function_calls(&calls));
                    contents.push(Content::function_responses(&message.tool_calls));
                }
                if !message.content.is_empty() {
                    contents.push(Content::model_text(message.content.clone()));
                }
            }
            Role::System => {}
        }
    }
    contents
}

/// The request for a new user turn on top of `history`.
pub fn request(system_instruction: String, history: &[ChatMessage], user_message: &str) -> ModelRequest {
    let mut contents = contents(history);
    contents.push(Content::user_text(user_message));
    ModelRequest {
        system_instruction,
        contents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::ContentRole;
    use crate::model::ToolInvocation;
    use serde_json::json;

    #[test]
    fn test_tool_turns_expand_to_call_and_response() {
        let history = vec![
            ChatMessage::user("Quiero un tiramisu"),
            ChatMessage::assistant(
                "Agregado.",
                vec![ToolInvocation {
                    name: "addToOrder".to_string(),
                    args: json!({"itemId": "tiramisu", "quantity": 1}),
                    result: json!({"success": true}),
                }],
            ),
            ChatMessage::assistant("Algo mas?", Vec::new()),
        ];

        let request = request("prompt".to_string(), &history, "No, gracias");
        let roles: Vec<_> = request.contents.iter().map(|c| c.role).collect();

        assert_eq!(
            roles,
            [
                Some(ContentRole::User),
                Some(ContentRole::Model),
                Some(ContentRole::User),
                Some(ContentRole::Model),
                Some(ContentRole::Model),
                Some(ContentRole::User),
            ]
        );
        let call = request.contents[1].parts[0].function_call.as_ref().unwrap();
        assert_eq!(call.args["itemId"], "tiramisu");
        let response = request.contents[2].parts[0].function_response.as_ref().unwrap();
        assert_eq!(response.response, json!({"success": true}));
        assert_eq!(request.contents[5].parts[0].text.as_deref(), Some("No, gracias"));
    }
}
