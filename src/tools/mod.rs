//! # Tool Dispatcher
//!
//! The fixed tool set the chat model and the voice agent can call to read
//! and change an order.
//!
//! ```text
//! vendor JSON ──ToolCall::parse──▶ ToolCall ──execute──▶ Result<ToolOutput, ToolError>
//!                                                              │
//!                                      {"success": bool, ...} ◀┘
//! ```
//!
//! - [`call`] - typed calls and argument validation
//! - [`schema`] - function declarations for the model
//! - [`dispatcher`] - [`ToolDispatcher`]
//! - [`error`] - [`ToolError`]

pub mod call;
pub mod dispatcher;
pub mod error;
pub mod schema;

pub use call::{ToolCall, ToolName};
pub use dispatcher::{order_summary, FunctionCall, ToolDispatcher, ToolOutput};
pub use error::ToolError;
pub use schema::{function_declarations, FunctionDeclaration};
