//! # Conversational Front-Ends
//!
//! Two transports over the same [`ToolDispatcher`](crate::tools::ToolDispatcher):
//!
//! | | Chat | Voice |
//! |---|---|---|
//! | Turn | one request, model round trip inside | one webhook per tool call |
//! | Session id | sent by the client | `sessionId`, vendor conversation id, or generated |
//! | Model | ours ([`LanguageModel`](crate::assistant::LanguageModel)) | the vendor's |
//!
//! - [`chat`] - [`ChatService`]
//! - [`voice`] - [`VoiceWebhook`] and the signed URL client

pub mod chat;
pub mod voice;

pub use chat::{ChatError, ChatHistory, ChatReply, ChatRequest, ChatService};
pub use voice::{SignedUrl, VoiceDefaults, VoiceError, VoiceSigner, VoiceWebhook};
