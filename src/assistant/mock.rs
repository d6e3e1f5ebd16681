//! A [`LanguageModel`] that plays back queued replies.
//!
//! ```rust
//! use tableside::assistant::mock::ScriptedModel;
//! use tableside::assistant::{LanguageModel, ModelReply, ModelRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let model = ScriptedModel::new();
//!     model.push_reply(ModelReply::text("Hola"));
//!
//!     let request = ModelRequest { system_instruction: String::new(), contents: Vec::new() };
//!     assert_eq!(model.generate(&request).await.unwrap().text, "Hola");
//!     assert_eq!(model.requests().len(), 1);
//!     model.verify();
//! }
//! ```

use super::{LanguageModel, ModelError, ModelReply, ModelRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Replies are handed out in the order they were pushed. Running out is a
/// [`ModelError::Transport`] error, so a test that expects fewer calls
/// than the code makes fails loudly.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply, ModelError>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: ModelReply) -> &Self {
        lock(&self.replies).push_back(Ok(reply));
        self
    }

    pub fn push_error(&self, error: ModelError) -> &Self {
        lock(&self.replies).push_back(Err(error));
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ModelRequest> {
        lock(&self.requests).clone()
    }

    /// Panics if queued replies were never asked for.
    pub fn verify(&self) {
        let remaining = lock(&self.replies).len();
        if remaining > 0 {
            panic!("{remaining} scripted model replies were not consumed");
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, ModelError> {
        lock(&self.requests).push(request.clone());
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Transport("no scripted reply left".to_string())))
    }
}
