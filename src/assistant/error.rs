use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("Language model is not configured")]
    NotConfigured,

    #[error("Model request failed: {0}")]
    Transport(String),

    #[error("Model returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unreadable model response: {0}")]
    Decode(String),

    #[error("Prompt blocked: {0}")]
    Blocked(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ModelError::Decode(e.to_string())
        } else {
            ModelError::Transport(e.to_string())
        }
    }
}
