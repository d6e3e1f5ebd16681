//! # Framework Errors
//!
//! Failures raised by the actor machinery itself, as opposed to the domain
//! errors each entity defines.

/// Errors that can occur within the actor framework.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Actor has no id generator; the caller must supply an id")]
    IdRequired,
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("Version conflict on {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: String,
        expected: u64,
        actual: u64,
    },
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// True when a conditional write lost a race and can be retried.
    pub fn is_conflict(&self) -> bool {
        matches!(self, FrameworkError::VersionConflict { .. })
    }
}
