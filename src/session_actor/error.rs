//! Error types for the Session actor.

use actor_framework::FrameworkError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    /// A conditional write lost against a newer version of the session.
    #[error("Session {id} changed concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid session data: {0}")]
    ValidationError(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for SessionError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => SessionError::NotFound(id),
            FrameworkError::VersionConflict {
                id,
                expected,
                actual,
            } => SessionError::VersionConflict {
                id,
                expected,
                actual,
            },
            FrameworkError::EntityError(inner) => match inner.downcast::<SessionError>() {
                Ok(session_error) => *session_error,
                Err(other) => SessionError::ActorCommunicationError(other.to_string()),
            },
            other => SessionError::ActorCommunicationError(other.to_string()),
        }
    }
}
