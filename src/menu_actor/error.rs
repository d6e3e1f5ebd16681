//! Error types for the Menu actor.

use actor_framework::FrameworkError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MenuError {
    #[error("Menu item not found: {0}")]
    NotFound(String),

    #[error("Menu item already exists: {0}")]
    AlreadyExists(String),

    #[error("Menu item validation error: {0}")]
    ValidationError(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for MenuError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => MenuError::NotFound(id),
            FrameworkError::AlreadyExists(id) => MenuError::AlreadyExists(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<MenuError>() {
                Ok(menu_error) => *menu_error,
                Err(other) => MenuError::ActorCommunicationError(other.to_string()),
            },
            other => MenuError::ActorCommunicationError(other.to_string()),
        }
    }
}
