//! Error types for the order mutation engine.

use crate::catalog::CatalogError;
use crate::model::QuantityLimit;
use crate::session_actor::SessionError;
use thiserror::Error;

/// Why a draft operation did not apply.
///
/// The first four variants are rejections the customer can act on; their
/// messages are shown to the model verbatim. The rest are store failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Item not found in menu. Looking for: {reference}. Available items: {}", .available.join(", "))]
    ItemNotInMenu {
        reference: String,
        available: Vec<String>,
    },

    #[error("Order is empty")]
    EmptyOrder,

    #[error("Item not found in order")]
    LineNotFound,

    #[error(transparent)]
    Quantity(#[from] QuantityLimit),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Order for session {session_id} kept changing; gave up after {attempts} attempts")]
    RetriesExhausted { session_id: String, attempts: u32 },
}

impl EngineError {
    /// True for outcomes caused by the request rather than the store.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::ItemNotInMenu { .. }
                | EngineError::EmptyOrder
                | EngineError::LineNotFound
                | EngineError::Quantity(_)
        )
    }
}
