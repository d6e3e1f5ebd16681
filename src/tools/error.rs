//! Error types for tool handling.

use crate::catalog::CatalogError;
use crate::engine::EngineError;
use thiserror::Error;

/// A tool call that did not succeed. The dispatcher turns every variant
/// into `{"success": false, "message": <Display>}`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToolError {
    #[error("Unknown function")]
    UnknownFunction(String),

    #[error("Invalid arguments for {tool}: {detail}")]
    InvalidArguments { tool: &'static str, detail: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ToolError {
    pub(crate) fn invalid(tool: &'static str, detail: impl Into<String>) -> Self {
        ToolError::InvalidArguments {
            tool,
            detail: detail.into(),
        }
    }

    /// True when the store, not the request, is at fault.
    pub fn is_store_failure(&self) -> bool {
        match self {
            ToolError::Engine(e) => !e.is_rejection(),
            ToolError::Catalog(_) => true,
            _ => false,
        }
    }
}
