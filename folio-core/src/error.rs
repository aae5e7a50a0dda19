//! Error types for canvas operations.

use thiserror::Error;

use crate::ElementId;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Element geometry or attribute rejected at creation or edit time.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Element not found on the canvas.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// Layout serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
