//! Renderer error types.

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while producing an artifact.
///
/// None of these affect the editing session; the caller may simply retry.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Another export is still in flight.
    #[error("An export is already in progress")]
    Busy,

    /// The requested region is not part of the rendered tree.
    #[error("Region not found: {0}")]
    RegionNotFound(String),

    /// The capability cannot produce the requested format.
    #[error("Unsupported export format: {0}")]
    Unsupported(String),

    /// Rasterization failed.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// Encoding the rasterized output failed.
    #[error("Encoding failed: {0}")]
    Encode(String),
}
