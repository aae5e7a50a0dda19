//! # Folio Renderer
//!
//! Deterministic page rendering and export.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────┐   ┌────────────┐   ┌──────────────────────┐
//! │ DocumentSnapshot │──▶│ MarkupTree │──▶│ HTML / SVG           │
//! │ Canvas elements  │   │ (regions)  │   │   └─▶ PNG / PDF      │
//! └──────────────────┘   └────────────┘   │      (resvg, printpdf)│
//!                                         └──────────────────────┘
//! ```
//!
//! The same tree feeds the live view and the exporters, so an export always
//! matches what is on screen.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod layout;
pub mod markup;
pub mod preview;
pub mod svg;

pub use error::{ExportError, ExportResult};
pub use export::{
    artifact_filename, Artifact, ExportBridge, ExportCapability, ExportConfig, ExportFormat,
    PageRasterizer,
};
pub use layout::PageLayout;
pub use markup::{Frame, MarkupNode, MarkupTree, NodeKind, TextAlign};
pub use preview::{render_interactive, render_static, DOCUMENT_REGION, INTERACTIVE_REGION};

use folio_core::Editor;

/// Which preview to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreviewMode {
    /// Read-only document preview.
    #[default]
    Static,
    /// Editable canvas with positioned elements.
    Interactive,
}

impl PreviewMode {
    /// Root region id of this preview.
    #[must_use]
    pub const fn region_id(self) -> &'static str {
        match self {
            Self::Static => DOCUMENT_REGION,
            Self::Interactive => INTERACTIVE_REGION,
        }
    }
}

/// Render the editor's current state in `mode`.
#[must_use]
pub fn render_editor(editor: &Editor, mode: PreviewMode) -> MarkupTree {
    let layout = PageLayout::new(editor.canvas().config().page);
    match mode {
        PreviewMode::Static => render_static(editor.document(), &layout),
        PreviewMode::Interactive => {
            let canvas = editor.canvas();
            render_interactive(canvas.elements(), canvas.selected(), editor.document(), &layout)
        }
    }
}

/// Folio renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
