//! # Folio Core
//!
//! Interactive layout logic for structured documents: the element model,
//! the pointer state machine and the canvas controller that owns every
//! element on the page.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 folio-core                   │
//! ├──────────────────────────────────────────────┤
//! │  DocumentSnapshot ──seed──▶ Canvas           │
//! │                             ▲   (elements,   │
//! │  PointerEvent ──▶ Session ──┘    selection)  │
//! │                  commands        ▲           │
//! │  StyleEditor ────────────────────┘           │
//! └──────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod document;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod interaction;
pub mod style;

pub use canvas::{Canvas, CanvasCommand, CanvasConfig, PageSize, SeedPolicy};
pub use document::{
    Classification, DocumentSnapshot, Letterhead, Priority, SignatureBlock, Template,
    TemplateKind,
};
pub use editor::Editor;
pub use element::{Color, Element, ElementId, ElementKind, FontWeight, TextStyle};
pub use error::{CanvasError, CanvasResult};
pub use event::{HitTarget, PointerEvent};
pub use geometry::{Corner, Point, Position, Size};
pub use interaction::{InteractionMode, InteractionSession};
pub use style::StyleEditor;

/// Folio core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
