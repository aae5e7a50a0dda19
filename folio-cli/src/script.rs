//! Editing scripts: a JSON list of pointer and toolbar actions replayed
//! against an [`Editor`].

use folio_core::{CanvasError, Editor, ElementId, FontWeight, Point, PointerEvent};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or replaying a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script is not valid JSON or names an unknown action.
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    /// A step was rejected by the canvas.
    #[error("Step {step} failed: {source}")]
    Step {
        /// Zero-based step index.
        step: usize,
        /// Underlying canvas error.
        #[source]
        source: CanvasError,
    },
}

/// One scripted action.
///
/// Element-targeting actions take an optional `id`; when omitted they act
/// on the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Press at a page position; the target is found by hit testing.
    Down {
        /// Horizontal position.
        x: i32,
        /// Vertical position.
        y: i32,
    },
    /// Move the pointer.
    Move {
        /// Horizontal position.
        x: i32,
        /// Vertical position.
        y: i32,
    },
    /// Release the pointer.
    Up {
        /// Horizontal position.
        x: i32,
        /// Vertical position.
        y: i32,
    },
    /// Pointer left the page.
    Leave,
    /// Select an element, or clear the selection.
    Select {
        /// Element to select.
        #[serde(default)]
        id: Option<String>,
    },
    /// Add a text element.
    AddText {
        /// Text content.
        content: String,
    },
    /// Add an image element.
    AddImage {
        /// Image source.
        src: String,
    },
    /// Replace the signature image.
    Signature {
        /// Image source.
        src: String,
    },
    /// Remove an element.
    Remove {
        /// Target element.
        #[serde(default)]
        id: Option<String>,
    },
    /// Rotate an element by one step.
    Rotate {
        /// Target element.
        #[serde(default)]
        id: Option<String>,
    },
    /// Set the font size of a text element.
    FontSize {
        /// Target element.
        #[serde(default)]
        id: Option<String>,
        /// Requested size, clamped to the accepted range.
        size: i32,
    },
    /// Set the text color.
    Color {
        /// Target element.
        #[serde(default)]
        id: Option<String>,
        /// Hex color.
        hex: String,
    },
    /// Set the font weight.
    FontWeight {
        /// Target element.
        #[serde(default)]
        id: Option<String>,
        /// Weight.
        weight: FontWeight,
    },
    /// Set the rotation directly.
    Rotation {
        /// Target element.
        #[serde(default)]
        id: Option<String>,
        /// Rotation in degrees.
        degrees: i32,
    },
}

/// Parse a script from JSON.
///
/// # Errors
///
/// Returns [`ScriptError::Parse`] on malformed input.
pub fn parse_script(json: &str) -> Result<Vec<Action>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

fn target(editor: &Editor, id: Option<&String>) -> Option<ElementId> {
    match id {
        Some(id) => Some(ElementId::from(id.as_str())),
        None => editor.canvas().selected().cloned(),
    }
}

/// Apply one action.
///
/// Actions that target nothing are skipped, like the toolbar does when no
/// element is selected.
///
/// # Errors
///
/// Returns the canvas error for rejected input such as an invalid color.
pub fn apply_action(editor: &mut Editor, action: &Action) -> Result<(), CanvasError> {
    match action {
        Action::Down { x, y } => {
            let event = PointerEvent::down_at(editor.canvas(), Point::new(*x, *y));
            editor.handle_pointer(&event);
        }
        Action::Move { x, y } => editor.handle_pointer(&PointerEvent::move_to(*x, *y)),
        Action::Up { x, y } => editor.handle_pointer(&PointerEvent::up_at(*x, *y)),
        Action::Leave => editor.handle_pointer(&PointerEvent::Leave),
        Action::Select { id } => {
            let id = id.as_deref().map(ElementId::from);
            editor.canvas_mut().select(id.as_ref());
        }
        Action::AddText { content } => {
            editor.canvas_mut().add_text(content);
        }
        Action::AddImage { src } => {
            editor.canvas_mut().add_image(src);
        }
        Action::Signature { src } => {
            editor.set_signature_image(src);
        }
        Action::Remove { id } => {
            if let Some(id) = target(editor, id.as_ref()) {
                editor.remove(&id);
            }
        }
        Action::Rotate { id } => {
            if let Some(id) = target(editor, id.as_ref()) {
                editor.canvas_mut().rotate(&id);
            }
        }
        Action::FontSize { id, size } => {
            if let Some(id) = target(editor, id.as_ref()) {
                editor.canvas_mut().style().set_font_size(&id, *size);
            }
        }
        Action::Color { id, hex } => {
            if let Some(id) = target(editor, id.as_ref()) {
                editor.canvas_mut().style().set_color(&id, hex)?;
            }
        }
        Action::FontWeight { id, weight } => {
            if let Some(id) = target(editor, id.as_ref()) {
                editor.canvas_mut().style().set_font_weight(&id, *weight);
            }
        }
        Action::Rotation { id, degrees } => {
            if let Some(id) = target(editor, id.as_ref()) {
                editor.canvas_mut().style().set_rotation(&id, *degrees);
            }
        }
    }
    Ok(())
}

/// Replay `actions` in order, stopping at the first rejected step.
///
/// # Errors
///
/// Returns [`ScriptError::Step`] with the index of the failing action.
pub fn run_script(editor: &mut Editor, actions: &[Action]) -> Result<(), ScriptError> {
    for (step, action) in actions.iter().enumerate() {
        tracing::debug!(step, ?action, "Applying script step");
        apply_action(editor, action).map_err(|source| ScriptError::Step { step, source })?;
    }
    Ok(())
}
