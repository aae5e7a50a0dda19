//! Pointer events for canvas interaction.

use serde::{Deserialize, Serialize};

use crate::geometry::{Corner, Point};
use crate::{Canvas, ElementId};

/// What a pointer press landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "lowercase")]
pub enum HitTarget {
    /// The body of an element.
    Element {
        /// Element under the pointer.
        id: ElementId,
    },
    /// A resize handle of an element.
    Handle {
        /// Element owning the handle.
        id: ElementId,
        /// Which corner.
        corner: Corner,
    },
    /// Empty page area.
    Surface,
}

/// A pointer event in page coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    /// Button pressed.
    Down {
        /// Pointer position.
        position: Point,
        /// What was pressed.
        #[serde(flatten)]
        target: HitTarget,
    },
    /// Pointer moved.
    Move {
        /// Pointer position.
        position: Point,
    },
    /// Button released.
    Up {
        /// Pointer position.
        position: Point,
    },
    /// Pointer left the page surface.
    Leave,
}

impl PointerEvent {
    /// Press at `position`, resolving the target by hit testing `canvas`.
    #[must_use]
    pub fn down_at(canvas: &Canvas, position: Point) -> Self {
        Self::Down {
            position,
            target: canvas.hit_test(position),
        }
    }

    /// Move to `(x, y)`.
    #[must_use]
    pub const fn move_to(x: i32, y: i32) -> Self {
        Self::Move {
            position: Point::new(x, y),
        }
    }

    /// Release at `(x, y)`.
    #[must_use]
    pub const fn up_at(x: i32, y: i32) -> Self {
        Self::Up {
            position: Point::new(x, y),
        }
    }

    /// Pointer position carried by the event, if any.
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        match self {
            Self::Down { position, .. } | Self::Move { position } | Self::Up { position } => {
                Some(*position)
            }
            Self::Leave => None,
        }
    }
}
