//! Pointer interaction state machine.
//!
//! ```text
//!            down on element             move: translate, re-anchor
//!   Idle ───────────────────────▶ Dragging ◀──┐
//!    ▲ │                              │ └──────┘
//!    │ │ down on selected handle      │ up / leave
//!    │ └─────────────────▶ Resizing(corner) ──┐
//!    │                        │ ▲  move:      │
//!    │      up / leave        │ └─ resize ────┘
//!    └────────────────────────┘
//! ```
//!
//! The session never touches elements itself. Each event yields the
//! [`CanvasCommand`]s the [`crate::Canvas`] must apply, in order.

use serde::{Deserialize, Serialize};

use crate::canvas::CanvasCommand;
use crate::event::{HitTarget, PointerEvent};
use crate::geometry::{Corner, Point};
use crate::ElementId;

/// Current manipulation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "corner", rename_all = "lowercase")]
pub enum InteractionMode {
    /// No manipulation in progress.
    #[default]
    Idle,
    /// Moving the active element.
    Dragging,
    /// Resizing the active element from a corner.
    Resizing(Corner),
}

/// The in-progress drag or resize, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionSession {
    active: Option<ElementId>,
    mode: InteractionMode,
    anchor: Point,
}

impl InteractionSession {
    /// Create an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Element being manipulated.
    #[must_use]
    pub const fn active_element(&self) -> Option<&ElementId> {
        self.active.as_ref()
    }

    /// Last observed pointer position.
    #[must_use]
    pub const fn anchor(&self) -> Point {
        self.anchor
    }

    /// Whether a drag or resize is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.mode, InteractionMode::Idle)
    }

    /// Advance the state machine by one event.
    ///
    /// `selected` is the canvas selection at the time of the event; resize
    /// handles only respond on the selected element.
    pub fn handle(&mut self, event: &PointerEvent, selected: Option<&ElementId>) -> Vec<CanvasCommand> {
        match (self.mode, event) {
            (InteractionMode::Idle, PointerEvent::Down { position, target }) => {
                self.press(*position, target, selected)
            }
            (InteractionMode::Idle, _) => Vec::new(),
            (_, PointerEvent::Down { .. }) => {
                tracing::debug!("Ignoring pointer down during {:?}", self.mode);
                Vec::new()
            }
            (InteractionMode::Dragging, PointerEvent::Move { position }) => {
                let Some(id) = self.active.clone() else {
                    return Vec::new();
                };
                let (dx, dy) = self.advance(*position);
                vec![CanvasCommand::Translate { id, dx, dy }]
            }
            (InteractionMode::Resizing(corner), PointerEvent::Move { position }) => {
                let Some(id) = self.active.clone() else {
                    return Vec::new();
                };
                let (dx, dy) = self.advance(*position);
                vec![CanvasCommand::Resize { id, corner, dx, dy }]
            }
            (_, PointerEvent::Up { .. } | PointerEvent::Leave) => {
                self.release();
                Vec::new()
            }
        }
    }

    /// Handle a press while idle.
    fn press(&mut self, position: Point, target: &HitTarget, selected: Option<&ElementId>) -> Vec<CanvasCommand> {
        match target {
            HitTarget::Element { id } => {
                self.begin(id.clone(), InteractionMode::Dragging, position);
                vec![CanvasCommand::Select(Some(id.clone()))]
            }
            HitTarget::Handle { id, corner } if selected == Some(id) => {
                self.begin(id.clone(), InteractionMode::Resizing(*corner), position);
                Vec::new()
            }
            HitTarget::Handle { id, .. } => {
                tracing::debug!("Ignoring handle press on unselected element {id}");
                Vec::new()
            }
            HitTarget::Surface => vec![CanvasCommand::Select(None)],
        }
    }

    fn begin(&mut self, id: ElementId, mode: InteractionMode, anchor: Point) {
        tracing::debug!("Begin {mode:?} on {id} at ({}, {})", anchor.x, anchor.y);
        self.active = Some(id);
        self.mode = mode;
        self.anchor = anchor;
    }

    /// Delta from the anchor to `position`, re-anchoring at `position`.
    fn advance(&mut self, position: Point) -> (i32, i32) {
        let delta = position.delta_from(self.anchor);
        self.anchor = position;
        delta
    }

    fn release(&mut self) {
        if let Some(id) = self.active.take() {
            tracing::debug!("End {:?} on {id}", self.mode);
        }
        self.mode = InteractionMode::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_on(id: &ElementId, x: i32, y: i32) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            target: HitTarget::Element { id: id.clone() },
        }
    }

    #[test]
    fn test_press_element_starts_drag_and_selects() {
        let id = ElementId::new();
        let mut session = InteractionSession::new();

        let commands = session.handle(&down_on(&id, 100, 100), None);

        assert_eq!(commands, vec![CanvasCommand::Select(Some(id.clone()))]);
        assert_eq!(session.mode(), InteractionMode::Dragging);
        assert_eq!(session.active_element(), Some(&id));
        assert_eq!(session.anchor(), Point::new(100, 100));
    }

    #[test]
    fn test_moves_emit_incremental_deltas() {
        let id = ElementId::new();
        let mut session = InteractionSession::new();
        session.handle(&down_on(&id, 100, 100), None);

        let first = session.handle(&PointerEvent::move_to(120, 130), Some(&id));
        assert_eq!(first, vec![CanvasCommand::Translate { id: id.clone(), dx: 20, dy: 30 }]);

        let second = session.handle(&PointerEvent::move_to(125, 128), Some(&id));
        assert_eq!(second, vec![CanvasCommand::Translate { id, dx: 5, dy: -2 }]);
    }

    #[test]
    fn test_handle_press_requires_selection() {
        let id = ElementId::new();
        let press = PointerEvent::Down {
            position: Point::new(0, 0),
            target: HitTarget::Handle {
                id: id.clone(),
                corner: Corner::Se,
            },
        };

        let mut session = InteractionSession::new();
        assert!(session.handle(&press, None).is_empty());
        assert_eq!(session.mode(), InteractionMode::Idle);

        assert!(session.handle(&press, Some(&id)).is_empty());
        assert_eq!(session.mode(), InteractionMode::Resizing(Corner::Se));

        let commands = session.handle(&PointerEvent::move_to(10, -5), Some(&id));
        assert_eq!(
            commands,
            vec![CanvasCommand::Resize {
                id,
                corner: Corner::Se,
                dx: 10,
                dy: -5
            }]
        );
    }

    #[test]
    fn test_release_and_leave_return_to_idle() {
        let id = ElementId::new();
        let mut session = InteractionSession::new();

        session.handle(&down_on(&id, 0, 0), None);
        session.handle(&PointerEvent::up_at(0, 0), Some(&id));
        assert_eq!(session.mode(), InteractionMode::Idle);
        assert!(session.active_element().is_none());

        session.handle(&down_on(&id, 0, 0), None);
        session.handle(&PointerEvent::Leave, Some(&id));
        assert!(!session.is_active());
    }

    #[test]
    fn test_moves_while_idle_are_ignored() {
        let mut session = InteractionSession::new();
        assert!(session.handle(&PointerEvent::move_to(5, 5), None).is_empty());
        assert_eq!(session.anchor(), Point::default());
    }

    #[test]
    fn test_second_press_during_drag_is_ignored() {
        let a = ElementId::new();
        let b = ElementId::new();
        let mut session = InteractionSession::new();
        session.handle(&down_on(&a, 0, 0), None);

        assert!(session.handle(&down_on(&b, 50, 50), Some(&a)).is_empty());
        assert_eq!(session.active_element(), Some(&a));
        assert_eq!(session.anchor(), Point::new(0, 0));
    }

    #[test]
    fn test_surface_press_clears_selection() {
        let mut session = InteractionSession::new();
        let press = PointerEvent::Down {
            position: Point::new(1, 1),
            target: HitTarget::Surface,
        };
        assert_eq!(session.handle(&press, None), vec![CanvasCommand::Select(None)]);
        assert_eq!(session.mode(), InteractionMode::Idle);
    }
}
