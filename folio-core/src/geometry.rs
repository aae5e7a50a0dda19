//! Page-local geometry: positions, sizes, resize corners and the floors that
//! every element must respect.

use serde::{Deserialize, Serialize};

/// Minimum element width in pixels.
pub const MIN_WIDTH: i32 = 50;

/// Minimum element height in pixels.
pub const MIN_HEIGHT: i32 = 20;

/// Side length of a resize handle in pixels.
pub const HANDLE_SIZE: i32 = 12;

/// Fixed rotation step applied by [`crate::Canvas::rotate`].
pub const ROTATION_STEP: i32 = 90;

/// A point in page coordinates (top-left origin, integer pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset from `origin` to `self`.
    #[must_use]
    pub const fn delta_from(self, origin: Self) -> (i32, i32) {
        (self.x.saturating_sub(origin.x), self.y.saturating_sub(origin.y))
    }
}

/// Element position. Same coordinate space as [`Point`].
pub type Position = Point;

/// Element size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Whether both axes satisfy the minimum-size floor.
    #[must_use]
    pub const fn meets_floor(self) -> bool {
        self.width >= MIN_WIDTH && self.height >= MIN_HEIGHT
    }
}

/// Clamp a position to the page origin on both axes.
#[must_use]
pub fn clamp_position(p: Position) -> Position {
    Point::new(p.x.max(0), p.y.max(0))
}

/// Clamp a size to the minimum floor, independently per axis.
#[must_use]
pub fn clamp_size(s: Size) -> Size {
    Size::new(s.width.max(MIN_WIDTH), s.height.max(MIN_HEIGHT))
}

/// Normalize a raw rotation into `0..360` for display and export.
#[must_use]
pub const fn normalize_rotation(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

/// Resize handle position on an element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    /// Top-left.
    Nw,
    /// Top-right.
    Ne,
    /// Bottom-left.
    Sw,
    /// Bottom-right.
    Se,
}

impl Corner {
    /// All corners in handle render order.
    pub const ALL: [Self; 4] = [Self::Nw, Self::Ne, Self::Sw, Self::Se];

    /// Lowercase compass name, as used in cursors and markup class names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nw => "nw",
            Self::Ne => "ne",
            Self::Sw => "sw",
            Self::Se => "se",
        }
    }

    /// Corner point of a box at `position` with `size`.
    #[must_use]
    pub const fn anchor_point(self, position: Position, size: Size) -> Point {
        match self {
            Self::Nw => Point::new(position.x, position.y),
            Self::Ne => Point::new(position.x.saturating_add(size.width), position.y),
            Self::Sw => Point::new(position.x, position.y.saturating_add(size.height)),
            Self::Se => Point::new(
                position.x.saturating_add(size.width),
                position.y.saturating_add(size.height),
            ),
        }
    }
}

impl std::fmt::Display for Corner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply a corner-specific resize to `(position, size)`.
///
/// The size is clamped to the floor afterwards. The position is left as
/// computed, so dragging a west or north handle past the page edge can
/// produce negative coordinates.
#[must_use]
pub fn resize_box(position: Position, size: Size, corner: Corner, dx: i32, dy: i32) -> (Position, Size) {
    let (mut x, mut y) = (position.x, position.y);
    let grow = |side: i32, by: i32| side.saturating_add(by);
    let shrink = |side: i32, by: i32| side.saturating_sub(by);
    let (width, height) = match corner {
        Corner::Se => (grow(size.width, dx), grow(size.height, dy)),
        Corner::Sw => {
            x = x.saturating_add(dx);
            (shrink(size.width, dx), grow(size.height, dy))
        }
        Corner::Ne => {
            y = y.saturating_add(dy);
            (grow(size.width, dx), shrink(size.height, dy))
        }
        Corner::Nw => {
            x = x.saturating_add(dx);
            y = y.saturating_add(dy);
            (shrink(size.width, dx), shrink(size.height, dy))
        }
    };
    (Point::new(x, y), clamp_size(Size::new(width, height)))
}
