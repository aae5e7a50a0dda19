//! Positionable elements - the building blocks of a page layout.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{normalize_rotation, Corner, Point, Position, Size, HANDLE_SIZE};
use crate::{CanvasError, CanvasResult};

/// Unique identifier for an element.
///
/// Created elements get a UUID; elements seeded from document fields use
/// fixed, well-known ids so they can be matched across reseeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Id of the element seeded from the document title.
    pub const TITLE: &'static str = "title";

    /// Id of the element seeded from the document signature image.
    pub const SIGNATURE: &'static str = "signature";

    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Id of the seeded title element.
    #[must_use]
    pub fn title() -> Self {
        Self(Self::TITLE.to_string())
    }

    /// Id of the seeded signature element.
    #[must_use]
    pub fn signature() -> Self {
        Self(Self::SIGNATURE.to_string())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An RGB color, parsed from `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Default ink color for text (`#1e293b`).
    pub const INK: Self = Self::rgb(0x1e, 0x29, 0x3b);

    /// Create a color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::INK
    }
}

impl FromStr for Color {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CanvasError::Validation(format!("invalid hex color: {s:?}"));
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(hex[i..=i].repeat(2).as_str());
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Font weight for text elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
    /// Light weight.
    Light,
}

impl FontWeight {
    /// CSS `font-weight` keyword.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
            Self::Light => "lighter",
        }
    }
}

/// Visual style of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// Font size in pixels, always within [`TextStyle::FONT_SIZE_RANGE`].
    pub font_size: u8,
    /// Font weight.
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Text color.
    #[serde(default)]
    pub color: Color,
}

impl TextStyle {
    /// Accepted font sizes in pixels.
    pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<i32> = 8..=72;

    /// Default font size for added text.
    pub const DEFAULT_FONT_SIZE: u8 = 16;

    /// Clamp an arbitrary font size request into the accepted range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn clamp_font_size(value: i32) -> u8 {
        value.clamp(*Self::FONT_SIZE_RANGE.start(), *Self::FONT_SIZE_RANGE.end()) as u8
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: Self::DEFAULT_FONT_SIZE,
            font_weight: FontWeight::Normal,
            color: Color::INK,
        }
    }
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ElementKind {
    /// A free text block.
    Text {
        /// Literal text content.
        content: String,
        /// Text style.
        style: TextStyle,
    },

    /// A placed image.
    Image {
        /// Image source URI or data URI.
        src: String,
    },

    /// A signature image linked to the document's signature block.
    Signature {
        /// Image source URI or data URI.
        src: String,
    },
}

impl ElementKind {
    /// Text element with the default style.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            style: TextStyle::default(),
        }
    }

    /// Short lowercase tag name.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Signature { .. } => "signature",
        }
    }
}

/// A positionable element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Element content.
    pub kind: ElementKind,
    /// Top-left corner in page coordinates.
    pub position: Position,
    /// Width and height.
    pub size: Size,
    /// Raw rotation in degrees; see [`Element::display_rotation`].
    #[serde(default)]
    pub rotation: i32,
}

impl Element {
    /// Create a new element with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] if `size` is below the minimum
    /// floor or `position` lies left of or above the page origin.
    pub fn create(kind: ElementKind, position: Position, size: Size) -> CanvasResult<Self> {
        Self::with_id(ElementId::new(), kind, position, size)
    }

    /// Create an element with a caller-chosen id, validated like [`Element::create`].
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] on invalid geometry.
    pub fn with_id(id: ElementId, kind: ElementKind, position: Position, size: Size) -> CanvasResult<Self> {
        if !size.meets_floor() {
            return Err(CanvasError::Validation(format!(
                "size {}x{} is below the minimum",
                size.width, size.height
            )));
        }
        if position.x < 0 || position.y < 0 {
            return Err(CanvasError::Validation(format!(
                "position ({}, {}) is off the page",
                position.x, position.y
            )));
        }
        Ok(Self {
            id,
            kind,
            position,
            size,
            rotation: 0,
        })
    }

    /// Check a deserialized element against the invariants edits maintain.
    ///
    /// Positions are not checked: corner resizes may leave an element
    /// partly off the page.
    pub(crate) fn check_restored(&self) -> CanvasResult<()> {
        if !self.size.meets_floor() {
            return Err(CanvasError::Validation(format!(
                "element {}: size {}x{} is below the minimum",
                self.id, self.size.width, self.size.height
            )));
        }
        if let ElementKind::Text { style, .. } = &self.kind {
            if !TextStyle::FONT_SIZE_RANGE.contains(&i32::from(style.font_size)) {
                return Err(CanvasError::Validation(format!(
                    "element {}: font size {} is out of range",
                    self.id, style.font_size
                )));
            }
        }
        Ok(())
    }

    /// Rotation normalized into `0..360`.
    #[must_use]
    pub const fn display_rotation(&self) -> i32 {
        normalize_rotation(self.rotation)
    }

    /// Text style, for text elements.
    #[must_use]
    pub const fn text_style(&self) -> Option<&TextStyle> {
        match &self.kind {
            ElementKind::Text { style, .. } => Some(style),
            _ => None,
        }
    }

    /// Check if a point (in page coordinates) is within this element's box.
    #[must_use]
    pub const fn contains_point(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x.saturating_add(self.size.width)
            && point.y >= self.position.y
            && point.y <= self.position.y.saturating_add(self.size.height)
    }

    /// Resize handle under `point`, if any.
    #[must_use]
    pub fn handle_at(&self, point: Point) -> Option<Corner> {
        let half = HANDLE_SIZE / 2;
        Corner::ALL.into_iter().find(|corner| {
            let c = corner.anchor_point(self.position, self.size);
            point.x.abs_diff(c.x) <= half.unsigned_abs() && point.y.abs_diff(c.y) <= half.unsigned_abs()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_unique_ids() {
        let a = Element::create(ElementKind::text("a"), Point::new(0, 0), Size::new(50, 20))
            .expect("valid");
        let b = Element::create(ElementKind::text("b"), Point::new(0, 0), Size::new(50, 20))
            .expect("valid");
        assert_ne!(a.id, b.id);
        assert_eq!(a.rotation, 0);
    }

    #[test]
    fn test_create_rejects_size_below_floor() {
        let narrow = Element::create(ElementKind::text("x"), Point::new(0, 0), Size::new(49, 20));
        assert!(matches!(narrow, Err(CanvasError::Validation(_))));

        let short = Element::create(ElementKind::text("x"), Point::new(0, 0), Size::new(50, 19));
        assert!(matches!(short, Err(CanvasError::Validation(_))));
    }

    #[test]
    fn test_create_rejects_negative_position() {
        let result = Element::create(ElementKind::text("x"), Point::new(-1, 0), Size::new(60, 30));
        assert!(matches!(result, Err(CanvasError::Validation(_))));
    }

    #[test]
    fn test_display_rotation_preserves_raw_value() {
        let mut element =
            Element::create(ElementKind::text("x"), Point::new(0, 0), Size::new(60, 30)).expect("valid");
        element.rotation = 450;
        assert_eq!(element.display_rotation(), 90);
        assert_eq!(element.rotation, 450);
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("#1e293b".parse::<Color>().expect("long"), Color::INK);
        assert_eq!("#fff".parse::<Color>().expect("short"), Color::rgb(255, 255, 255));
        assert_eq!(Color::rgb(255, 0, 16).to_string(), "#ff0010");
        assert!("1e293b".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
    }

    #[test]
    fn test_handle_hit_testing() {
        let element =
            Element::create(ElementKind::text("x"), Point::new(100, 100), Size::new(200, 50)).expect("valid");
        assert_eq!(element.handle_at(Point::new(101, 99)), Some(Corner::Nw));
        assert_eq!(element.handle_at(Point::new(300, 150)), Some(Corner::Se));
        assert_eq!(element.handle_at(Point::new(200, 125)), None);
        assert!(element.contains_point(Point::new(200, 125)));
    }

    #[test]
    fn test_element_json_shape() {
        let element = Element::with_id(
            ElementId::title(),
            ElementKind::text("Hello"),
            Point::new(1, 2),
            Size::new(60, 30),
        )
        .expect("valid");
        let json = serde_json::to_value(&element).expect("serialize");
        assert_eq!(json["id"], "title");
        assert_eq!(json["kind"]["type"], "text");
        assert_eq!(json["kind"]["data"]["style"]["fontSize"], 16);
        assert_eq!(json["kind"]["data"]["style"]["color"], "#1e293b");
    }
}
