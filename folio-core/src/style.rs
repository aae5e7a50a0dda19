//! Style/property editing for elements.
//!
//! Edits are addressed by id and do not require the target to be selected.

use crate::element::{Color, FontWeight, TextStyle};
use crate::geometry::normalize_rotation;
use crate::{Canvas, CanvasResult, ElementId, ElementKind};

/// Mutates visual attributes through the owning [`Canvas`].
#[derive(Debug)]
pub struct StyleEditor<'a> {
    canvas: &'a mut Canvas,
}

impl<'a> StyleEditor<'a> {
    pub(crate) fn new(canvas: &'a mut Canvas) -> Self {
        Self { canvas }
    }

    /// Set the font size of a text element, clamped to 8..=72.
    pub fn set_font_size(&mut self, id: &ElementId, value: i32) -> bool {
        let size = TextStyle::clamp_font_size(value);
        self.update_text_style(id, |style| style.font_size = size)
    }

    /// Set the color of a text element from a hex string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CanvasError::Validation`] if `hex` is not `#rgb` or
    /// `#rrggbb`. The element is left untouched.
    pub fn set_color(&mut self, id: &ElementId, hex: &str) -> CanvasResult<bool> {
        let color: Color = hex.parse()?;
        Ok(self.update_text_style(id, |style| style.color = color))
    }

    /// Set the font weight of a text element.
    pub fn set_font_weight(&mut self, id: &ElementId, weight: FontWeight) -> bool {
        self.update_text_style(id, |style| style.font_weight = weight)
    }

    /// Set an absolute rotation; any integer is accepted and normalized.
    pub fn set_rotation(&mut self, id: &ElementId, degrees: i32) -> bool {
        self.canvas
            .modify(id, |element| element.rotation = normalize_rotation(degrees))
    }

    fn update_text_style(&mut self, id: &ElementId, f: impl FnOnce(&mut TextStyle)) -> bool {
        let mut applied = false;
        self.canvas.modify(id, |element| {
            if let ElementKind::Text { style, .. } = &mut element.kind {
                f(style);
                applied = true;
            } else {
                tracing::debug!("Text style ignored on {} element {}", element.kind.tag(), element.id);
            }
        });
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn canvas_with_text() -> (Canvas, ElementId) {
        let mut canvas = Canvas::default();
        let id = canvas.add_text("styled").expect("added");
        (canvas, id)
    }

    #[test]
    fn test_font_size_is_clamped() {
        let (mut canvas, id) = canvas_with_text();
        assert!(canvas.style().set_font_size(&id, 200));
        assert_eq!(canvas.get(&id).and_then(|e| e.text_style()).map(|s| s.font_size), Some(72));

        assert!(canvas.style().set_font_size(&id, 2));
        assert_eq!(canvas.get(&id).and_then(|e| e.text_style()).map(|s| s.font_size), Some(8));
    }

    #[test]
    fn test_color_validation() {
        let (mut canvas, id) = canvas_with_text();
        assert!(canvas.style().set_color(&id, "#ff0000").expect("valid"));
        assert_eq!(
            canvas.get(&id).and_then(|e| e.text_style()).map(|s| s.color),
            Some(Color::rgb(255, 0, 0))
        );

        assert!(canvas.style().set_color(&id, "red").is_err());
        assert_eq!(
            canvas.get(&id).and_then(|e| e.text_style()).map(|s| s.color),
            Some(Color::rgb(255, 0, 0))
        );
    }

    #[test]
    fn test_font_weight() {
        let (mut canvas, id) = canvas_with_text();
        assert!(canvas.style().set_font_weight(&id, FontWeight::Light));
        assert_eq!(
            canvas.get(&id).and_then(|e| e.text_style()).map(|s| s.font_weight),
            Some(FontWeight::Light)
        );
    }

    #[test]
    fn test_rotation_is_normalized() {
        let (mut canvas, id) = canvas_with_text();
        assert!(canvas.style().set_rotation(&id, 405));
        assert_eq!(canvas.get(&id).map(|e| e.rotation), Some(45));

        assert!(canvas.style().set_rotation(&id, -15));
        assert_eq!(canvas.get(&id).map(|e| e.rotation), Some(345));
    }

    #[test]
    fn test_edits_do_not_require_selection() {
        let (mut canvas, id) = canvas_with_text();
        assert!(canvas.selected().is_none());
        assert!(canvas.style().set_font_size(&id, 30));
    }

    #[test]
    fn test_text_style_on_image_is_noop() {
        let mut canvas = Canvas::default();
        let id = canvas.add_image("photo.png").expect("added");
        let before = canvas.get(&id).cloned();

        assert!(!canvas.style().set_font_size(&id, 20));
        assert!(!canvas.style().set_color(&id, "#000").expect("valid hex"));
        assert!(canvas.style().set_rotation(&id, 90));
        assert_eq!(canvas.get(&id).map(|e| e.position), before.map(|e| e.position));
        assert_eq!(canvas.get(&id).map(|e| e.position), Some(Point::new(100, 300)));
    }

    #[test]
    fn test_unknown_id() {
        let mut canvas = Canvas::default();
        assert!(!canvas.style().set_font_size(&ElementId::new(), 12));
        assert!(!canvas.style().set_rotation(&ElementId::new(), 12));
    }
}
