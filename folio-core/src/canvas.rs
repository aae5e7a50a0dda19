//! Canvas controller: the authoritative, ordered element collection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::DocumentSnapshot;
use crate::element::{Color, FontWeight, TextStyle};
use crate::event::HitTarget;
use crate::geometry::{clamp_position, resize_box, Corner, Point, Size, ROTATION_STEP};
use crate::style::StyleEditor;
use crate::{CanvasError, CanvasResult, Element, ElementId, ElementKind};

/// Simulated page dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    /// Page width in pixels.
    pub width: i32,
    /// Page height in pixels.
    pub height: i32,
}

impl PageSize {
    /// A4 portrait at 96 DPI.
    pub const A4: Self = Self {
        width: 794,
        height: 1123,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// How [`Canvas::seed_from_document`] treats the existing collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedPolicy {
    /// Discard every element and rebuild from the document.
    #[default]
    Replace,
    /// Keep user-added elements and the geometry/style of seeded elements
    /// whose source field is still present; refresh their content.
    Merge,
}

/// Canvas configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Page size.
    pub page: PageSize,
    /// Reseeding behavior.
    pub seed_policy: SeedPolicy,
}

/// A single mutation request against the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum CanvasCommand {
    /// Replace the selection.
    Select(Option<ElementId>),
    /// Move an element.
    Translate {
        /// Target element.
        id: ElementId,
        /// Horizontal delta.
        dx: i32,
        /// Vertical delta.
        dy: i32,
    },
    /// Resize an element from a corner.
    Resize {
        /// Target element.
        id: ElementId,
        /// Handle being dragged.
        corner: Corner,
        /// Horizontal delta.
        dx: i32,
        /// Vertical delta.
        dy: i32,
    },
    /// Rotate an element by the fixed step.
    Rotate(ElementId),
    /// Remove an element.
    Remove(ElementId),
}

/// Default placement of the seeded title.
const TITLE_PLACEMENT: (Point, Size) = (Point::new(50, 100), Size::new(400, 40));

/// Default placement of the seeded signature.
const SIGNATURE_PLACEMENT: (Point, Size) = (Point::new(400, 500), Size::new(150, 75));

/// Default placement of added text.
const TEXT_PLACEMENT: (Point, Size) = (Point::new(100, 200), Size::new(200, 30));

/// Default placement of added images.
const IMAGE_PLACEMENT: (Point, Size) = (Point::new(100, 300), Size::new(200, 150));

/// Owns the element collection (insertion order is z-order) and the
/// single selection pointer. Every mutation goes through here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Canvas {
    elements: Vec<Element>,
    selected: Option<ElementId>,
    #[serde(default)]
    config: CanvasConfig,
}

impl Canvas {
    /// Create an empty canvas.
    #[must_use]
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            elements: Vec::new(),
            selected: None,
            config,
        }
    }

    /// Canvas configuration.
    #[must_use]
    pub const fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Elements in z-order, bottom first.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the canvas has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Look up an element.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// The selected element id.
    #[must_use]
    pub const fn selected(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// The selected element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Style editor operating on this canvas.
    pub fn style(&mut self) -> StyleEditor<'_> {
        StyleEditor::new(self)
    }

    /// Rebuild the collection from document fields.
    pub fn seed_from_document(&mut self, doc: &DocumentSnapshot) {
        let mut seeded = Vec::with_capacity(2);

        if !doc.title.is_empty() {
            let (position, size) = TITLE_PLACEMENT;
            seeded.push(Element {
                id: ElementId::title(),
                kind: ElementKind::Text {
                    content: doc.title.clone(),
                    style: TextStyle {
                        font_size: 24,
                        font_weight: FontWeight::Bold,
                        color: Color::INK,
                    },
                },
                position,
                size,
                rotation: 0,
            });
        }

        if let Some(src) = doc.signature_image() {
            let (position, size) = SIGNATURE_PLACEMENT;
            seeded.push(Element {
                id: ElementId::signature(),
                kind: ElementKind::Signature {
                    src: src.to_string(),
                },
                position,
                size,
                rotation: 0,
            });
        }

        match self.config.seed_policy {
            SeedPolicy::Replace => {
                self.elements = seeded;
                self.selected = None;
            }
            SeedPolicy::Merge => self.merge_seeded(seeded),
        }

        tracing::info!(
            "Seeded canvas from document ({:?}): {} elements",
            self.config.seed_policy,
            self.elements.len()
        );
    }

    fn merge_seeded(&mut self, seeded: Vec<Element>) {
        let is_seed_id = |id: &ElementId| {
            id.as_str() == ElementId::TITLE || id.as_str() == ElementId::SIGNATURE
        };

        self.elements
            .retain(|e| !is_seed_id(&e.id) || seeded.iter().any(|s| s.id == e.id));

        for fresh in seeded {
            if let Some(existing) = self.elements.iter_mut().find(|e| e.id == fresh.id) {
                match (&mut existing.kind, fresh.kind) {
                    (ElementKind::Text { content, .. }, ElementKind::Text { content: next, .. }) => {
                        *content = next;
                    }
                    (ElementKind::Signature { src }, ElementKind::Signature { src: next }) => {
                        *src = next;
                    }
                    (kind, next) => *kind = next,
                }
            } else {
                self.elements.push(fresh);
            }
        }

        if let Some(id) = self.selected.clone() {
            if self.get(&id).is_none() {
                self.selected = None;
            }
        }
    }

    /// Move an element, clamping the result to the page origin.
    pub fn translate(&mut self, id: &ElementId, dx: i32, dy: i32) -> bool {
        self.modify(id, |element| {
            let p = element.position;
            element.position =
                clamp_position(Point::new(p.x.saturating_add(dx), p.y.saturating_add(dy)));
        })
    }

    /// Resize an element from `corner`. Size is floored; position is not
    /// re-clamped, see [`crate::geometry::resize_box`].
    pub fn resize(&mut self, id: &ElementId, corner: Corner, dx: i32, dy: i32) -> bool {
        self.modify(id, |element| {
            let (position, size) = resize_box(element.position, element.size, corner, dx, dy);
            element.position = position;
            element.size = size;
        })
    }

    /// Rotate an element by 90 degrees. The raw value keeps accumulating.
    pub fn rotate(&mut self, id: &ElementId) -> bool {
        self.modify(id, |element| {
            element.rotation = element.rotation.saturating_add(ROTATION_STEP);
        })
    }

    /// Append a text element with the default style.
    ///
    /// Returns `None` without changing anything when `content` is blank.
    pub fn add_text(&mut self, content: &str) -> Option<ElementId> {
        if content.trim().is_empty() {
            tracing::debug!("Ignoring blank text element");
            return None;
        }
        let (position, size) = TEXT_PLACEMENT;
        self.push(ElementKind::text(content), position, size)
    }

    /// Append an image element.
    pub fn add_image(&mut self, src: &str) -> Option<ElementId> {
        if src.is_empty() {
            return None;
        }
        let (position, size) = IMAGE_PLACEMENT;
        self.push(
            ElementKind::Image {
                src: src.to_string(),
            },
            position,
            size,
        )
    }

    /// Insert or update the signature element with a new image.
    pub fn set_signature(&mut self, src: &str) -> ElementId {
        let id = ElementId::signature();
        if let Some(element) = self.elements.iter_mut().find(|e| e.id == id) {
            element.kind = ElementKind::Signature {
                src: src.to_string(),
            };
        } else {
            let (position, size) = SIGNATURE_PLACEMENT;
            self.elements.push(Element {
                id: id.clone(),
                kind: ElementKind::Signature {
                    src: src.to_string(),
                },
                position,
                size,
                rotation: 0,
            });
        }
        id
    }

    fn push(&mut self, kind: ElementKind, position: Point, size: Size) -> Option<ElementId> {
        match Element::create(kind, position, size) {
            Ok(element) => {
                let id = element.id.clone();
                tracing::debug!("Added {} element {id}", element.kind.tag());
                self.elements.push(element);
                Some(id)
            }
            Err(e) => {
                tracing::warn!("Rejected new element: {e}");
                None
            }
        }
    }

    /// Remove an element, clearing the selection if it pointed at it.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| &e.id == id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some(self.elements.remove(index))
    }

    /// Set or clear the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: Option<&ElementId>) -> bool {
        match id {
            Some(id) if self.get(id).is_none() => {
                tracing::debug!("{}", CanvasError::ElementNotFound(id.clone()));
                false
            }
            Some(id) => {
                self.selected = Some(id.clone());
                true
            }
            None => {
                self.selected = None;
                true
            }
        }
    }

    /// Apply one command.
    pub fn apply(&mut self, command: &CanvasCommand) -> bool {
        match command {
            CanvasCommand::Select(id) => self.select(id.as_ref()),
            CanvasCommand::Translate { id, dx, dy } => self.translate(id, *dx, *dy),
            CanvasCommand::Resize { id, corner, dx, dy } => self.resize(id, *corner, *dx, *dy),
            CanvasCommand::Rotate(id) => self.rotate(id),
            CanvasCommand::Remove(id) => self.remove(id).is_some(),
        }
    }

    /// Find what lies under `point`: a handle of the selected element first,
    /// then the top-most element body.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> HitTarget {
        if let Some(element) = self.selected_element() {
            if let Some(corner) = element.handle_at(point) {
                return HitTarget::Handle {
                    id: element.id.clone(),
                    corner,
                };
            }
        }

        self.elements
            .iter()
            .rev()
            .find(|e| e.contains_point(point))
            .map_or(HitTarget::Surface, |e| HitTarget::Element { id: e.id.clone() })
    }

    /// Mutate one element in place. Unknown ids are a logged no-op.
    pub(crate) fn modify(&mut self, id: &ElementId, f: impl FnOnce(&mut Element)) -> bool {
        match self.element_mut(id) {
            Ok(element) => {
                f(element);
                true
            }
            Err(e) => {
                tracing::debug!("Ignoring edit: {e}");
                false
            }
        }
    }

    fn element_mut(&mut self, id: &ElementId) -> CanvasResult<&mut Element> {
        self.elements
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.clone()))
    }

    /// Serialize the element collection to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string_pretty(&self.elements).map_err(CanvasError::Serialization)
    }

    /// Replace the element collection from JSON produced by [`Canvas::to_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, an element violates the
    /// size floor or font size range, or two elements share an id.
    pub fn load_json(&mut self, json: &str) -> CanvasResult<()> {
        let elements: Vec<Element> = serde_json::from_str(json)?;
        let mut seen = HashSet::with_capacity(elements.len());
        for element in &elements {
            element.check_restored()?;
            if !seen.insert(&element.id) {
                return Err(CanvasError::Validation(format!(
                    "duplicate element id {}",
                    element.id
                )));
            }
        }
        self.elements = elements;
        self.selected = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SignatureBlock;

    fn doc_with(title: &str, signature: Option<&str>) -> DocumentSnapshot {
        DocumentSnapshot {
            title: title.to_string(),
            signature: signature.map(|src| SignatureBlock {
                signature_image: Some(src.to_string()),
                ..SignatureBlock::default()
            }),
            ..DocumentSnapshot::default()
        }
    }

    #[test]
    fn test_seed_title_only() {
        let mut canvas = Canvas::default();
        canvas.seed_from_document(&doc_with("Invoice #1", None));

        assert_eq!(canvas.len(), 1);
        let title = &canvas.elements()[0];
        assert_eq!(title.id, ElementId::title());
        assert!(matches!(&title.kind, ElementKind::Text { content, .. } if content == "Invoice #1"));
        assert_eq!(title.position, Point::new(50, 100));
        assert_eq!(title.size, Size::new(400, 40));
        assert_eq!(title.text_style().map(|s| s.font_size), Some(24));
    }

    #[test]
    fn test_seed_with_signature() {
        let mut canvas = Canvas::default();
        canvas.seed_from_document(&doc_with("Letter", Some("sig.png")));

        assert_eq!(canvas.len(), 2);
        let sig = canvas.get(&ElementId::signature()).expect("signature");
        assert_eq!(sig.position, Point::new(400, 500));
        assert_eq!(sig.size, Size::new(150, 75));
    }

    #[test]
    fn test_replace_seed_discards_edits() {
        let mut canvas = Canvas::default();
        canvas.seed_from_document(&doc_with("A", None));
        canvas.translate(&ElementId::title(), 30, 30);
        canvas.add_text("note");
        canvas.select(Some(&ElementId::title()));

        canvas.seed_from_document(&doc_with("B", None));

        assert_eq!(canvas.len(), 1);
        assert_eq!(canvas.elements()[0].position, Point::new(50, 100));
        assert!(canvas.selected().is_none());
    }

    #[test]
    fn test_merge_seed_keeps_edits() {
        let mut canvas = Canvas::new(CanvasConfig {
            seed_policy: SeedPolicy::Merge,
            ..CanvasConfig::default()
        });
        canvas.seed_from_document(&doc_with("A", Some("one.png")));
        canvas.translate(&ElementId::title(), 30, 30);
        let note = canvas.add_text("note").expect("added");

        canvas.seed_from_document(&doc_with("B", None));

        let title = canvas.get(&ElementId::title()).expect("title");
        assert_eq!(title.position, Point::new(80, 130));
        assert!(matches!(&title.kind, ElementKind::Text { content, .. } if content == "B"));
        assert!(canvas.get(&note).is_some());
        assert!(canvas.get(&ElementId::signature()).is_none());
    }

    #[test]
    fn test_translate_clamps_to_origin() {
        let mut canvas = Canvas::default();
        let id = canvas.add_text("x").expect("added");
        assert!(canvas.translate(&id, -500, -500));
        assert_eq!(canvas.get(&id).map(|e| e.position), Some(Point::new(0, 0)));
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut canvas = Canvas::default();
        canvas.add_text("x");
        let before = canvas.elements().to_vec();
        let ghost = ElementId::new();

        assert!(!canvas.translate(&ghost, 1, 1));
        assert!(!canvas.resize(&ghost, Corner::Se, 1, 1));
        assert!(!canvas.rotate(&ghost));
        assert!(canvas.remove(&ghost).is_none());
        assert!(!canvas.select(Some(&ghost)));
        assert_eq!(canvas.elements(), before.as_slice());
    }

    #[test]
    fn test_add_text_defaults() {
        let mut canvas = Canvas::default();
        assert!(canvas.add_text("").is_none());
        assert!(canvas.add_text("   ").is_none());
        assert!(canvas.is_empty());

        let id = canvas.add_text("Hello").expect("added");
        assert_eq!(canvas.len(), 1);
        let element = canvas.get(&id).expect("present");
        assert_eq!(element.position, Point::new(100, 200));
        assert_eq!(element.size, Size::new(200, 30));
        assert_eq!(element.text_style(), Some(&TextStyle::default()));
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut canvas = Canvas::default();
        let a = canvas.add_text("a").expect("a");
        let b = canvas.add_text("b").expect("b");

        canvas.select(Some(&a));
        canvas.remove(&b);
        assert_eq!(canvas.selected(), Some(&a));

        canvas.remove(&a);
        assert!(canvas.selected().is_none());
    }

    #[test]
    fn test_hit_test_prefers_topmost_and_handles() {
        let mut canvas = Canvas::default();
        let below = canvas.add_text("below").expect("below");
        let above = canvas.add_text("above").expect("above");

        assert_eq!(
            canvas.hit_test(Point::new(150, 210)),
            HitTarget::Element { id: above.clone() }
        );
        assert_eq!(canvas.hit_test(Point::new(5, 5)), HitTarget::Surface);

        canvas.select(Some(&below));
        assert_eq!(
            canvas.hit_test(Point::new(300, 230)),
            HitTarget::Handle {
                id: below,
                corner: Corner::Se
            }
        );
    }

    #[test]
    fn test_json_roundtrip_validates_floor() {
        let mut canvas = Canvas::default();
        canvas.add_text("kept");
        let json = canvas.to_json().expect("json");

        let mut restored = Canvas::default();
        restored.load_json(&json).expect("load");
        assert_eq!(restored.elements(), canvas.elements());

        let bad = json.replace("\"width\": 200", "\"width\": 10");
        assert!(matches!(
            restored.load_json(&bad),
            Err(CanvasError::Validation(_))
        ));
        assert_eq!(restored.len(), 1);
    }

    #[test]
    fn test_json_roundtrip_keeps_off_page_resize() {
        let mut canvas = Canvas::default();
        let id = canvas.add_text("corner").expect("added");
        canvas.translate(&id, -100, -200);
        canvas.resize(&id, Corner::Nw, -30, -10);
        assert_eq!(canvas.get(&id).map(|e| e.position), Some(Point::new(-30, -10)));

        let mut restored = Canvas::default();
        restored.load_json(&canvas.to_json().expect("json")).expect("load");
        assert_eq!(restored.elements(), canvas.elements());
    }

    #[test]
    fn test_load_json_rejects_out_of_range_font_size() {
        let mut canvas = Canvas::default();
        canvas.add_text("big");
        let json = canvas.to_json().expect("json").replace("\"fontSize\": 16", "\"fontSize\": 200");

        let mut restored = Canvas::default();
        assert!(matches!(
            restored.load_json(&json),
            Err(CanvasError::Validation(_))
        ));
        assert!(restored.is_empty());
    }

    #[test]
    fn test_load_json_rejects_duplicate_ids() {
        let mut canvas = Canvas::default();
        let id = canvas.add_text("twice").expect("added");
        let element = canvas.get(&id).cloned().expect("element");
        let json = serde_json::to_string(&vec![element.clone(), element]).expect("json");

        let mut restored = Canvas::default();
        let err = restored.load_json(&json).expect_err("duplicate");
        assert!(matches!(err, CanvasError::Validation(ref msg) if msg.contains("duplicate")));
        assert!(restored.is_empty());
    }
}
