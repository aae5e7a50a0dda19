//! Editing session tying the canvas, the pointer state machine and the
//! document snapshot together.

use crate::canvas::{Canvas, CanvasConfig};
use crate::document::DocumentSnapshot;
use crate::event::PointerEvent;
use crate::interaction::InteractionSession;
use crate::ElementId;

/// Callback invoked with the updated document when the canvas changes a
/// document-level field.
pub type DocumentChangeFn = Box<dyn Fn(&DocumentSnapshot) + Send + Sync>;

/// Live editing state for one document.
pub struct Editor {
    canvas: Canvas,
    session: InteractionSession,
    document: DocumentSnapshot,
    on_document_change: Option<DocumentChangeFn>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("canvas", &self.canvas)
            .field("session", &self.session)
            .field("document", &self.document.title)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Create an editor and seed it from `document`.
    #[must_use]
    pub fn new(config: CanvasConfig, document: DocumentSnapshot) -> Self {
        let mut canvas = Canvas::new(config);
        canvas.seed_from_document(&document);
        Self {
            canvas,
            session: InteractionSession::new(),
            document,
            on_document_change: None,
        }
    }

    /// Register the upstream listener for document changes.
    pub fn set_on_document_change<F>(&mut self, callback: F)
    where
        F: Fn(&DocumentSnapshot) + Send + Sync + 'static,
    {
        self.on_document_change = Some(Box::new(callback));
    }

    /// The canvas.
    #[must_use]
    pub const fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Mutable access to the canvas for toolbar and style actions.
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// The pointer session.
    #[must_use]
    pub const fn session(&self) -> &InteractionSession {
        &self.session
    }

    /// The current document snapshot.
    #[must_use]
    pub const fn document(&self) -> &DocumentSnapshot {
        &self.document
    }

    /// Replace the document snapshot and reseed the canvas.
    ///
    /// Unchanged snapshots are ignored so a re-emitted document does not
    /// reseed twice.
    pub fn load_document(&mut self, document: DocumentSnapshot) {
        if document == self.document {
            return;
        }
        self.canvas.seed_from_document(&document);
        self.document = document;
    }

    /// Feed one pointer event through the state machine and apply the
    /// resulting commands in order.
    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        let commands = self.session.handle(event, self.canvas.selected());
        for command in &commands {
            self.canvas.apply(command);
        }
    }

    /// Replace the signature image from the canvas and publish the updated
    /// document upstream.
    pub fn set_signature_image(&mut self, src: &str) -> ElementId {
        let id = self.canvas.set_signature(src);
        self.document = self.document.with_signature_image(Some(src.to_string()));
        self.emit_document_change();
        id
    }

    /// Remove an element. Removing the signature also clears the document's
    /// signature image.
    pub fn remove(&mut self, id: &ElementId) -> bool {
        let removed = self.canvas.remove(id).is_some();
        if removed && id.as_str() == ElementId::SIGNATURE && self.document.signature_image().is_some() {
            self.document = self.document.with_signature_image(None);
            self.emit_document_change();
        }
        removed
    }

    fn emit_document_change(&self) {
        tracing::debug!("Publishing updated document");
        if let Some(callback) = &self.on_document_change {
            callback(&self.document);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::geometry::Point;

    fn editor(title: &str) -> Editor {
        Editor::new(
            CanvasConfig::default(),
            DocumentSnapshot {
                title: title.to_string(),
                ..DocumentSnapshot::default()
            },
        )
    }

    #[test]
    fn test_drag_title_through_editor() {
        let mut editor = editor("Report");
        let down = PointerEvent::down_at(editor.canvas(), Point::new(60, 110));
        editor.handle_pointer(&down);
        editor.handle_pointer(&PointerEvent::move_to(70, 125));
        editor.handle_pointer(&PointerEvent::up_at(70, 125));

        let title = editor.canvas().get(&ElementId::title()).expect("title");
        assert_eq!(title.position, Point::new(60, 115));
        assert_eq!(editor.canvas().selected(), Some(&ElementId::title()));
        assert!(!editor.session().is_active());
    }

    #[test]
    fn test_signature_change_is_published() {
        let published = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&published);

        let mut editor = editor("Letter");
        editor.set_on_document_change(move |doc| {
            sink.lock()
                .expect("lock")
                .push(doc.signature_image().map(str::to_string));
        });

        editor.set_signature_image("sig.png");
        assert_eq!(editor.document().signature_image(), Some("sig.png"));
        assert!(editor.canvas().get(&ElementId::signature()).is_some());

        assert!(editor.remove(&ElementId::signature()));
        assert_eq!(editor.document().signature_image(), None);

        let events = published.lock().expect("lock").clone();
        assert_eq!(events, vec![Some("sig.png".to_string()), None]);
    }

    #[test]
    fn test_identical_document_does_not_reseed() {
        let mut editor = editor("Memo");
        editor.canvas_mut().translate(&ElementId::title(), 5, 5);
        let same = editor.document().clone();
        editor.load_document(same);
        assert_eq!(
            editor.canvas().get(&ElementId::title()).map(|e| e.position),
            Some(Point::new(55, 105))
        );

        let mut changed = editor.document().clone();
        changed.title = "Memo 2".to_string();
        editor.load_document(changed);
        assert_eq!(
            editor.canvas().get(&ElementId::title()).map(|e| e.position),
            Some(Point::new(50, 100))
        );
    }
}
