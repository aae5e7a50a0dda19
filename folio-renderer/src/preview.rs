//! Static and interactive page previews.
//!
//! Both functions are pure: the same inputs always produce the same tree,
//! which is what makes exported artifacts reproducible.

use folio_core::{
    Color, Corner, DocumentSnapshot, Element, ElementId, ElementKind, FontWeight, Letterhead,
    Priority, TemplateKind,
};
use folio_core::geometry::HANDLE_SIZE;

use crate::layout::{
    block_height, format_long_date, format_rupiah, format_short_date, parse_amount, text_width,
    wrap_text, PageLayout,
};
use crate::markup::{Frame, MarkupNode, MarkupTree, NodeKind, TextAlign};

/// Region id of the static preview root.
pub const DOCUMENT_REGION: &str = "document-content";

/// Region id of the interactive canvas root.
pub const INTERACTIVE_REGION: &str = "interactive-canvas";

/// Tax rate applied when the document does not state one.
pub const DEFAULT_TAX_RATE: f64 = 11.0;

const BODY: Color = Color::rgb(0x33, 0x41, 0x55);
const MUTED: Color = Color::rgb(0x47, 0x55, 0x69);
const RULE: Color = Color::rgb(0xcb, 0xd5, 0xe1);
const SELECTION: Color = Color::rgb(0x3b, 0x82, 0xf6);
const PAPER: Color = Color::rgb(0xff, 0xff, 0xff);

const BODY_SIZE: u8 = 16;
const SMALL_SIZE: u8 = 14;
const TITLE_SIZE: u8 = 30;
const COMPANY_SIZE: u8 = 24;
const LOGO_SIZE: i32 = 80;
const ELEMENT_PADDING: i32 = 8;
const SIGNATURE_COLUMN: i32 = 240;

/// Vertical flow of blocks between the page margins.
struct Flow {
    x: i32,
    width: i32,
    y: i32,
    nodes: Vec<MarkupNode>,
}

impl Flow {
    fn new(x: i32, y: i32, width: i32) -> Self {
        Self {
            x,
            width,
            y,
            nodes: Vec::new(),
        }
    }

    fn gap(&mut self, px: i32) {
        self.y += px;
    }

    fn text(&mut self, text: &str, size: u8, weight: FontWeight, color: Color, align: TextAlign) {
        self.text_in(self.x, self.width, text, size, weight, color, align, None);
    }

    #[allow(clippy::too_many_arguments)]
    fn text_in(
        &mut self,
        x: i32,
        width: i32,
        text: &str,
        size: u8,
        weight: FontWeight,
        color: Color,
        align: TextAlign,
        class: Option<&str>,
    ) {
        let node = text_node(text, size, weight, color, align, Frame::new(x, self.y, width, 0));
        self.y = node.frame.bottom();
        self.nodes.push(match class {
            Some(class) => node.with_class(class),
            None => node,
        });
    }

    fn push(&mut self, node: MarkupNode) {
        self.y = self.y.max(node.frame.bottom());
        self.nodes.push(node);
    }
}

/// Text node whose height is derived from its wrapped lines.
fn text_node(
    text: &str,
    font_size: u8,
    font_weight: FontWeight,
    color: Color,
    align: TextAlign,
    frame: Frame,
) -> MarkupNode {
    let lines = wrap_text(text, font_size, frame.width);
    let height = block_height(lines.len(), font_size);
    MarkupNode::new(
        NodeKind::Text {
            lines,
            font_size,
            font_weight,
            color,
            align,
        },
        Frame::new(frame.x, frame.y, frame.width, height),
    )
}

fn image_node(src: &str, alt: &str, frame: Frame) -> MarkupNode {
    MarkupNode::new(
        NodeKind::Image {
            src: src.to_string(),
            alt: alt.to_string(),
        },
        frame,
    )
}

fn present(field: Option<&String>) -> Option<&str> {
    field.map(String::as_str).map(str::trim).filter(|s| !s.is_empty())
}

/// Company details beside an optional logo, closed by a rule.
fn manual_letterhead(flow: &mut Flow, letterhead: &Letterhead) {
    let Letterhead::Manual {
        company_name,
        address,
        phone,
        email,
        website,
        logo_url,
    } = letterhead
    else {
        return;
    };

    let top = flow.y;
    let mut text_x = flow.x;
    if let Some(logo) = present(logo_url.as_ref()) {
        flow.nodes.push(
            image_node(logo, "Logo", Frame::new(flow.x, top, LOGO_SIZE, LOGO_SIZE))
                .with_class("letterhead-logo"),
        );
        text_x += LOGO_SIZE + 24;
    }
    let text_width = flow.width - (text_x - flow.x);

    flow.text_in(
        text_x,
        text_width,
        company_name,
        COMPANY_SIZE,
        FontWeight::Bold,
        Color::INK,
        TextAlign::Left,
        Some("letterhead-company"),
    );
    flow.gap(8);
    if let Some(address) = present(address.as_ref()) {
        flow.text_in(text_x, text_width, address, BODY_SIZE, FontWeight::Normal, MUTED, TextAlign::Left, None);
        flow.gap(4);
    }
    let contacts: Vec<String> = [("Tel", phone), ("Email", email), ("Web", website)]
        .into_iter()
        .filter_map(|(label, value)| present(value.as_ref()).map(|v| format!("{label}: {v}")))
        .collect();
    if !contacts.is_empty() {
        flow.text_in(
            text_x,
            text_width,
            &contacts.join("    "),
            SMALL_SIZE,
            FontWeight::Normal,
            MUTED,
            TextAlign::Left,
            None,
        );
    }

    if present(logo_url.as_ref()).is_some() {
        flow.y = flow.y.max(top + LOGO_SIZE);
    }
    flow.gap(24);
    flow.push(MarkupNode::new(NodeKind::Rule { color: RULE }, Frame::new(flow.x, flow.y, flow.width, 2)));
}

fn letterhead(flow: &mut Flow, letterhead: &Letterhead) {
    match letterhead {
        Letterhead::Manual { .. } => manual_letterhead(flow, letterhead),
        Letterhead::Uploaded { name, image_url } => {
            flow.push(
                image_node(image_url, name, Frame::new(flow.x, flow.y, flow.width, 120))
                    .with_class("letterhead-image"),
            );
        }
    }
    flow.gap(32);
}

fn priority_badge(flow: &mut Flow, priority: Priority) {
    let (label, fg, bg) = match priority {
        Priority::Normal => return,
        Priority::Urgent => ("MENDESAK", Color::rgb(0x99, 0x1b, 0x1b), Color::rgb(0xfe, 0xe2, 0xe2)),
        Priority::High => (
            "PRIORITAS TINGGI",
            Color::rgb(0x9a, 0x34, 0x12),
            Color::rgb(0xff, 0xed, 0xd5),
        ),
        Priority::Low => (
            "PRIORITAS RENDAH",
            Color::rgb(0x1e, 0x40, 0xaf),
            Color::rgb(0xdb, 0xea, 0xfe),
        ),
    };
    let width = text_width(label, SMALL_SIZE) + 32;
    let x = flow.x + (flow.width - width) / 2;
    let mut badge = MarkupNode::block(Frame::new(x, flow.y, width, 37)).with_class("priority-badge");
    badge.fill = Some(bg);
    badge.push(text_node(
        label,
        SMALL_SIZE,
        FontWeight::Bold,
        fg,
        TextAlign::Center,
        Frame::new(x, flow.y + 8, width, 0),
    ));
    flow.push(badge);
    flow.gap(24);
}

fn invoice_summary(flow: &mut Flow, doc: &DocumentSnapshot) {
    let Some(raw) = doc.total_amount.as_deref() else {
        return;
    };
    let Some(subtotal) = parse_amount(raw) else {
        tracing::debug!(total = raw, "Skipping invoice summary: unreadable total");
        return;
    };
    let rate = match doc.tax_rate.as_deref() {
        Some(raw) => parse_amount(raw).unwrap_or_else(|| {
            tracing::debug!(rate = raw, "Unreadable tax rate, using default");
            DEFAULT_TAX_RATE
        }),
        None => DEFAULT_TAX_RATE,
    };
    let tax = subtotal * rate / 100.0;

    flow.text(
        &format!("Subtotal: {}", format_rupiah(subtotal)),
        BODY_SIZE,
        FontWeight::Normal,
        BODY,
        TextAlign::Right,
    );
    flow.text(
        &format!("PPN ({rate}%): {}", format_rupiah(tax)),
        BODY_SIZE,
        FontWeight::Normal,
        BODY,
        TextAlign::Right,
    );
    flow.gap(4);
    flow.text(
        &format!("Total: {}", format_rupiah(subtotal + tax)),
        18,
        FontWeight::Bold,
        Color::INK,
        TextAlign::Right,
    );
    flow.gap(32);
}

fn signature_block(flow: &mut Flow, doc: &DocumentSnapshot) {
    let Some(signature) = &doc.signature else {
        return;
    };
    let x = flow.x + flow.width - SIGNATURE_COLUMN;
    let date = format_long_date(&doc.date);
    let place = match present(doc.location.as_ref()) {
        Some(location) => format!("{location}, {date}"),
        None => date,
    };

    flow.gap(16);
    flow.text_in(x, SIGNATURE_COLUMN, &place, BODY_SIZE, FontWeight::Normal, BODY, TextAlign::Center, None);
    flow.gap(8);
    match doc.signature_image() {
        Some(src) if signature.use_digital_signature => {
            let left = x + (SIGNATURE_COLUMN - 150) / 2;
            flow.push(image_node(src, "Signature", Frame::new(left, flow.y, 150, 75)).with_class("signature-image"));
        }
        _ => flow.gap(75),
    }
    flow.gap(8);
    flow.text_in(
        x,
        SIGNATURE_COLUMN,
        &signature.name,
        BODY_SIZE,
        FontWeight::Bold,
        Color::INK,
        TextAlign::Center,
        Some("signature-name"),
    );
    if !signature.position.trim().is_empty() {
        flow.text_in(
            x,
            SIGNATURE_COLUMN,
            &signature.position,
            SMALL_SIZE,
            FontWeight::Normal,
            MUTED,
            TextAlign::Center,
            None,
        );
    }
    flow.gap(32);
}

/// Invoice number and due date, or report department and period.
fn template_fields(flow: &mut Flow, doc: &DocumentSnapshot) {
    match doc.template.kind {
        TemplateKind::Invoice => {
            if let Some(number) = present(doc.invoice_number.as_ref()) {
                flow.text(&format!("No. Invoice: {number}"), BODY_SIZE, FontWeight::Normal, BODY, TextAlign::Left);
            }
            if let Some(due) = present(doc.due_date.as_ref()) {
                flow.text(
                    &format!("Jatuh Tempo: {}", format_long_date(due)),
                    BODY_SIZE,
                    FontWeight::Normal,
                    BODY,
                    TextAlign::Left,
                );
            }
            flow.gap(24);
        }
        TemplateKind::Report => {
            if let Some(department) = present(doc.department.as_ref()) {
                flow.text(&format!("Departemen: {department}"), BODY_SIZE, FontWeight::Normal, BODY, TextAlign::Left);
            }
            let start = present(doc.period_start.as_ref());
            let end = present(doc.period_end.as_ref());
            if start.is_some() || end.is_some() {
                let period = format!(
                    "Periode: {} - {}",
                    start.map(format_long_date).unwrap_or_default(),
                    end.map(format_long_date).unwrap_or_default()
                );
                flow.text(&period, BODY_SIZE, FontWeight::Normal, BODY, TextAlign::Left);
            }
            flow.gap(24);
        }
        TemplateKind::Letter | TemplateKind::Memo => {}
    }
}

/// Render the read-only preview of the document fields.
///
/// The page grows past its nominal height when the content needs it.
#[must_use]
pub fn render_static(doc: &DocumentSnapshot, layout: &PageLayout) -> MarkupTree {
    let kind = doc.template.kind;
    let mut flow = Flow::new(layout.margin, layout.margin, layout.content_width());

    if let Some(head) = &doc.letterhead {
        letterhead(&mut flow, head);
    }

    flow.text(&format_long_date(&doc.date), BODY_SIZE, FontWeight::Normal, BODY, TextAlign::Right);
    flow.gap(16);
    if let Some(number) = present(doc.document_number.as_ref()) {
        flow.text(&format!("No: {number}"), BODY_SIZE, FontWeight::Normal, BODY, TextAlign::Right);
        flow.gap(16);
    }
    flow.gap(16);

    if kind == TemplateKind::Letter {
        if let Some(recipient) = present(doc.recipient.as_ref()) {
            flow.text("Kepada Yth.", BODY_SIZE, FontWeight::Normal, BODY, TextAlign::Left);
            flow.text(recipient, BODY_SIZE, FontWeight::Bold, Color::INK, TextAlign::Left);
            flow.gap(32);
        }
    }
    if let Some(subject) = present(doc.subject.as_ref()) {
        flow.text(&format!("Perihal: {subject}"), BODY_SIZE, FontWeight::Bold, Color::INK, TextAlign::Left);
        flow.gap(24);
    }

    if !doc.title.trim().is_empty() {
        flow.text(&doc.title, TITLE_SIZE, FontWeight::Bold, Color::INK, TextAlign::Center);
        flow.gap(32);
    }
    if let Some(priority) = doc.priority {
        priority_badge(&mut flow, priority);
    }

    template_fields(&mut flow, doc);

    if !doc.content.is_empty() {
        let before = flow.nodes.len();
        flow.text(&doc.content, BODY_SIZE, FontWeight::Normal, Color::INK, TextAlign::Left);
        if let Some(body) = flow.nodes.get_mut(before) {
            body.class = Some("document-body".to_string());
        }
        flow.gap(48);
    }

    if kind == TemplateKind::Invoice {
        invoice_summary(&mut flow, doc);
    }

    if let Some(cc) = present(doc.cc.as_ref()) {
        flow.text("Tembusan:", BODY_SIZE, FontWeight::Bold, Color::INK, TextAlign::Left);
        flow.gap(8);
        flow.text(cc, BODY_SIZE, FontWeight::Normal, BODY, TextAlign::Left);
        flow.gap(32);
    }

    signature_block(&mut flow, doc);

    if kind == TemplateKind::Invoice {
        flow.push(MarkupNode::new(NodeKind::Rule { color: RULE }, Frame::new(flow.x, flow.y, flow.width, 2)));
        flow.gap(16);
        flow.text(
            "Terima kasih atas kepercayaan Anda.",
            SMALL_SIZE,
            FontWeight::Normal,
            MUTED,
            TextAlign::Center,
        );
    }

    let height = layout.page.height.max(flow.y + layout.margin);
    let mut root = MarkupNode::block(Frame::new(0, 0, layout.page.width, height)).with_id(DOCUMENT_REGION);
    root.fill = Some(PAPER);
    root.children = flow.nodes;
    MarkupTree::new(root)
}

fn element_node(element: &Element, selected: bool) -> MarkupNode {
    let frame = Frame::new(
        element.position.x,
        element.position.y,
        element.size.width,
        element.size.height,
    );
    let mut node = MarkupNode::block(frame)
        .with_id(element.id.as_str())
        .with_class(format!("element element-{}", element.kind.tag()));
    node.rotation = element.display_rotation();

    match &element.kind {
        ElementKind::Text { content, style } => {
            let inner = frame.width.saturating_sub(2 * ELEMENT_PADDING).max(1);
            let mut text = text_node(
                content,
                style.font_size,
                style.font_weight,
                style.color,
                TextAlign::Left,
                Frame::new(frame.x.saturating_add(ELEMENT_PADDING), frame.y, inner, 0),
            );
            // Centred vertically, like a flex row.
            text.frame.y = text
                .frame
                .y
                .saturating_add((frame.height.saturating_sub(text.frame.height) / 2).max(0));
            node.push(text);
        }
        ElementKind::Image { src } => node.push(image_node(src, "Image", frame)),
        ElementKind::Signature { src } => node.push(image_node(src, "Signature", frame)),
    }

    if selected {
        node.stroke = Some(SELECTION);
        let half = HANDLE_SIZE / 2;
        for corner in Corner::ALL {
            let c = corner.anchor_point(element.position, element.size);
            let mut handle = MarkupNode::block(Frame::new(c.x.saturating_sub(half), c.y.saturating_sub(half), HANDLE_SIZE, HANDLE_SIZE))
                .with_class(format!("handle handle-{}", corner.as_str()));
            handle.fill = Some(SELECTION);
            handle.stroke = Some(PAPER);
            node.push(handle);
        }
    }
    node
}

/// Render the editable page: background content, letterhead and every
/// element in z-order, with the selected element outlined.
#[must_use]
pub fn render_interactive(
    elements: &[Element],
    selected: Option<&ElementId>,
    doc: &DocumentSnapshot,
    layout: &PageLayout,
) -> MarkupTree {
    let page = layout.page;
    let mut root = MarkupNode::block(Frame::new(0, 0, page.width, page.height)).with_id(INTERACTIVE_REGION);
    root.fill = Some(PAPER);

    // Dimmed document content behind the elements.
    let mut background = Flow::new(layout.margin, layout.margin + 128, layout.content_width());
    background.text(&format_short_date(&doc.date), BODY_SIZE, FontWeight::Normal, BODY, TextAlign::Right);
    background.gap(32);
    background.text(&doc.content, BODY_SIZE, FontWeight::Normal, Color::INK, TextAlign::Left);
    let mut dimmed = MarkupNode::block(Frame::new(0, 0, page.width, page.height)).with_class("document-background");
    dimmed.opacity = 20;
    dimmed.children = background.nodes;
    root.push(dimmed);

    if let Some(head @ Letterhead::Manual { .. }) = &doc.letterhead {
        let mut flow = Flow::new(16, 16, page.width - 32);
        manual_letterhead(&mut flow, head);
        let mut group = MarkupNode::block(Frame::new(16, 16, page.width - 32, flow.y - 16)).with_class("letterhead");
        group.children = flow.nodes;
        root.push(group);
    }

    for element in elements {
        root.push(element_node(element, selected == Some(&element.id)));
    }
    MarkupTree::new(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Canvas, SignatureBlock, Template};

    fn letter() -> DocumentSnapshot {
        DocumentSnapshot {
            title: "Surat Undangan".to_string(),
            content: "Dengan hormat, kami mengundang Anda.".to_string(),
            date: "2026-10-19".to_string(),
            recipient: Some("Bapak Direktur".to_string()),
            document_number: Some("001/UND/2026".to_string()),
            priority: Some(Priority::High),
            cc: Some("Arsip".to_string()),
            location: Some("Jakarta".to_string()),
            signature: Some(SignatureBlock {
                name: "Budi".to_string(),
                position: "Sekretaris".to_string(),
                signature_image: Some("data:image/png;base64,AAAA".to_string()),
                use_digital_signature: true,
            }),
            letterhead: Some(Letterhead::Manual {
                company_name: "PT Contoh".to_string(),
                address: Some("Jl. Merdeka 1".to_string()),
                phone: Some("021-123".to_string()),
                email: None,
                website: None,
                logo_url: None,
            }),
            ..DocumentSnapshot::default()
        }
    }

    #[test]
    fn test_static_letter_content() {
        let tree = render_static(&letter(), &PageLayout::default());
        assert_eq!(tree.root.id.as_deref(), Some(DOCUMENT_REGION));
        let text = tree.root.text_content();
        for expected in [
            "PT Contoh",
            "Tel: 021-123",
            "19 Oktober 2026",
            "No: 001/UND/2026",
            "Kepada Yth.",
            "Bapak Direktur",
            "Surat Undangan",
            "PRIORITAS TINGGI",
            "Tembusan:",
            "Jakarta, 19 Oktober 2026",
            "Sekretaris",
        ] {
            assert!(text.contains(expected), "missing {expected:?} in {text}");
        }
        assert!(tree.root.walk().any(|n| n.class.as_deref() == Some("signature-image")));
    }

    #[test]
    fn test_static_invoice_totals() {
        let doc = DocumentSnapshot {
            title: "Invoice #1".to_string(),
            total_amount: Some("1.000.000".to_string()),
            template: Template {
                kind: TemplateKind::Invoice,
                ..Template::default()
            },
            recipient: Some("hidden for invoices".to_string()),
            ..DocumentSnapshot::default()
        };
        let text = render_static(&doc, &PageLayout::default()).root.text_content();
        assert!(text.contains("Subtotal: Rp 1.000.000"));
        assert!(text.contains("PPN (11%): Rp 110.000"));
        assert!(text.contains("Total: Rp 1.110.000"));
        assert!(!text.contains("Kepada Yth."));
    }

    #[test]
    fn test_invoice_accepts_decimal_inputs() {
        let invoice = |total: &str, rate: &str| DocumentSnapshot {
            total_amount: Some(total.to_string()),
            tax_rate: Some(rate.to_string()),
            template: Template {
                kind: TemplateKind::Invoice,
                ..Template::default()
            },
            ..DocumentSnapshot::default()
        };

        let text = render_static(&invoice("1000000", "11.5"), &PageLayout::default())
            .root
            .text_content();
        assert!(text.contains("PPN (11.5%): Rp 115.000"), "{text}");
        assert!(text.contains("Total: Rp 1.115.000"), "{text}");

        let text = render_static(&invoice("1500.50", "10"), &PageLayout::default())
            .root
            .text_content();
        assert!(text.contains("Subtotal: Rp 1.501"), "{text}");
        assert!(text.contains("Total: Rp 1.651"), "{text}");
    }

    #[test]
    fn test_normal_priority_has_no_badge() {
        let doc = DocumentSnapshot {
            priority: Some(Priority::Normal),
            ..letter()
        };
        let tree = render_static(&doc, &PageLayout::default());
        assert!(tree.root.walk().all(|n| n.class.as_deref() != Some("priority-badge")));
    }

    #[test]
    fn test_static_page_grows_with_content() {
        let doc = DocumentSnapshot {
            content: "kata ".repeat(3000),
            ..letter()
        };
        let tree = render_static(&doc, &PageLayout::default());
        assert!(tree.root.frame.height > 1123);
    }

    #[test]
    fn test_interactive_selection_adds_handles() {
        let mut canvas = Canvas::default();
        let id = canvas.add_text("Hello").expect("added");
        canvas.select(Some(&id));
        let doc = letter();
        let tree = render_interactive(canvas.elements(), canvas.selected(), &doc, &PageLayout::default());

        assert_eq!(tree.root.id.as_deref(), Some(INTERACTIVE_REGION));
        let node = tree.find(id.as_str()).expect("element node");
        assert_eq!(node.stroke, Some(SELECTION));
        let handles = node
            .children
            .iter()
            .filter(|n| n.class.as_deref().is_some_and(|c| c.starts_with("handle")))
            .count();
        assert_eq!(handles, 4);
        assert!(tree.root.text_content().contains("19/10/2026"));
    }

    #[test]
    fn test_interactive_render_survives_extreme_geometry() {
        let mut canvas = Canvas::default();
        let id = canvas.add_text("Jauh").expect("added");
        canvas.resize(&id, Corner::Nw, i32::MIN, i32::MIN);
        canvas.select(Some(&id));
        let far = canvas.add_image("far.png").expect("added");
        canvas.translate(&far, i32::MAX, i32::MAX);

        let tree = render_interactive(canvas.elements(), canvas.selected(), &letter(), &PageLayout::default());
        let node = tree.find(far.as_str()).expect("far node");
        assert_eq!(node.frame.x, i32::MAX);
        assert!(tree.to_html().contains("far.png"));
        let svg = crate::svg::render_svg(&tree.root, &crate::export::ExportConfig::default());
        assert!(svg.contains("far.png"));
    }

    #[test]
    fn test_uploaded_letterhead_skipped_in_interactive_view() {
        let doc = DocumentSnapshot {
            letterhead: Some(Letterhead::Uploaded {
                name: "Kop".to_string(),
                image_url: "kop.png".to_string(),
            }),
            ..DocumentSnapshot::default()
        };
        let tree = render_interactive(&[], None, &doc, &PageLayout::default());
        assert!(tree.root.walk().all(|n| n.class.as_deref() != Some("letterhead")));

        let page = render_static(&doc, &PageLayout::default());
        assert!(page.root.walk().any(|n| n.class.as_deref() == Some("letterhead-image")));
    }
}
