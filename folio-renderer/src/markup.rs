//! Fixed-layout markup tree shared by the live view and the exporters.
//!
//! Every node carries an absolute page frame, so HTML and SVG serializations
//! place content at exactly the same pixels.

use std::fmt::Write;

use folio_core::{Color, FontWeight};
use serde::Serialize;

/// Absolute box in page pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Frame {
    /// Create a frame.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Centre point.
    #[must_use]
    pub const fn center(&self) -> (i32, i32) {
        (
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    /// Bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centred.
    Center,
    /// Flush right.
    Right,
}

impl TextAlign {
    fn css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Content of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    /// Plain container.
    Block,
    /// Pre-wrapped text lines.
    Text {
        /// Lines in reading order.
        lines: Vec<String>,
        /// Font size in pixels.
        font_size: u8,
        /// Font weight.
        font_weight: FontWeight,
        /// Text color.
        color: Color,
        /// Alignment within the frame.
        align: TextAlign,
    },
    /// Image scaled to fit the frame.
    Image {
        /// Source URI.
        src: String,
        /// Alternate text.
        alt: String,
    },
    /// Horizontal rule along the top edge of the frame.
    Rule {
        /// Line color.
        color: Color,
    },
}

/// One node of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupNode {
    /// Region identifier, addressable by the exporter.
    pub id: Option<String>,
    /// Space-separated class names.
    pub class: Option<String>,
    /// Content.
    pub kind: NodeKind,
    /// Absolute placement.
    pub frame: Frame,
    /// Display rotation in degrees, around the frame centre.
    pub rotation: i32,
    /// Opacity in percent.
    pub opacity: u8,
    /// Background fill.
    pub fill: Option<Color>,
    /// Outline color.
    pub stroke: Option<Color>,
    /// Child nodes, painted after this node in order.
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    /// Node of `kind` at `frame` with neutral styling.
    #[must_use]
    pub fn new(kind: NodeKind, frame: Frame) -> Self {
        Self {
            id: None,
            class: None,
            kind,
            frame,
            rotation: 0,
            opacity: 100,
            fill: None,
            stroke: None,
            children: Vec::new(),
        }
    }

    /// Empty container.
    #[must_use]
    pub fn block(frame: Frame) -> Self {
        Self::new(NodeKind::Block, frame)
    }

    /// Set the region id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the class list.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Append a child.
    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Depth-first search for a node by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Nodes in paint order (this node first).
    #[must_use]
    pub fn walk(&self) -> Box<dyn Iterator<Item = &Self> + '_> {
        Box::new(std::iter::once(self).chain(self.children.iter().flat_map(Self::walk)))
    }

    /// Concatenated text of this subtree, one line per text line.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.walk()
            .filter_map(|node| match &node.kind {
                NodeKind::Text { lines, .. } => Some(lines.join("\n")),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize this subtree to absolutely positioned HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(4096);
        write_html(&mut html, self, None);
        html
    }
}

/// Rendered page with its root region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupTree {
    /// Page root.
    pub root: MarkupNode,
}

impl MarkupTree {
    /// Wrap a root node.
    #[must_use]
    pub const fn new(root: MarkupNode) -> Self {
        Self { root }
    }

    /// Find a region by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&MarkupNode> {
        self.root.find(id)
    }

    /// Root fragment as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.root.to_html()
    }
}

/// Standalone HTML document wrapping `node`, sized to its frame.
#[must_use]
pub fn html_document(node: &MarkupNode, title: &str) -> String {
    let f = node.frame;
    let mut html = String::with_capacity(4096);
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>@page {{ size: {}px {}px; margin: 0 }} body {{ margin: 0 }}</style></head><body><div style=\"position:relative;width:{}px;height:{}px;font-family:sans-serif\">",
        escape_xml(title),
        f.width,
        f.height,
        f.width,
        f.height,
    );
    write_html(&mut html, node, Some(Frame::new(f.x, f.y, 0, 0)));
    html.push_str("</div></body></html>");
    html
}

fn write_html(html: &mut String, node: &MarkupNode, parent: Option<Frame>) {
    let f = node.frame;
    let (left, top) = parent.map_or((f.x, f.y), |p| (f.x.saturating_sub(p.x), f.y.saturating_sub(p.y)));

    html.push_str("<div");
    if let Some(id) = &node.id {
        let _ = write!(html, " id=\"{}\"", escape_xml(id));
    }
    if let Some(class) = &node.class {
        let _ = write!(html, " class=\"{}\"", escape_xml(class));
    }
    let _ = write!(
        html,
        " style=\"position:absolute;left:{left}px;top:{top}px;width:{}px;height:{}px",
        f.width, f.height
    );
    if node.rotation != 0 {
        let _ = write!(html, ";transform:rotate({}deg)", node.rotation);
    }
    if node.opacity < 100 {
        let _ = write!(html, ";opacity:{}", f32::from(node.opacity) / 100.0);
    }
    if let Some(fill) = node.fill {
        let _ = write!(html, ";background:{fill}");
    }
    if let Some(stroke) = node.stroke {
        let _ = write!(html, ";outline:2px solid {stroke}");
    }

    match &node.kind {
        NodeKind::Block => html.push_str("\">"),
        NodeKind::Text {
            lines,
            font_size,
            font_weight,
            color,
            align,
        } => {
            let _ = write!(
                html,
                ";font-size:{font_size}px;font-weight:{};color:{color};text-align:{};line-height:{}px;white-space:pre\">",
                font_weight.css(),
                align.css(),
                crate::layout::line_height(*font_size),
            );
            let escaped: Vec<String> = lines.iter().map(|l| escape_xml(l)).collect();
            html.push_str(&escaped.join("<br>"));
        }
        NodeKind::Image { src, alt } => {
            let _ = write!(
                html,
                "\"><img src=\"{}\" alt=\"{}\" style=\"width:100%;height:100%;object-fit:contain\" draggable=\"false\">",
                escape_xml(src),
                escape_xml(alt),
            );
        }
        NodeKind::Rule { color } => {
            let _ = write!(html, ";border-top:2px solid {color}\">");
        }
    }

    for child in &node.children {
        write_html(html, child, Some(f));
    }
    html.push_str("</div>");
}

/// Escape special XML characters.
pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MarkupNode {
        let mut root = MarkupNode::block(Frame::new(0, 0, 800, 600)).with_id("page");
        let mut group = MarkupNode::block(Frame::new(100, 100, 200, 100)).with_id("group");
        group.push(
            MarkupNode::new(
                NodeKind::Text {
                    lines: vec!["A < B".to_string(), "second".to_string()],
                    font_size: 16,
                    font_weight: FontWeight::Bold,
                    color: Color::INK,
                    align: TextAlign::Left,
                },
                Frame::new(110, 120, 100, 40),
            )
            .with_id("label"),
        );
        root.push(group);
        root
    }

    #[test]
    fn test_find_nested_region() {
        let root = sample();
        assert_eq!(root.find("label").map(|n| n.frame.x), Some(110));
        assert!(root.find("missing").is_none());
    }

    #[test]
    fn test_html_uses_parent_relative_offsets() {
        let html = sample().to_html();
        assert!(html.starts_with("<div id=\"page\""));
        assert!(html.contains("id=\"label\" style=\"position:absolute;left:10px;top:20px"));
        assert!(html.contains("A &lt; B<br>second"));
        assert!(html.contains("font-weight:bold"));
    }

    #[test]
    fn test_text_content() {
        assert_eq!(sample().text_content(), "A < B\nsecond");
    }

    #[test]
    fn test_html_document_wraps_region() {
        let root = sample();
        let group = root.find("group").expect("group");
        let doc = html_document(group, "Report & Co");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Report &amp; Co</title>"));
        assert!(doc.contains("id=\"group\" style=\"position:absolute;left:0px;top:0px"));
    }
}
