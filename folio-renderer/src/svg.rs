//! SVG serialization of markup regions.
//!
//! The SVG is the intermediate for rasterization, so it must describe the
//! same geometry the HTML view shows: frames are translated so the region's
//! own origin lands at `(0, 0)`.

use std::fmt::Write;

use crate::export::ExportConfig;
use crate::layout::line_height;
use crate::markup::{escape_xml, Frame, MarkupNode, NodeKind, TextAlign};

/// Render `region` to a standalone SVG document.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_svg(region: &MarkupNode, config: &ExportConfig) -> String {
    let frame = region.frame;
    let view_w = frame.width.max(1);
    let view_h = frame.height.max(1);
    let out_w = (view_w as f32 * config.scale).round().max(1.0) as u32;
    let out_h = (view_h as f32 * config.scale).round().max(1.0) as u32;

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
    );

    let bg = &config.background;
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"rgba({},{},{},{})\"/>",
        bg[0],
        bg[1],
        bg[2],
        f32::from(bg[3]) / 255.0,
    );

    let _ = write!(
        svg,
        "<g transform=\"translate({},{})\">",
        frame.x.saturating_neg(),
        frame.y.saturating_neg()
    );
    render_node(&mut svg, region);
    svg.push_str("</g></svg>");
    svg
}

fn render_node(svg: &mut String, node: &MarkupNode) {
    let f = node.frame;
    svg.push_str("<g");
    if let Some(id) = &node.id {
        let _ = write!(svg, " id=\"{}\"", escape_xml(id));
    }
    if node.rotation != 0 {
        let (cx, cy) = f.center();
        let _ = write!(svg, " transform=\"rotate({} {cx} {cy})\"", node.rotation);
    }
    if node.opacity < 100 {
        let _ = write!(svg, " opacity=\"{}\"", f32::from(node.opacity) / 100.0);
    }
    svg.push('>');

    if let Some(fill) = node.fill {
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{fill}\"/>",
            f.x, f.y, f.width, f.height,
        );
    }

    match &node.kind {
        NodeKind::Block => {}
        NodeKind::Text {
            lines,
            font_size,
            font_weight,
            color,
            align,
        } => render_text(svg, f, lines, *font_size, font_weight.css(), &color.to_string(), *align),
        NodeKind::Image { src, .. } => {
            let escaped = escape_xml(src);
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid meet\" href=\"{escaped}\" xlink:href=\"{escaped}\"/>",
                f.x, f.y, f.width, f.height,
            );
        }
        NodeKind::Rule { color } => {
            let _ = write!(
                svg,
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{color}\" stroke-width=\"2\"/>",
                f.x,
                f.y,
                f.x.saturating_add(f.width),
                f.y,
            );
        }
    }

    if let Some(stroke) = node.stroke {
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"2\"/>",
            f.x, f.y, f.width, f.height,
        );
    }

    for child in &node.children {
        render_node(svg, child);
    }
    svg.push_str("</g>");
}

fn render_text(
    svg: &mut String,
    f: Frame,
    lines: &[String],
    font_size: u8,
    weight: &str,
    color: &str,
    align: TextAlign,
) {
    let (x, anchor) = match align {
        TextAlign::Left => (f.x, "start"),
        TextAlign::Center => (f.x.saturating_add(f.width / 2), "middle"),
        TextAlign::Right => (f.x.saturating_add(f.width), "end"),
    };
    let step = line_height(font_size);
    // Baseline sits a font size below the top of each line box.
    let mut baseline = f.y.saturating_add((step - i32::from(font_size)) / 2 + i32::from(font_size));
    for line in lines {
        if !line.is_empty() {
            let _ = write!(
                svg,
                "<text x=\"{x}\" y=\"{baseline}\" font-size=\"{font_size}\" font-weight=\"{weight}\" fill=\"{color}\" text-anchor=\"{anchor}\" font-family=\"sans-serif\" xml:space=\"preserve\">{}</text>",
                escape_xml(line),
            );
        }
        baseline = baseline.saturating_add(step);
    }
}
