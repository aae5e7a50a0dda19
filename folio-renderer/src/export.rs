//! Region export to shareable artifacts.
//!
//! [`ExportBridge`] locates a region of a rendered tree and hands it to an
//! [`ExportCapability`]. Only one export runs at a time; the in-flight flag
//! is released on every exit path, including errors and panics inside the
//! capability.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use base64::Engine;

use crate::error::{ExportError, ExportResult};
use crate::markup::{html_document, MarkupNode, MarkupTree};
use crate::svg::render_svg;

/// Export output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Standalone HTML page.
    Html,
    /// SVG vector graphics.
    Svg,
    /// PNG image.
    Png,
    /// PDF document with embedded raster image.
    #[default]
    Pdf,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    /// MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(Self::Html),
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            other => Err(ExportError::Unsupported(other.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Rasterization settings.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// DPI for print export (default: 96.0).
    pub dpi: f32,
    /// Background color as RGBA bytes.
    pub background: [u8; 4],
    /// Scale factor (e.g. 2.0 for retina).
    pub scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dpi: 96.0,
            background: [255, 255, 255, 255],
            scale: 1.0,
        }
    }
}

/// A produced file, ready to download or share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name, extension included.
    pub filename: String,
    /// Format of `bytes`.
    pub format: ExportFormat,
    /// Encoded content.
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Encode as a `data:` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Derive a safe file name from a user-supplied hint.
///
/// Characters outside `[A-Za-z0-9._-]` become `_`; an empty result falls
/// back to `document`. The format's extension is always appended.
#[must_use]
pub fn artifact_filename(hint: &str, format: ExportFormat) -> String {
    let ext = format.extension();
    let trimmed = hint.trim();
    let stem = trimmed
        .strip_suffix(&format!(".{ext}"))
        .unwrap_or(trimmed);
    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches(|c| c == '_' || c == '.');
    let stem = if sanitized.is_empty() { "document" } else { sanitized };
    format!("{stem}.{ext}")
}

/// Something that can turn a rendered region into an artifact.
#[async_trait]
pub trait ExportCapability: Send + Sync {
    /// Format this capability produces.
    fn format(&self) -> ExportFormat;

    /// Produce an artifact from `region`.
    ///
    /// # Errors
    ///
    /// Returns an error if the region cannot be rasterized or encoded.
    async fn render(&self, region: &MarkupNode, filename: &str) -> ExportResult<Artifact>;
}

/// Releases the in-flight flag when dropped.
struct ExportGuard<'a>(&'a AtomicBool);

impl<'a> ExportGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> ExportResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| ExportError::Busy)
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-flight export front end.
pub struct ExportBridge<C> {
    capability: C,
    exporting: AtomicBool,
}

impl<C: ExportCapability> ExportBridge<C> {
    /// Wrap a capability.
    #[must_use]
    pub const fn new(capability: C) -> Self {
        Self {
            capability,
            exporting: AtomicBool::new(false),
        }
    }

    /// Whether an export is currently running.
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    /// The wrapped capability.
    #[must_use]
    pub const fn capability(&self) -> &C {
        &self.capability
    }

    /// Export the region `region_id` of `tree`.
    ///
    /// The tree is only read. A failed export leaves nothing behind and can
    /// simply be retried.
    ///
    /// # Errors
    ///
    /// - [`ExportError::RegionNotFound`] if no node has `region_id`
    /// - [`ExportError::Busy`] if another export is in flight
    /// - whatever the capability reports
    pub async fn export_to_artifact(
        &self,
        tree: &MarkupTree,
        region_id: &str,
        filename_hint: &str,
    ) -> ExportResult<Artifact> {
        let region = tree
            .find(region_id)
            .ok_or_else(|| ExportError::RegionNotFound(region_id.to_string()))?;
        let _guard = ExportGuard::acquire(&self.exporting)?;

        let format = self.capability.format();
        let filename = artifact_filename(filename_hint, format);
        tracing::debug!(region = region_id, %format, %filename, "Export started");

        match self.capability.render(region, &filename).await {
            Ok(artifact) => {
                tracing::info!(
                    region = region_id,
                    filename = %artifact.filename,
                    bytes = artifact.bytes.len(),
                    "Export finished"
                );
                Ok(artifact)
            }
            Err(e) => {
                tracing::warn!(region = region_id, error = %e, "Export failed");
                Err(e)
            }
        }
    }
}

impl<C> std::fmt::Debug for ExportBridge<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportBridge")
            .field("exporting", &self.exporting.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Default capability: serializes regions locally.
///
/// HTML and SVG are always available. PNG and PDF rasterize the SVG with
/// resvg and need the `export` feature.
#[derive(Debug, Clone, Default)]
pub struct PageRasterizer {
    config: ExportConfig,
    format: ExportFormat,
}

impl PageRasterizer {
    /// Create a rasterizer for `format`.
    #[must_use]
    pub const fn new(format: ExportFormat, config: ExportConfig) -> Self {
        Self { config, format }
    }

    /// Rasterizer for `format` with default settings.
    #[must_use]
    pub fn with_format(format: ExportFormat) -> Self {
        Self::new(format, ExportConfig::default())
    }

    /// Encode `region` in this rasterizer's format.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails, or the format
    /// is not compiled in.
    pub fn encode(&self, region: &MarkupNode, title: &str) -> ExportResult<Vec<u8>> {
        match self.format {
            ExportFormat::Html => Ok(html_document(region, title).into_bytes()),
            ExportFormat::Svg => Ok(render_svg(region, &self.config).into_bytes()),
            ExportFormat::Png => self.render_png(region),
            ExportFormat::Pdf => self.render_pdf(region, title),
        }
    }

    #[cfg(feature = "export")]
    fn render_png(&self, region: &MarkupNode) -> ExportResult<Vec<u8>> {
        let pixmap = self.rasterize(region)?;
        pixmap
            .encode_png()
            .map_err(|e| ExportError::Encode(format!("PNG encoding failed: {e}")))
    }

    #[cfg(not(feature = "export"))]
    fn render_png(&self, _region: &MarkupNode) -> ExportResult<Vec<u8>> {
        Err(ExportError::Unsupported(self.format.to_string()))
    }

    /// Rasterize the region and embed it in a single PDF page sized to it.
    #[cfg(feature = "export")]
    #[allow(clippy::cast_precision_loss)]
    fn render_pdf(&self, region: &MarkupNode, title: &str) -> ExportResult<Vec<u8>> {
        let pixmap = self.rasterize(region)?;
        let png_data = pixmap
            .encode_png()
            .map_err(|e| ExportError::Encode(format!("PNG encoding failed: {e}")))?;

        // Page size follows the unscaled region so the print size stays fixed.
        let page_width_mm = region.frame.width.max(1) as f32 / self.config.dpi * 25.4;
        let page_height_mm = region.frame.height.max(1) as f32 / self.config.dpi * 25.4;

        let (doc, page1, layer1) = printpdf::PdfDocument::new(
            title,
            printpdf::Mm(page_width_mm),
            printpdf::Mm(page_height_mm),
            "Page",
        );
        let current_layer = doc.get_page(page1).get_layer(layer1);

        let dynamic_image = printpdf::image_crate::load_from_memory(&png_data)
            .map_err(|e| ExportError::Encode(format!("Failed to decode PNG for PDF: {e}")))?;
        let pdf_image = printpdf::Image::from_dynamic_image(&dynamic_image);

        let transform = printpdf::ImageTransform {
            translate_x: Some(printpdf::Mm(0.0)),
            translate_y: Some(printpdf::Mm(0.0)),
            dpi: Some(self.config.dpi * self.config.scale),
            ..Default::default()
        };
        pdf_image.add_to_layer(current_layer, transform);

        doc.save_to_bytes()
            .map_err(|e| ExportError::Encode(format!("PDF save failed: {e}")))
    }

    #[cfg(not(feature = "export"))]
    fn render_pdf(&self, _region: &MarkupNode, _title: &str) -> ExportResult<Vec<u8>> {
        Err(ExportError::Unsupported(self.format.to_string()))
    }

    #[cfg(feature = "export")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(&self, region: &MarkupNode) -> ExportResult<tiny_skia::Pixmap> {
        let svg = render_svg(region, &self.config);
        let mut opt = usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();
        let tree = usvg::Tree::from_str(&svg, &opt)
            .map_err(|e| ExportError::Rasterize(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width().ceil() as u32;
        let px_h = tree.size().height().ceil() as u32;
        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| ExportError::Rasterize("Failed to create pixmap".to_string()))?;

        // Output size already carries the scale factor; the viewBox maps onto it.
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        Ok(pixmap)
    }
}

#[async_trait]
impl ExportCapability for PageRasterizer {
    fn format(&self) -> ExportFormat {
        self.format
    }

    async fn render(&self, region: &MarkupNode, filename: &str) -> ExportResult<Artifact> {
        let title = filename
            .rsplit_once('.')
            .map_or(filename, |(stem, _)| stem);
        let bytes = self.encode(region, title)?;
        Ok(Artifact {
            filename: filename.to_string(),
            format: self.format,
            bytes,
        })
    }
}
