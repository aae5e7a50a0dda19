//! # Folio CLI
//!
//! Command-line host for the Folio layout engine. Loads a document snapshot,
//! optionally restores a saved element layout and replays an editing script,
//! then renders the page and exports it.
//!
//! ## Usage
//!
//! ```bash
//! folio render --document letter.json --format pdf --out letter.pdf
//! folio render --document letter.json --events edits.json --interactive --format png
//! folio layout --document letter.json --events edits.json > layout.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `RenderConfig` - Resolved settings for one render
//! - `load_editor` - Builds an [`Editor`] from the configured files
//! - `script` - Replays pointer and toolbar actions

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod script;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use folio_core::{CanvasConfig, DocumentSnapshot, Editor, SeedPolicy};
use folio_renderer::{artifact_filename, ExportConfig, ExportFormat, PreviewMode};

pub use script::{apply_action, parse_script, run_script, Action, ScriptError};

/// Command-line arguments for folio.
#[derive(Debug, Clone, Parser)]
#[command(name = "folio")]
#[command(about = "Lay out structured documents and export them")]
#[command(version)]
pub struct CliArgs {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render the document and write the exported artifact.
    Render(RenderArgs),
    /// Print the element layout (JSON) after applying the script.
    Layout(RenderArgs),
}

/// Arguments shared by the subcommands.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Document snapshot (JSON)
    #[arg(long, env = "FOLIO_DOCUMENT")]
    pub document: PathBuf,

    /// Saved element layout (JSON) replacing the seeded elements
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Editing script (JSON list of actions) replayed before rendering
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Output format: html, svg, png or pdf
    #[arg(long, env = "FOLIO_FORMAT", default_value = "pdf")]
    pub format: ExportFormat,

    /// Output file (default: derived from the document title)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Export the editable canvas instead of the document preview
    #[arg(long)]
    pub interactive: bool,

    /// Keep user-added elements when the document is reseeded
    #[arg(long)]
    pub merge_seed: bool,

    /// Print resolution in dots per inch
    #[arg(long, env = "FOLIO_DPI", default_value = "96")]
    pub dpi: f32,

    /// Raster scale factor (e.g. 2 for retina)
    #[arg(long, default_value = "1")]
    pub scale: f32,
}

/// Resolved settings for one render.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Document snapshot path.
    pub document: PathBuf,
    /// Saved layout path.
    pub layout: Option<PathBuf>,
    /// Script path.
    pub events: Option<PathBuf>,
    /// Output format.
    pub format: ExportFormat,
    /// Output path override.
    pub out: Option<PathBuf>,
    /// Which preview to export.
    pub mode: PreviewMode,
    /// Canvas settings.
    pub canvas: CanvasConfig,
    /// Rasterization settings.
    pub export: ExportConfig,
}

impl From<RenderArgs> for RenderConfig {
    fn from(args: RenderArgs) -> Self {
        Self {
            document: args.document,
            layout: args.layout,
            events: args.events,
            format: args.format,
            out: args.out,
            mode: if args.interactive {
                PreviewMode::Interactive
            } else {
                PreviewMode::Static
            },
            canvas: CanvasConfig {
                seed_policy: if args.merge_seed {
                    SeedPolicy::Merge
                } else {
                    SeedPolicy::Replace
                },
                ..CanvasConfig::default()
            },
            export: ExportConfig {
                dpi: if args.dpi > 0.0 { args.dpi } else { 96.0 },
                scale: if args.scale > 0.0 { args.scale } else { 1.0 },
                ..ExportConfig::default()
            },
        }
    }
}

impl RenderConfig {
    /// Where to write the artifact.
    #[must_use]
    pub fn output_path(&self, document: &DocumentSnapshot) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| PathBuf::from(artifact_filename(&document.title, self.format)))
    }
}

fn read(path: &Path, what: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {what} {}", path.display()))
}

/// Build an editor from the configured document, layout and script.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or a script step is
/// rejected.
pub fn load_editor(config: &RenderConfig) -> anyhow::Result<Editor> {
    let document = DocumentSnapshot::from_json(&read(&config.document, "document")?)
        .with_context(|| format!("Invalid document {}", config.document.display()))?;
    tracing::info!(title = %document.title, template = ?document.template.kind, "Loaded document");

    let mut editor = Editor::new(config.canvas, document);
    editor.set_on_document_change(|doc| {
        tracing::info!(
            signature = doc.signature_image().is_some(),
            "Document updated from canvas"
        );
    });

    if let Some(path) = &config.layout {
        editor
            .canvas_mut()
            .load_json(&read(path, "layout")?)
            .with_context(|| format!("Invalid layout {}", path.display()))?;
        tracing::debug!(elements = editor.canvas().len(), "Restored layout");
    }

    if let Some(path) = &config.events {
        let actions = parse_script(&read(path, "script")?)
            .with_context(|| format!("Invalid script {}", path.display()))?;
        run_script(&mut editor, &actions)?;
        tracing::debug!(steps = actions.len(), "Replayed script");
    }

    Ok(editor)
}
