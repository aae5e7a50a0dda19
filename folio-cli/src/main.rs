//! # Folio
//!
//! Command-line entry point.

use anyhow::Context;
use clap::Parser;
use folio_cli::{load_editor, CliArgs, Command, RenderConfig};
use folio_renderer::{render_editor, ExportBridge, PageRasterizer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,folio_core=debug,folio_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

async fn render(config: RenderConfig) -> anyhow::Result<()> {
    let editor = load_editor(&config)?;
    let tree = render_editor(&editor, config.mode);

    let bridge = ExportBridge::new(PageRasterizer::new(config.format, config.export.clone()));
    let path = config.output_path(editor.document());
    let hint = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let artifact = bridge
        .export_to_artifact(&tree, config.mode.region_id(), &hint)
        .await
        .context("Export failed")?;

    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {} ({} bytes)", path.display(), artifact.bytes.len());
    Ok(())
}

fn layout(config: &RenderConfig) -> anyhow::Result<()> {
    let editor = load_editor(config)?;
    println!("{}", editor.canvas().to_json()?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    tracing::debug!("Starting folio {}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Render(args) => render(RenderConfig::from(args)).await,
        Command::Layout(args) => layout(&RenderConfig::from(args)),
    }
}
