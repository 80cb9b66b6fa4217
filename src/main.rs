mod app;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use retrieval_lens::perspective::{Perspective, QualityFilter};
use retrieval_lens::quality::SizePreset;
use retrieval_lens::{Canvas, LayoutSettings, Snapshot, ViewConfig, render_points};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Retrieval snapshot JSON: `{ "questions": [...], "catalog": [...] }`.
    snapshot: PathBuf,

    /// Layout settings TOML; `retrieval-lens.toml` is used when present.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Perspective::QuestionsToChunks)]
    perspective: Perspective,

    #[arg(long, value_enum, default_value_t = QualityFilter::All)]
    filter: QualityFilter,

    #[arg(long, value_enum, default_value_t = SizePreset::Medium)]
    size: SizePreset,

    #[arg(long)]
    no_tooltips: bool,

    /// Write the projected point list as JSON instead of opening the viewer.
    #[arg(long)]
    export: Option<PathBuf>,

    #[arg(long, default_value_t = 1200.0)]
    width: f32,

    #[arg(long, default_value_t = 800.0)]
    height: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = LayoutSettings::load(args.config.as_deref()).context("loading layout settings")?;
    let view = ViewConfig {
        perspective: args.perspective,
        quality_filter: args.filter,
        size_preset: args.size,
        tooltips: !args.no_tooltips,
    };

    if let Some(output) = &args.export {
        return export(&args, &settings, &view, output);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let snapshot_path = args.snapshot.clone();
    eframe::run_native(
        "retrieval-lens",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::LensApp::new(
                cc,
                snapshot_path.clone(),
                settings,
                view,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

fn export(args: &Args, settings: &LayoutSettings, view: &ViewConfig, output: &Path) -> Result<()> {
    let snapshot = Snapshot::load(&args.snapshot)
        .with_context(|| format!("loading snapshot {}", args.snapshot.display()))?;
    let canvas = Canvas::new(args.width, args.height, settings.canvas_margin);
    let points = render_points(&snapshot, view, settings, canvas);

    let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &points)
        .with_context(|| format!("writing {}", output.display()))?;

    info!(
        perspective = ?view.perspective,
        points = points.len(),
        output = %output.display(),
        "exported points"
    );
    Ok(())
}
