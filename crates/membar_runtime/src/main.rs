//! Membar Runtime
//!
//! Terminal front end for the memory bar: loads settings and component
//! estimates, recalculates on a background worker and prints one frame.

mod terminal;

use anyhow::{bail, Context, Result};
use clap::Parser;
use membar_core::{
    RecalculationScheduler, SystemUsageSource, UsageRegistry, UsageSnapshotSource,
};
use membar_services::Settings;
use membar_ui::glam::IVec2;
use membar_ui::{DrawOutcome, FrameInput, MemoryBar, Rect};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use terminal::TerminalCanvas;
use tracing_subscriber::EnvFilter;

/// Matches a 60 Hz render loop.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(name = "membar", version, about = "Per-component memory usage bar")]
struct Args {
    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// JSON document of per-component usage estimates
    #[arg(long)]
    estimates: Option<PathBuf>,

    /// Bar width in terminal columns
    #[arg(long, default_value_t = 80)]
    width: u16,

    /// Column to hover; prints that segment's tooltip
    #[arg(long)]
    hover: Option<i32>,

    /// Give up if no segment list is published within this many milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!("Membar v{}", membar_core::VERSION);

    let settings =
        Settings::load_or_default(args.settings.as_deref()).context("loading settings")?;
    let registry = match &args.estimates {
        Some(path) => UsageRegistry::load_json(path)
            .with_context(|| format!("loading estimates from {}", path.display()))?,
        None => {
            tracing::info!("no --estimates given; showing host and available memory only");
            UsageRegistry::new()
        }
    };
    tracing::info!(components = registry.len(), "usage registry ready");

    let source: Arc<dyn UsageSnapshotSource> =
        Arc::new(SystemUsageSource::new(Arc::new(registry)));
    let options = settings.aggregate_options();
    let scheduler = match settings.tracking.worker_threads {
        Some(threads) => RecalculationScheduler::with_worker_threads(source, options, threads)?,
        None => RecalculationScheduler::new(source, options),
    };
    let bar = MemoryBar::new(scheduler).with_height(settings.display.bar_height);

    // Terminal rows stand in for pixels; the canvas prints row 0 of the bar.
    let window = Rect::new(0, 0, i32::from(args.width), i32::MAX);
    let frame = FrameInput {
        bounds: bar.bounds_in(window),
        pointer: IVec2::new(args.hover.unwrap_or(-1), 0),
        parent: window,
        screen_height: i32::MAX,
    };

    bar.on_activate();
    let deadline = Instant::now() + Duration::from_millis(args.timeout_ms);
    let mut canvas = TerminalCanvas::new(args.width as usize);
    loop {
        canvas.clear();
        match bar.draw(&mut canvas, &frame) {
            DrawOutcome::Drawn { segments, hovered } => {
                tracing::debug!(segments, ?hovered, "frame drawn");
                break;
            }
            DrawOutcome::Skipped => {
                let scheduler = bar.scheduler();
                if !scheduler.is_busy() {
                    if let Some(err) = scheduler.last_error() {
                        bail!("memory recalculation failed: {err}");
                    }
                }
                if Instant::now() >= deadline {
                    bail!("no memory figures after {} ms", args.timeout_ms);
                }
                std::thread::sleep(FRAME_INTERVAL);
            }
        }
    }

    print!("{}", canvas.render());
    if let Some(list) = bar.scheduler().current() {
        println!();
        for segment in list.iter() {
            println!("{}", terminal::swatch(segment.color));
            for line in segment.tooltip.lines() {
                println!("  {line}");
            }
        }
    }

    for (name, value) in bar.scheduler().counters().snapshot() {
        tracing::debug!(counter = %name, value, "recalculation counter");
    }
    tracing::debug!(
        capture = ?bar.scheduler().profiler().last("capture"),
        aggregate = ?bar.scheduler().profiler().last("aggregate"),
        "stage timings"
    );
    Ok(())
}
