//! Surface Validator CLI
//!
//! Demonstration orchestrator: drives a mock capture source through the
//! validation pipeline and reports the outcome the way a screen-capture
//! test harness would.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use surface_validator::{
    CapturePipeline, FileConfig, MockCaptureSource, PipelineConfig, PixelColor, PixelPredicate,
    Region,
};
use tracing::{info, warn};

/// Fail ratio at which a run is reported as obstructed rather than as a
/// color defect.
const OBSTRUCTION_THRESHOLD: f64 = 0.95;

#[derive(Parser, Debug)]
#[command(name = "surface-validator", version, about = "Frame validation pipeline demo")]
struct Args {
    /// Number of frames to deliver and wait for.
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Render every Nth frame in the wrong color to exercise failure paths.
    #[arg(long)]
    fail_every: Option<u64>,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Surface Validator v{}", surface_validator::VERSION);

    let (mut pipeline_config, capture_settings) = match args.config {
        Some(ref path) => match FileConfig::from_file(path) {
            Ok(config) => (config.pipeline, config.capture),
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            let capture = surface_validator::CaptureSettings {
                width: args.width,
                height: args.height,
                ..Default::default()
            };
            (PipelineConfig::default(), capture)
        }
    };
    pipeline_config.target_frames = args.frames;

    let source = Arc::new(MockCaptureSource::new(
        capture_settings.width,
        capture_settings.height,
    ));
    let region = Region::new(0, 0, capture_settings.width, capture_settings.height);
    let predicate = PixelPredicate::expecting(PixelColor::RED);

    let pipeline = match CapturePipeline::new(Arc::clone(&source), region, predicate, pipeline_config)
    {
        Ok(p) => Arc::new(p),
        Err(e) => {
            eprintln!("Failed to start pipeline: {}", e);
            std::process::exit(1);
        }
    };

    info!(frames = args.frames, "Delivering frames...");

    // Producer context: an arbitrary thread firing frame-ready callbacks
    let producer = {
        let source = Arc::clone(&source);
        let pipeline = Arc::clone(&pipeline);
        let frames = args.frames;
        let fail_every = args.fail_every;
        let interval = Duration::from_millis(capture_settings.frame_interval_ms);
        std::thread::spawn(move || {
            for i in 0..frames {
                let color = match fail_every {
                    Some(n) if n > 0 && i % n == n - 1 => PixelColor::BLUE,
                    _ => PixelColor::RED,
                };
                if let Err(e) = pipeline.on_frame_ready(source.next_frame(color)) {
                    warn!("Frame delivery stopped: {}", e);
                    break;
                }
                std::thread::sleep(interval);
            }
        })
    };

    let wait_limit =
        Duration::from_millis(capture_settings.frame_interval_ms * args.frames + 5_000);
    if !pipeline.wait_until_target(wait_limit) {
        warn!(
            processed = pipeline.frames_processed(),
            "Frame target not reached before timeout"
        );
    }
    let _ = producer.join();

    let report = match pipeline.finish() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Pipeline teardown failed: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        pass = report.pass_frames,
        fail = report.fail_frames,
        dropped = report.dropped_frames,
        snapshots = report.snapshots.len(),
        outstanding = source.outstanding(),
        "Validation complete"
    );

    println!(
        "Frames: {} pass, {} fail ({:.1}% fail ratio), {} snapshot(s) retained",
        report.pass_frames,
        report.fail_frames,
        report.fail_ratio() * 100.0,
        report.snapshots.len()
    );

    if report.is_obstructed(OBSTRUCTION_THRESHOLD) {
        println!("Near-total failure: content likely never rendered or captured (obstruction)");
    }
    for snapshot in &report.snapshots {
        println!(
            "  failing frame seq={} ({}x{})",
            snapshot.sequence(),
            snapshot.width(),
            snapshot.height()
        );
    }

    if report.fail_frames > 0 {
        std::process::exit(1);
    }
}
