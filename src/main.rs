//! Facelink - Facial Kinematics Streaming Service
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use facelink::{
    config::Config,
    output::{CoordinateStream, HudLog},
    pipeline::Pipeline,
    tracking::{receiver::LandmarkReceiver, subprocess::TrackerSubprocess},
};

/// Facelink - streams facial kinematics to an avatar consumer
#[derive(Parser, Debug)]
#[command(name = "facelink", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera device index (overrides config)
    #[arg(long)]
    camera: Option<u32>,

    /// Downstream consumer host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Downstream consumer port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Disable the TCP coordinate stream
    #[arg(long)]
    no_stream: bool,

    /// Do not auto-launch the tracker subprocess
    #[arg(long)]
    no_launch: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", facelink::NAME, facelink::VERSION);

    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    if let Some(camera) = args.camera {
        config.tracker.camera_device = camera;
    }
    if let Some(ref host) = args.host {
        config.stream.host = host.clone();
    }
    if let Some(port) = args.port {
        config.stream.port = port;
    }
    if args.no_stream {
        config.stream.enabled = false;
    }
    if args.no_launch {
        config.tracker.auto_launch = false;
    }

    // Validate configuration
    config.validate()?;

    info!("Camera device: {}", config.tracker.camera_device);
    info!("Landmark receiver: {}:{}", config.tracker.listen_address, config.tracker.port);
    if config.stream.enabled {
        info!("Coordinate stream: {}:{}", config.stream.host, config.stream.port);
    } else {
        info!("Coordinate stream disabled");
    }

    // Cooperative stop flag, checked once per loop iteration
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            info!("Shutdown signal received");
            stop.store(true, Ordering::Relaxed);
        })?;
    }

    // Optionally launch the tracker subprocess
    let mut subprocess = if config.tracker.auto_launch {
        let mut sp = TrackerSubprocess::new(&config.tracker);
        if let Err(e) = sp.start() {
            error!("Failed to auto-launch tracker: {}", e);
            // Continue anyway — the tracker may be running externally
        }
        Some(sp)
    } else {
        None
    };

    let receiver = LandmarkReceiver::bind(&config.tracker)?;

    let mut pipeline = Pipeline::new(receiver);
    pipeline.add_sink(Box::new(HudLog::new(config.telemetry.log_frame_interval)));
    if config.stream.enabled {
        pipeline.add_sink(Box::new(CoordinateStream::connect(&config.stream)?));
    }

    let result = pipeline.run(&stop);

    // Release the tracker before reporting the loop result
    if let Some(ref mut sp) = subprocess {
        sp.stop();
    }

    match result {
        Ok(()) => {
            info!("Facelink stopped");
            Ok(())
        }
        Err(e) => {
            error!("Frame loop terminated: {}", e);
            Err(e.into())
        }
    }
}
