//! Mixcut CLI — Command-line interface for timeline documents.
//!
//! Usage:
//!   mixcut inspect <PATH>      Show timeline document information
//!   mixcut check <PATH>        Validate a timeline document
//!   mixcut resolve <PATH>      List clips active at a timeline time
//!   mixcut render <PATH>       Composite one preview frame to PNG
//!   mixcut record              Run a synthetic recording-compositor demo
//!   mixcut config              Show or update persisted preferences

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mixcut",
    about = "Timeline compositing and recording engine tools",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show timeline document information
    Inspect {
        /// Path to the timeline JSON document
        path: PathBuf,
    },

    /// Validate a timeline document
    Check {
        /// Path to the timeline JSON document
        path: PathBuf,
    },

    /// List the clips active at a timeline time
    Resolve {
        /// Path to the timeline JSON document
        path: PathBuf,

        /// Timeline time in seconds
        #[arg(short, long, default_value = "0.0")]
        time: f64,
    },

    /// Composite one preview frame and write it as PNG
    Render {
        /// Path to the timeline JSON document
        path: PathBuf,

        /// Timeline time in seconds
        #[arg(short, long, default_value = "0.0")]
        time: f64,

        /// Output PNG path
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,

        /// Canvas width
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Canvas height
        #[arg(long, default_value = "1080")]
        height: u32,

        /// Render-scale override (defaults to the persisted preference)
        #[arg(long)]
        scale: Option<f64>,
    },

    /// Run the recording compositor against synthetic sources
    Record {
        /// Simulated recording length in seconds
        #[arg(short, long, default_value = "2.0")]
        duration: f64,

        /// Disable the camera overlay
        #[arg(long)]
        no_camera: bool,

        /// Output PNG path for the final composited frame
        #[arg(short, long, default_value = "recording.png")]
        output: PathBuf,
    },

    /// Show or update persisted preferences
    Config {
        /// Set the preview render scale (0.25 to 2.0)
        #[arg(long)]
        set_render_scale: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    mixcut_common::logging::init_logging(&mixcut_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Inspect { path } => commands::inspect::run(path),
        Commands::Check { path } => commands::check::run(path),
        Commands::Resolve { path, time } => commands::resolve::run(path, time),
        Commands::Render {
            path,
            time,
            output,
            width,
            height,
            scale,
        } => commands::render::run(path, time, output, width, height, scale),
        Commands::Record {
            duration,
            no_camera,
            output,
        } => commands::record::run(duration, no_camera, output).await,
        Commands::Config { set_render_scale } => commands::config::run(set_render_scale),
    }
}
