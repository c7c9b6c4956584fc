// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser)]
#[command(name = "vcs")]
#[command(about = "Capture, anti-tear reconstruction, and filter-graph demonstration pipeline")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capture pipeline against a synthetic test source.
    Run {
        /// Capture width.
        #[arg(long, default_value = "640")]
        width: u32,

        /// Capture height.
        #[arg(long, default_value = "480")]
        height: u32,

        /// Enable the anti-tear engine.
        #[arg(long)]
        anti_tear: bool,

        /// Enable eco-mode adaptive sleep.
        #[arg(long)]
        eco: bool,

        /// Number of frames to present before exiting.
        #[arg(long, default_value = "120")]
        frames: u32,

        /// Path to a filter-graph file (accepted for interface symmetry with
        /// the original; this crate does not parse the format itself).
        #[arg(long, value_name = "FILE")]
        filter_graph: Option<PathBuf>,

        /// Path to a resolution-aliases file (see `filter_graph`'s caveat).
        #[arg(long, value_name = "FILE")]
        aliases: Option<PathBuf>,

        /// Path to a video-presets file (see `filter_graph`'s caveat).
        #[arg(long, value_name = "FILE")]
        video_presets: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Set RUST_LOG to control verbosity, e.g. RUST_LOG=debug.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run { width, height, anti_tear, eco, frames, filter_graph, aliases, video_presets }) => {
            cli::run(width, height, anti_tear, eco, frames, filter_graph, aliases, video_presets)
        }
        None => cli::run(640, 480, false, false, 120, None, None, None),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "unrecoverable failure");
            ExitCode::FAILURE
        }
    }
}
