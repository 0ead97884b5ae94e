//! CLI for driftwall — a comment wall that drifts.

mod commands;
mod tui;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "driftwall")]
#[command(about = "driftwall — a comment wall that drifts")]
#[command(version = driftwall_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the live wall in the terminal (TUI)
    Wall {
        /// Path to a feed snapshot (JSON array of message records)
        feed: String,

        /// Path to a compressed frame asset for the overlay animation
        #[arg(long)]
        asset: Option<String>,

        /// Overlay frame rate
        #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,

        /// Fixed swarm capacity instead of the width-based policy
        #[arg(long)]
        capacity: Option<usize>,

        /// RNG seed for a reproducible wall
        #[arg(long)]
        seed: Option<u64>,

        /// Hold the overlay in the pending-gesture state until space is
        /// pressed (mimics hosts that reject autoplay)
        #[arg(long)]
        gesture: bool,
    },

    /// Pack a JSON array of frame strings into a compressed text asset
    Encode {
        /// Path to a JSON file holding an array of frame strings
        input: String,

        /// Output path (default: stdout)
        #[arg(long)]
        output: Option<String>,

        /// Frame rate stamped into the summary
        #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,
    },

    /// Decode a frame asset and print its shape
    Inspect {
        /// Path to a compressed frame asset
        asset: String,

        /// Frame rate to interpret the asset with
        #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,

        /// Print the text of one frame by index
        #[arg(long)]
        frame: Option<usize>,

        /// Emit machine-readable JSON instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Offline sampling-frequency report for a feed snapshot
    Stats {
        /// Path to a feed snapshot (JSON array of message records)
        feed: String,

        /// Number of draws
        #[arg(long, default_value = "100000")]
        draws: usize,

        /// RNG seed for a reproducible report
        #[arg(long)]
        seed: Option<u64>,

        /// Emit machine-readable JSON instead of the table
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Wall {
            feed,
            asset,
            fps,
            capacity,
            seed,
            gesture,
        } => commands::wall::run(commands::wall::WallCommandConfig {
            feed_path: &feed,
            asset_path: asset.as_deref(),
            fps,
            capacity,
            seed,
            require_gesture: gesture,
        }),
        Commands::Encode { input, output, fps } => {
            commands::encode::run(&input, output.as_deref(), fps)
        }
        Commands::Inspect {
            asset,
            fps,
            frame,
            json,
        } => commands::inspect::run(&asset, fps, frame, json),
        Commands::Stats {
            feed,
            draws,
            seed,
            json,
        } => commands::stats::run(&feed, draws, seed, json),
    }
}
