// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use filtercam::config::{Config, SourceConfig};
use filtercam::{AppResult, Variant};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "filtercam")]
#[command(about = "Live edge detection and filter pipelines for camera frames")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Configuration file (default: ~/.config/filtercam/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Application variant: edges or filters
    #[arg(long, global = true)]
    variant: Option<Variant>,

    /// Use an image file as the frame source instead of the test pattern
    #[arg(short, long, global = true)]
    image: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal viewer (default)
    Terminal,

    /// Run the frame loop headless, logging the annotation
    Run {
        /// Stop after this many frames (runs until Ctrl-C when omitted)
        #[arg(short, long)]
        frames: Option<u64>,

        /// Mode to run (e.g. canny, sobel, binary_blur)
        #[arg(short, long)]
        mode: Option<filtercam::Mode>,
    },

    /// Print the parameter table of the selected variant
    Params {
        /// Emit JSON instead of a text table
        #[arg(long)]
        json: bool,
    },

    /// List the modes of the selected variant
    Modes,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=filtercam=trace, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        None | Some(Commands::Terminal) => filtercam::terminal::run(&config)?,
        Some(Commands::Run { frames, mode }) => cli::run_headless(&config, frames, mode)?,
        Some(Commands::Params { json }) => cli::print_params(config.variant, json)?,
        Some(Commands::Modes) => cli::print_modes(config.variant),
    }

    Ok(())
}

/// Configuration file overlaid with command-line overrides
fn resolve_config(cli: &Cli) -> AppResult<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(variant) = cli.variant
        && variant != config.variant
    {
        config.variant = variant;
        // A mode from the file's variant no longer applies
        config.initial_mode = None;
        config.parameters.clear();
    }
    if let Some(path) = &cli.image {
        config.source = SourceConfig::StillImage { path: path.clone() };
    }

    config.validate()?;
    Ok(config)
}
