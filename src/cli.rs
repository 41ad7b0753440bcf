// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands that do not need the terminal UI
//!
//! - Headless frame loop runs
//! - Parameter table and mode listings

use filtercam::backends::{FrameLoop, LogSink, LoopAction, open_source};
use filtercam::config::Config;
use filtercam::constants::display;
use filtercam::{AppResult, Mode, Variant};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

/// Run the frame loop on this thread until the frame limit or Ctrl-C
pub fn run_headless(config: &Config, frames: Option<u64>, mode: Option<Mode>) -> AppResult<()> {
    let (modes, store) = config.build_state()?;
    if let Some(mode) = mode {
        modes.select_mode(mode)?;
    }
    let modes = Arc::new(modes);
    let store = Arc::new(store);

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || {
        stop_handler.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Could not install Ctrl-C handler");
    }

    let source = open_source(&config.source)?;
    let sink = LogSink::new(frames, display::LOG_EVERY_FRAMES);
    let mut frame_loop = FrameLoop::new(source, sink, Arc::clone(&modes), Arc::clone(&store));
    let interval = config.frame_interval();

    println!("Running {} mode (press Ctrl+C to stop)...", modes.active());
    let started = Instant::now();

    while !stop.load(Ordering::SeqCst) {
        let tick_started = Instant::now();
        if frame_loop.step() == LoopAction::Stop {
            break;
        }
        let remaining = interval.saturating_sub(tick_started.elapsed());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    let presented = frame_loop.presented();
    info!(presented, elapsed_secs = elapsed, "Headless run finished");

    println!();
    println!("Frames processed: {}", presented);
    if elapsed > 0.0 {
        println!("Average FPS:      {:.1}", presented as f64 / elapsed);
    }
    if let Some(status) = frame_loop.sink().last_status() {
        println!("Last frame:       {}", status);
    }

    Ok(())
}

#[derive(Serialize)]
struct ParamRow {
    name: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    default: f64,
    odd: bool,
    kind: filtercam::params::ParamKind,
    description: &'static str,
}

/// Print the stable parameter table for configuration and UI binding
pub fn print_params(variant: Variant, json: bool) -> AppResult<()> {
    let rows: Vec<ParamRow> = variant
        .parameters()
        .iter()
        .map(|id| {
            let spec = id.spec();
            ParamRow {
                name: id.name(),
                label: id.label(),
                min: spec.min,
                max: spec.max,
                default: spec.default,
                odd: spec.is_odd_kernel(),
                kind: spec.kind,
                description: id.description(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Parameters ({} variant):", variant);
    println!();
    println!(
        "  {:<24} {:>6} {:>6} {:>8}  {:<4}",
        "NAME", "MIN", "MAX", "DEFAULT", "ODD"
    );
    for row in &rows {
        println!(
            "  {:<24} {:>6} {:>6} {:>8}  {:<4}",
            row.name,
            row.min,
            row.max,
            row.default,
            if row.odd { "yes" } else { "no" }
        );
    }
    println!();
    println!(
        "  binarizePolicy values: {}",
        filtercam::ThresholdPolicy::ALL
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{i}={p}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}

/// Print the modes of a variant with their descriptions
pub fn print_modes(variant: Variant) {
    println!("Modes ({} variant):", variant);
    for (index, mode) in variant.modes().iter().enumerate() {
        println!();
        println!("  [{}] {} ({})", index + 1, mode.display_name(), mode.name());
        println!("      {}", mode.description());
        let params: Vec<&str> = mode.parameters().iter().map(|p| p.name()).collect();
        if !params.is_empty() {
            println!("      Parameters: {}", params.join(", "));
        }
    }
}
