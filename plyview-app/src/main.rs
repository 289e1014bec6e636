//! Plyview
//!
//! Remote PLY model viewer: fetches models from a fixed asset host, shows
//! them flat-shaded with their per-vertex colors, and swaps models and
//! parameter overlays from a button bar.

mod app;
mod camera;
mod controls;
mod state;
mod ui;

use clap::Parser;

/// Plyview - remote PLY model viewer
#[derive(Parser, Debug)]
#[command(name = "plyview")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL models are fetched from
    #[arg(long, default_value = state::DEFAULT_BASE_URL)]
    base_url: String,

    /// Initial model identifier
    #[arg(short, long, default_value = "gorgoile")]
    model: String,

    /// Initial parameter identifier
    #[arg(short, long, default_value = "sommets_visibles_centered")]
    parameter: String,
}

fn main() {
    // Note: tracing is initialized inside app::run, before the event loop.
    let args = Args::parse();

    let config = app::ViewerConfig {
        base_url: args.base_url,
        model: args.model,
        parameter: args.parameter,
    };

    if let Err(e) = app::run(config) {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}
