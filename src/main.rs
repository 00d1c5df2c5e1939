mod boss;
mod collision;
mod config;
mod game;
mod logging;
mod particles;
mod player;
mod render;
mod scrap;
mod scrap_manager;
mod tuning;
mod utils;

use clap::Parser;
use log::{LevelFilter, info};
use macroquad::prelude::*;
use std::path::PathBuf;
use std::process;

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Jump straight into a stage (1-3), skipping the title screen.
    #[arg(long)]
    stage: Option<usize>,

    /// Balance parameters file (JSON). Missing or broken files fall back to
    /// built-in defaults.
    #[arg(long, default_value = "tuning.json")]
    tuning: PathBuf,

    /// Write the effective tuning values back out to the tuning file and exit.
    #[arg(long)]
    write_tuning: bool,

    /// Debug filter to specify log topics (e.g. "suction,fire,spawn,collision,boss")
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Scrapstorm".to_owned(),
        window_width: config::WINDOW_WIDTH,
        window_height: config::WINDOW_HEIGHT,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    if let Err(e) = logging::init_logger(log_level, args.debug_filter) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    info!("Initializing Scrapstorm");

    let tuning = tuning::Tuning::load_or_default(&args.tuning);

    if args.write_tuning {
        match tuning.save(&args.tuning) {
            Ok(()) => {
                info!("Wrote tuning to {}", args.tuning.display());
                process::exit(0);
            }
            Err(e) => {
                log::error!("Failed to write tuning: {}", e);
                process::exit(1);
            }
        }
    }

    let mut game = game::Game::new(tuning);

    if let Some(stage) = args.stage {
        game.start_stage(stage);
    }

    let mut renderer = render::Renderer::new();
    info!("Renderer initialized");

    game.run(&mut renderer).await;
}
