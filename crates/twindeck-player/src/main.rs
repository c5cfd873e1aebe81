//! Twindeck - two-deck keyboard DJ console
//!
//! This is the main entry point. It:
//! 1. Sends logs to a file next to the config (the terminal is in raw mode)
//! 2. Loads the config and builds the hotkey router
//! 3. Opens the audio output and, if enabled, the microphone
//! 4. Runs the key loop until Ctrl+Q or Escape
//! 5. Shuts audio down and writes the config back
//!
//! ## Logging
//!
//! Set `RUST_LOG=debug` for verbose output in `twindeck.log`.

mod app;
mod config;
mod terminal;

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use twindeck_core::audio::{CpalBackend, CpalMicrophone};
use twindeck_core::engine::Console;
use twindeck_core::sink::MicrophoneInput;
use twindeck_keys::CommandRouter;

use app::App;
use config::PlayerConfig;
use terminal::Terminal;

fn init_logging(log_path: &Path) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();

    let file = log_path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| File::create(log_path));
    match file {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            builder.init();
        }
        Err(e) => {
            builder.init();
            log::warn!("Could not open log file {:?}: {}, logging to stderr", log_path, e);
        }
    }
}

fn main() -> Result<()> {
    init_logging(&config::default_log_path());
    log::info!("twindeck starting up");

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                          Twindeck                             ║");
    println!("║                 two-deck keyboard DJ console                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let config_path = config::default_config_path();
    let mut player_config: PlayerConfig = config::load_config(&config_path);
    player_config.steps = player_config.steps.sanitized();

    // Overlapping triggers abort startup before any audio opens
    let router = CommandRouter::with_keymap(&player_config.steps, &player_config.keymap)
        .context("Invalid keymap in config")?;

    let backend =
        CpalBackend::start(&player_config.audio).context("Could not open the audio output")?;
    println!(
        "Audio output running at {} Hz ({:.1} ms buffer)",
        backend.sample_rate(),
        backend.latency_ms()
    );

    let microphone: Option<Box<dyn MicrophoneInput>> = if player_config.audio.microphone {
        Some(Box::new(CpalMicrophone::new(
            player_config.audio.input_device.clone(),
        )))
    } else {
        log::info!("Microphone capture disabled in config");
        None
    };

    let console = Console::new(Box::new(backend), microphone);
    let mut app = App::new(console, router);
    println!(
        "{} hotkey commands loaded, microphone {}",
        app.router().commands().len(),
        if app.console().microphone_running() { "capturing" } else { "off" }
    );

    let result = Terminal::enter().and_then(|mut terminal| app.run(&mut terminal));
    app.shutdown();

    if let Err(e) = config::save_config(&player_config, &config_path) {
        log::warn!("Failed to save config: {:#}", e);
    }

    log::info!("twindeck stopped");
    result
}
