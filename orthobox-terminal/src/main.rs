/// Orthobox Terminal - orthographic rendering sandbox
///
/// Usage: orthobox-terminal [config-file]
///
/// Controls:
///   - 1-7 / Tab: Select scene (lines, quad strip, hexagon, cube, bitmap, pixmap, sketch)
///   - Left click: Add a sketch point, Right click: Clear
///   - Other keys: Draw the character at the pointer
///   - Insert: Copy the bottom-left quarter to the center
///   - Q/ESC: Quit

use anyhow::Context;
use orthobox_core::Config;
use orthobox_terminal::logging::{init_logging, LoggingConfig};
use orthobox_terminal::TerminalApp;
use std::env;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = match args.get(1) {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        file: Some(config.log_file.clone().into()),
    });
    log::info!("starting with scene {}", config.scene);

    let mut app = TerminalApp::new(config).context("failed to query the terminal")?;
    app.run().context("terminal session failed")?;

    log::info!("exiting");
    Ok(())
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    Config::load(path)
        .with_context(|| format!("failed to load config {path}"))
}
