//! Keysheet - printable pages from a keymap SVG.

mod cli;
mod config;
mod core;
mod logger;
mod render;
mod svg;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::KeysheetConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = KeysheetConfig::load(&cli)?;
    if let Some(path) = &config.config_path {
        debug!("config"; "using {}", path.display());
    }

    match &cli.command {
        Commands::Pdf { .. } => cli::pdf::convert_keymap(&config),
        Commands::Split { .. } => cli::split::split_keymap(&config),
        Commands::Watch => watch::watch_keymap(&config),
    }
}
