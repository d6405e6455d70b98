//! Host side of the Switch controller bridge.
//!
//! Captures keyboard and gamepad input, encodes it into 10-byte packets
//! and streams them to the bridge device over a serial port.

mod backend;
mod cli;
mod commands;
mod serial;

use anyhow::Result;
use clap::Parser;
use log::debug;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp_millis()
        .init();
    debug!("{cli:?}");

    match cli.command.clone().unwrap_or(Command::Run) {
        Command::Run => commands::run(&cli),
        Command::Calibrate { stick } => commands::calibrate(&cli, stick),
        Command::Send { command, hold_ms } => commands::send(&cli, &command, hold_ms),
        Command::DetectButton { timeout_ms } => commands::detect(&cli, timeout_ms),
        Command::InitConfig { force } => commands::init_config(&cli, force),
    }
}
