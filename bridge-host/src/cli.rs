//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use switch_core::DEFAULT_CONFIG_FILE;
use switch_proto::Stick;

/// Stream keyboard and gamepad input to a Switch over a serial bridge.
#[derive(Debug, Parser)]
#[command(name = "switch-bridge", version, about)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Serial port, overriding the configuration file
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Baud rate, overriding the configuration file
    #[arg(short, long, global = true)]
    pub baud: Option<u32>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Capture input and stream it until Ctrl-C (the default)
    Run,
    /// Measure stick center and travel and store it in the configuration file
    Calibrate {
        #[arg(value_enum, default_value_t = StickChoice::Both)]
        stick: StickChoice,
    },
    /// Send one command such as `A+B`, `UL` or `LX:255`, then release
    Send {
        command: String,
        /// How long to hold the state before releasing
        #[arg(long, default_value_t = 100)]
        hold_ms: u64,
    },
    /// Print the physical index of the next controller button pressed
    DetectButton {
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
    },
    /// Write a configuration file with the default settings
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StickChoice {
    Left,
    Right,
    Both,
}

impl StickChoice {
    pub fn sticks(self) -> &'static [Stick] {
        match self {
            Self::Left => &[Stick::Left],
            Self::Right => &[Stick::Right],
            Self::Both => &[Stick::Left, Stick::Right],
        }
    }
}

impl Cli {
    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_run() {
        let cli = Cli::try_parse_from(["switch-bridge"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(cli.port, None);
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn test_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from(["switch-bridge", "run", "--port", "COM5", "-b", "9600", "-vv"]).unwrap();
        assert_eq!(cli.command, Some(Command::Run));
        assert_eq!(cli.port.as_deref(), Some("COM5"));
        assert_eq!(cli.baud, Some(9600));
        assert_eq!(cli.log_level(), "trace");
    }

    #[test]
    fn test_calibrate_stick_choice() {
        let cli = Cli::try_parse_from(["switch-bridge", "calibrate"]).unwrap();
        assert_eq!(cli.command, Some(Command::Calibrate { stick: StickChoice::Both }));
        let cli = Cli::try_parse_from(["switch-bridge", "calibrate", "right"]).unwrap();
        assert_eq!(cli.command, Some(Command::Calibrate { stick: StickChoice::Right }));
        assert_eq!(StickChoice::Both.sticks(), [Stick::Left, Stick::Right]);
    }

    #[test]
    fn test_send_takes_plus_commands() {
        let cli = Cli::try_parse_from(["switch-bridge", "send", "A+B", "--hold-ms", "250"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Send {
                command: "A+B".into(),
                hold_ms: 250
            })
        );
    }

    #[test]
    fn test_rejects_unknown_stick() {
        assert!(Cli::try_parse_from(["switch-bridge", "calibrate", "middle"]).is_err());
    }
}
