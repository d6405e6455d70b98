//! Subcommand implementations.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::{info, warn};
use switch_core::{
    detect_button, Bridge, BridgeConfig, Calibrator, CaptureBackend, Clock, SystemClock,
};
use switch_proto::{parse_command, Stick, REPORT_INTERVAL_MS};

use crate::backend;
use crate::cli::{Cli, StickChoice};
use crate::serial::{self, SerialTransport};

/// Configuration file plus command-line overrides. A defective file
/// falls back to defaults.
fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    let mut config = BridgeConfig::load_or_default(&cli.config);
    config.apply_serial_overrides(cli.port.clone(), cli.baud);
    config.validate()?;
    Ok(config)
}

/// Like [`load_config`], but refuses a defective file. Used by commands
/// that write the file back.
fn load_config_strict(cli: &Cli) -> Result<BridgeConfig> {
    let mut config = if cli.config.exists() {
        BridgeConfig::load(&cli.config)
            .with_context(|| format!("cannot update {}", cli.config.display()))?
    } else {
        BridgeConfig::default()
    };
    config.apply_serial_overrides(cli.port.clone(), cli.baud);
    config.validate()?;
    Ok(config)
}

fn open_link(config: &BridgeConfig) -> Result<SerialTransport> {
    serial::open(&config.serial).with_context(|| {
        format!(
            "cannot open the serial link to the bridge device\n{}",
            serial::open_hints(&config.serial.port)
        )
    })
}

pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let transport = open_link(&config)?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || flag.store(false, Ordering::Relaxed))
        .context("failed to install the Ctrl-C handler")?;

    let backends = backend::create_backends(&config);
    let mut bridge = Bridge::new(transport, config);
    for source in backends {
        bridge.add_backend(source);
    }

    info!("Streaming input, press Ctrl-C to stop");
    let stats = bridge.run(&running);
    if stats.write_failures > 0 {
        warn!("{} packet writes failed during the session", stats.write_failures);
    }
    Ok(())
}

fn wait_for_enter() -> Result<()> {
    io::stdout().flush()?;
    io::stdin().lock().read_line(&mut String::new())?;
    Ok(())
}

/// Measure each stick in turn into `config`, calling `before_center`
/// ahead of each center phase.
///
/// A stick whose measurement fails is marked uncalibrated and the error
/// returned; sticks finished before it keep their new records.
fn calibrate_sticks<B, C>(
    config: &mut BridgeConfig,
    pad: &mut B,
    calibrator: &Calibrator,
    clock: &mut C,
    sticks: &[Stick],
    mut before_center: impl FnMut(Stick) -> Result<()>,
) -> Result<()>
where
    B: CaptureBackend + ?Sized,
    C: Clock,
{
    for &stick in sticks {
        before_center(stick)?;
        let center = match calibrator.measure_center(pad, config, clock, stick) {
            Ok(center) => center,
            Err(e) => {
                config.calibration.stick_mut(stick).calibrated = false;
                return Err(e.into());
            }
        };

        println!(
            "Now move the {stick:?} stick around its full range for {} seconds...",
            calibrator.plan().range_duration().as_secs()
        );
        let result = calibrator.measure_range(pad, config, clock, stick, center);
        println!(
            "{stick:?} stick: x {}..{}..{}, y {}..{}..{}",
            result.x.min, result.x.center, result.x.max, result.y.min, result.y.center, result.y.max
        );
        *config.calibration.stick_mut(stick) = result;
    }
    Ok(())
}

pub fn calibrate(cli: &Cli, choice: StickChoice) -> Result<()> {
    let mut config = load_config_strict(cli)?;
    let mut pad = backend::open_controller().context("no controller available for calibration")?;

    let outcome = calibrate_sticks(
        &mut config,
        pad.as_mut(),
        &Calibrator::default(),
        &mut SystemClock,
        choice.sticks(),
        |stick| {
            print!("\n{stick:?} stick: let it rest in the center, then press Enter. ");
            wait_for_enter()
        },
    );

    config.save(&cli.config)?;
    match outcome {
        Ok(()) => {
            println!("Calibration saved to {}", cli.config.display());
            Ok(())
        }
        Err(e) => Err(e.context(format!(
            "calibration aborted; completed sticks were saved to {}",
            cli.config.display()
        ))),
    }
}

pub fn send(cli: &Cli, command: &str, hold_ms: u64) -> Result<()> {
    let state = parse_command(command).with_context(|| format!("cannot parse `{command}`"))?;
    let config = load_config(cli)?;
    let transport = open_link(&config)?;
    let mut bridge = Bridge::new(transport, config);

    let hold = Duration::from_millis(hold_ms);
    let start = Instant::now();
    loop {
        bridge.send_state(&state)?;
        if start.elapsed() >= hold {
            break;
        }
        bridge
            .clock_mut()
            .sleep(Duration::from_millis(REPORT_INTERVAL_MS).min(hold));
    }
    bridge.shutdown()?;
    info!("Sent `{command}` for {hold_ms} ms");
    Ok(())
}

pub fn detect(cli: &Cli, timeout_ms: u64) -> Result<()> {
    let config = load_config(cli)?;
    let mut pad = backend::open_controller().context("no controller available")?;

    println!("Press one button on the controller...");
    let timeout = Duration::from_millis(timeout_ms);
    let Some(index) = detect_button(pad.as_mut(), &config, &mut SystemClock, timeout) else {
        bail!("no button press detected within {timeout_ms} ms");
    };

    println!("Physical button {index}. To remap it, add to {}:", cli.config.display());
    println!();
    println!("[controller_bindings]");
    println!("\"{index}\" = \"A\"");
    Ok(())
}

pub fn init_config(cli: &Cli, force: bool) -> Result<()> {
    if cli.config.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            cli.config.display()
        );
    }
    let mut config = BridgeConfig::default();
    config.apply_serial_overrides(cli.port.clone(), cli.baud);
    config.save(&cli.config)?;
    println!("Wrote {}", cli.config.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use switch_core::{CalibrationError, CalibrationPlan, RawSample, StickCalibration};
    use switch_proto::{ControllerState, StickPosition};

    fn cli_for(path: &std::path::Path, extra: &[&str]) -> Cli {
        let mut args = vec!["switch-bridge", "--config", path.to_str().unwrap()];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    /// Pad reporting a fixed stick position for a number of polls, then nothing.
    struct FadingPad {
        remaining: usize,
        latest: Option<RawSample>,
    }

    impl CaptureBackend for FadingPad {
        fn name(&self) -> &str {
            "fading"
        }

        fn poll(&mut self, _state: &mut ControllerState, _config: &BridgeConfig) {
            self.latest = (self.remaining > 0).then(|| RawSample {
                left: StickPosition::new(120, 130),
                right: StickPosition::new(120, 130),
                physical_buttons: 0,
            });
            self.remaining = self.remaining.saturating_sub(1);
        }

        fn latest_raw_sample(&self) -> Option<RawSample> {
            self.latest
        }
    }

    struct InstantClock(Instant);

    impl Clock for InstantClock {
        fn now(&self) -> Instant {
            self.0
        }

        fn sleep(&mut self, duration: Duration) {
            self.0 += duration;
        }
    }

    #[test]
    fn test_failed_stick_is_uncalibrated_and_finished_one_kept() {
        let plan = CalibrationPlan {
            center_samples: 2,
            range_samples: 3,
            ..CalibrationPlan::default()
        };
        let mut config = BridgeConfig::default();
        config.calibration.right = StickCalibration {
            calibrated: true,
            ..StickCalibration::default()
        };
        let mut pad = FadingPad {
            remaining: 5,
            latest: None,
        };
        let mut prompted = Vec::new();

        let result = calibrate_sticks(
            &mut config,
            &mut pad,
            &Calibrator::new(plan),
            &mut InstantClock(Instant::now()),
            StickChoice::Both.sticks(),
            |stick| {
                prompted.push(stick);
                Ok(())
            },
        );

        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<CalibrationError>(),
            Some(&CalibrationError::NoController(Stick::Right))
        );
        assert_eq!(prompted, [Stick::Left, Stick::Right]);
        assert!(config.calibration.left.calibrated);
        assert_eq!(config.calibration.left.x.center, 120);
        assert!(!config.calibration.right.calibrated);
    }

    #[test]
    fn test_init_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");

        init_config(&cli_for(&path, &["--port", "/dev/ttyUSB3"]), false).unwrap();
        let written = BridgeConfig::load(&path).unwrap();
        assert_eq!(written.serial.port, "/dev/ttyUSB3");

        assert!(init_config(&cli_for(&path, &[]), false).is_err());
        init_config(&cli_for(&path, &[]), true).unwrap();
        let rewritten = BridgeConfig::load(&path).unwrap();
        let defaults = BridgeConfig::default();
        assert_eq!(rewritten.serial, defaults.serial);
        assert_eq!(rewritten.general, defaults.general);
        assert_eq!(rewritten.bindings.len(), defaults.bindings.len());
    }

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "[serial]\nport = \"/dev/ttyS9\"\nbaud_rate = 57600\n").unwrap();

        let config = load_config(&cli_for(&path, &["--baud", "9600"])).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyS9");
        assert_eq!(config.serial.baud_rate, 9600);

        assert!(load_config(&cli_for(&path, &["--baud", "0"])).is_err());
    }

    #[test]
    fn test_strict_load_rejects_defective_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "[general]\nupdate_rate_hz = 0\n").unwrap();

        assert!(load_config_strict(&cli_for(&path, &[])).is_err());
        assert_eq!(load_config(&cli_for(&path, &[])).unwrap(), BridgeConfig::default());
    }
}
