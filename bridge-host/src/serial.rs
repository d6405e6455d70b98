//! Serial link to the bridge device.

use std::thread;
use std::time::Duration;

use log::info;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use switch_core::{SerialConfig, TransportError, WriteTransport};

/// Time the device gets to settle after the port is opened.
const SETTLE_TIME: Duration = Duration::from_secs(2);

const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// Packet transport over an open serial port.
pub type SerialTransport = WriteTransport<Box<dyn SerialPort>>;

/// Open the configured port as 8N1 without flow control.
pub fn open(config: &SerialConfig) -> Result<SerialTransport, TransportError> {
    let port = serialport::new(&config.port, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(WRITE_TIMEOUT)
        .open()
        .map_err(|e| TransportError::Open {
            port: config.port.clone(),
            reason: e.to_string(),
        })?;

    info!("Opened {} at {} baud", config.port, config.baud_rate);
    thread::sleep(SETTLE_TIME);
    Ok(WriteTransport::new(port))
}

/// Troubleshooting hints appended to an open failure.
pub fn open_hints(port: &str) -> String {
    let mut hints = vec![
        format!("check that the bridge device is plugged in and enumerated as {port}"),
        "pass the right port with --port or set serial.port in the configuration file".to_owned(),
        "make sure no other program (serial monitor, flasher) holds the port".to_owned(),
    ];
    if cfg!(target_os = "linux") {
        hints.push("add your user to the `dialout` group (or `uucp`) for serial access".to_owned());
    }
    if let Ok(ports) = serialport::available_ports() {
        if !ports.is_empty() {
            let names: Vec<_> = ports.into_iter().map(|p| p.port_name).collect();
            hints.push(format!("available ports: {}", names.join(", ")));
        }
    }
    hints
        .iter()
        .map(|hint| format!("  - {hint}"))
        .collect::<Vec<_>>()
        .join("\n")
}
