//! Host-side building blocks for the Switch controller bridge.
//!
//! This crate holds everything between the operating system's input APIs
//! and the serial link, without any platform-specific code itself.
//!
//! # Overview
//!
//! - [`capture`]: Capture backend contract ([`CaptureBackend`]) and the shared
//!   gamepad mapping ([`apply_pad_reading`])
//! - [`binding`]: Key and controller-button bindings ([`BindingConfig`])
//! - [`axis`]: Raw axis normalization and deadzone ([`resolve_axis`])
//! - [`calibration`]: Two-phase stick calibration ([`Calibrator`], [`calibrate`])
//! - [`config`]: TOML configuration ([`BridgeConfig`])
//! - [`transport`]: Packet sink trait ([`Transport`])
//! - [`bridge`]: The polling loop ([`Bridge`])
//! - [`detect`]: Physical button detection ([`detect_button`])
//!
//! # Example
//!
//! ```rust
//! use switch_core::{Bridge, BridgeConfig, WriteTransport};
//!
//! let mut bridge = Bridge::new(WriteTransport::new(Vec::new()), BridgeConfig::default());
//! let cycle = bridge.run_cycle();
//! assert!(cycle.result.is_ok());
//! assert_eq!(cycle.packet[..2], [0xAA, 0x55]);
//! ```

pub mod axis;
pub mod binding;
pub mod bridge;
pub mod calibration;
pub mod capture;
pub mod clock;
pub mod config;
pub mod detect;
pub mod transport;

#[cfg(test)]
mod testing;

pub use axis::{deadzone_threshold, in_deadzone, normalize, raw_from_unit, resolve_axis, AxisKind, RawStick};
pub use binding::{
    apply_key_bindings, is_known_key, Binding, BindingConfig, BindingError, ControllerBinding,
    KEY_NAMES, MAX_PHYSICAL_BUTTON,
};
pub use bridge::{Bridge, BridgeStats, Cycle, WRITE_BACKOFF};
pub use calibration::{
    calibrate, Axis, AxisCalibration, CalibrationError, CalibrationPlan, Calibrator, StickCalibration,
    StickCenter,
};
pub use capture::{apply_pad_reading, CaptureBackend, PadReading, RawSample};
pub use clock::{Clock, SystemClock};
pub use config::{
    BridgeConfig, CalibrationConfig, ConfigError, GeneralConfig, SerialConfig, DEFAULT_CONFIG_FILE,
};
pub use detect::{detect_button, DETECT_POLL_INTERVAL};
pub use transport::{Transport, TransportError, WriteTransport};
