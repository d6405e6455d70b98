//! Platform capture backends.
//!
//! Each platform provides a keyboard and a gamepad backend. A source
//! that fails to open is logged and left out; the bridge still runs
//! with whatever remains.

mod keymap;
#[cfg(any(target_os = "linux", windows, test))]
mod pad;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(windows)]
mod windows;

use log::warn;
use switch_core::{BridgeConfig, CaptureBackend};

/// Backends enabled by the configuration, keyboard first.
pub fn create_backends(config: &BridgeConfig) -> Vec<Box<dyn CaptureBackend>> {
    let mut backends = Vec::new();
    if config.general.enable_keyboard {
        backends.extend(open_keyboard());
    }
    if config.general.enable_controller {
        backends.extend(open_controller());
    }
    if backends.is_empty() {
        warn!("No input source available; only neutral packets will be sent");
    }
    backends
}

#[cfg(target_os = "linux")]
fn open_keyboard() -> Option<Box<dyn CaptureBackend>> {
    match linux::EvdevKeyboard::open() {
        Ok(keyboard) => Some(Box::new(keyboard)),
        Err(e) => {
            warn!("Keyboard input disabled: {e}");
            None
        }
    }
}

/// The gamepad backend alone, for calibration and button detection.
#[cfg(target_os = "linux")]
pub fn open_controller() -> Option<Box<dyn CaptureBackend>> {
    match linux::JoystickPad::open() {
        Ok(pad) => Some(Box::new(pad)),
        Err(e) => {
            warn!("Controller input disabled: {e}");
            None
        }
    }
}

#[cfg(windows)]
fn open_keyboard() -> Option<Box<dyn CaptureBackend>> {
    Some(Box::new(windows::AsyncKeyboard))
}

/// The gamepad backend alone, for calibration and button detection.
#[cfg(windows)]
pub fn open_controller() -> Option<Box<dyn CaptureBackend>> {
    Some(Box::new(windows::XInputPadBackend::new()))
}

#[cfg(target_os = "macos")]
fn open_keyboard() -> Option<Box<dyn CaptureBackend>> {
    Some(Box::new(macos::CoreGraphicsKeyboard))
}

/// The gamepad backend alone, for calibration and button detection.
#[cfg(target_os = "macos")]
pub fn open_controller() -> Option<Box<dyn CaptureBackend>> {
    match macos::GilrsPad::new() {
        Ok(pad) => Some(Box::new(pad)),
        Err(e) => {
            warn!("Controller input disabled: {e}");
            None
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
fn open_keyboard() -> Option<Box<dyn CaptureBackend>> {
    warn!("Keyboard capture is not supported on this platform");
    None
}

/// The gamepad backend alone, for calibration and button detection.
#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
pub fn open_controller() -> Option<Box<dyn CaptureBackend>> {
    warn!("Controller capture is not supported on this platform");
    None
}
