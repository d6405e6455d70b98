//! Capture backend contract and the mapping shared by every backend.

use switch_proto::{Buttons, ControllerState, DirectionFlags, StickPosition};

use crate::axis::{deadzone_threshold, RawStick};
use crate::config::BridgeConfig;

/// A source of physical input: a keyboard, a gamepad, or both.
///
/// `poll` is called once per cycle with a state the caller has already
/// reset. Implementations only ever *set* what is currently held and
/// never clear anything, since several backends poll into the same
/// state. Polling must not block and never fails; a backend that lost
/// its device simply contributes nothing.
pub trait CaptureBackend {
    /// Short human-readable name used in log lines.
    fn name(&self) -> &str;

    fn poll(&mut self, state: &mut ControllerState, config: &BridgeConfig);

    /// The most recent uncalibrated reading taken by `poll`, if this
    /// backend reads a physical gamepad and one is attached.
    fn latest_raw_sample(&self) -> Option<RawSample> {
        None
    }
}

impl<B: CaptureBackend + ?Sized> CaptureBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn poll(&mut self, state: &mut ControllerState, config: &BridgeConfig) {
        (**self).poll(state, config);
    }

    fn latest_raw_sample(&self) -> Option<RawSample> {
        (**self).latest_raw_sample()
    }
}

/// Normalized but uncalibrated stick values and the physical button set.
///
/// No deadzone is applied. This is what calibration and button
/// detection consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    pub left: StickPosition,
    pub right: StickPosition,
    /// Bit `n` set when physical button `n` is held.
    pub physical_buttons: u64,
}

/// Backend-neutral snapshot of a physical gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PadReading {
    /// Bit `n` set when physical button `n` is held.
    pub physical_buttons: u64,
    /// Buttons according to the backend's built-in mapping.
    pub buttons: Buttons,
    pub dpad: DirectionFlags,
    pub left: RawStick,
    pub right: RawStick,
}

/// Merge a gamepad reading into `state`.
///
/// Custom controller remaps replace the built-in button mapping when any
/// are configured. Sticks go through deadzone, normalization and the
/// configured calibration; a stick resting in its deadzone leaves the
/// state untouched.
pub fn apply_pad_reading(
    state: &mut ControllerState,
    reading: &PadReading,
    config: &BridgeConfig,
) -> RawSample {
    state.buttons |= config
        .bindings
        .resolve_buttons(reading.physical_buttons, reading.buttons);

    state.dpad.up |= reading.dpad.up;
    state.dpad.down |= reading.dpad.down;
    state.dpad.left |= reading.dpad.left;
    state.dpad.right |= reading.dpad.right;

    let threshold = deadzone_threshold(config.general.controller_deadzone);
    let left = reading.left.resolve(threshold, &config.calibration.left);
    let right = reading.right.resolve(threshold, &config.calibration.right);
    if !left.is_centered() {
        state.left = left;
    }
    if !right.is_centered() {
        state.right = right;
    }

    RawSample {
        left: reading.left.normalized(),
        right: reading.right.normalized(),
        physical_buttons: reading.physical_buttons,
    }
}
