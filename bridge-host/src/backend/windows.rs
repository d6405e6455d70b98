//! Windows capture: `GetAsyncKeyState` keyboard and XInput gamepads.

use std::mem;
use std::time::{Duration, Instant};

use log::{info, warn};
use switch_core::{apply_key_bindings, apply_pad_reading, BridgeConfig, CaptureBackend, RawSample};
use switch_proto::ControllerState;
use windows_sys::Win32::Foundation::{ERROR_DEVICE_NOT_CONNECTED, ERROR_SUCCESS};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows_sys::Win32::UI::Input::XboxController::{XInputGetState, XINPUT_STATE};

use super::keymap::windows_vk_code;
use super::pad::{xinput_reading, XInputPad};

const XUSER_MAX_COUNT: u32 = 4;

/// How often empty XInput slots are probed while no pad is connected.
const RESCAN_INTERVAL: Duration = Duration::from_secs(1);

/// Keyboard state polled through `GetAsyncKeyState`.
#[derive(Debug, Default)]
pub struct AsyncKeyboard;

fn is_key_down(vk: u16) -> bool {
    // SAFETY: plain Win32 call without pointers.
    let state = unsafe { GetAsyncKeyState(i32::from(vk)) };
    (state as u16) & 0x8000 != 0
}

impl CaptureBackend for AsyncKeyboard {
    fn name(&self) -> &str {
        "keyboard"
    }

    fn poll(&mut self, state: &mut ControllerState, config: &BridgeConfig) {
        apply_key_bindings(state, &config.bindings, |name| {
            windows_vk_code(name).is_some_and(is_key_down)
        });
    }
}

/// First connected XInput controller.
#[derive(Debug)]
pub struct XInputPadBackend {
    slot: Option<u32>,
    last_scan: Option<Instant>,
    latest: Option<RawSample>,
}

impl XInputPadBackend {
    pub fn new() -> Self {
        let mut backend = Self {
            slot: None,
            last_scan: None,
            latest: None,
        };
        backend.scan();
        if backend.slot.is_none() {
            info!("No XInput controller connected yet");
        }
        backend
    }

    fn read(slot: u32) -> Result<XInputPad, u32> {
        // SAFETY: XINPUT_STATE is plain data; zeroed is a valid value.
        let mut raw: XINPUT_STATE = unsafe { mem::zeroed() };
        // SAFETY: `raw` is a valid, writable XINPUT_STATE.
        let result = unsafe { XInputGetState(slot, &mut raw) };
        if result != ERROR_SUCCESS {
            return Err(result);
        }
        let pad = raw.Gamepad;
        Ok(XInputPad {
            buttons: pad.wButtons,
            left_trigger: pad.bLeftTrigger,
            right_trigger: pad.bRightTrigger,
            thumb_lx: pad.sThumbLX,
            thumb_ly: pad.sThumbLY,
            thumb_rx: pad.sThumbRX,
            thumb_ry: pad.sThumbRY,
        })
    }

    fn scan(&mut self) {
        self.last_scan = Some(Instant::now());
        self.slot = (0..XUSER_MAX_COUNT).find(|&slot| Self::read(slot).is_ok());
        if let Some(slot) = self.slot {
            info!("Controller: XInput slot {slot}");
        }
    }

    fn current_pad(&mut self) -> Option<XInputPad> {
        if self.slot.is_none() {
            let due = self.last_scan.map_or(true, |at| at.elapsed() >= RESCAN_INTERVAL);
            if due {
                self.scan();
            }
        }
        let slot = self.slot?;
        match Self::read(slot) {
            Ok(pad) => Some(pad),
            Err(code) => {
                if code == ERROR_DEVICE_NOT_CONNECTED {
                    warn!("XInput controller in slot {slot} disconnected");
                } else {
                    warn!("XInputGetState({slot}) failed with {code}");
                }
                self.slot = None;
                None
            }
        }
    }
}

impl CaptureBackend for XInputPadBackend {
    fn name(&self) -> &str {
        "xinput"
    }

    fn poll(&mut self, state: &mut ControllerState, config: &BridgeConfig) {
        self.latest = self
            .current_pad()
            .map(|pad| apply_pad_reading(state, &xinput_reading(&pad), config));
    }

    fn latest_raw_sample(&self) -> Option<RawSample> {
        self.latest
    }
}
