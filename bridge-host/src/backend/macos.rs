//! macOS capture: CoreGraphics key state and gilrs gamepads.

use gilrs::{Axis, Button, Gilrs};
use log::{info, warn};
use switch_core::{
    apply_key_bindings, apply_pad_reading, raw_from_unit, BridgeConfig, CaptureBackend, PadReading,
    RawSample, RawStick,
};
use switch_proto::{Buttons, ControllerState, DirectionFlags};

use super::keymap::macos_key_code;

/// `kCGEventSourceStateCombinedSessionState`
const COMBINED_SESSION_STATE: i32 = 0;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn CGEventSourceKeyState(state_id: i32, key: u16) -> bool;
}

/// Keyboard state polled through `CGEventSourceKeyState`.
///
/// Needs the Input Monitoring permission for the terminal running the bridge.
#[derive(Debug, Default)]
pub struct CoreGraphicsKeyboard;

impl CaptureBackend for CoreGraphicsKeyboard {
    fn name(&self) -> &str {
        "keyboard"
    }

    fn poll(&mut self, state: &mut ControllerState, config: &BridgeConfig) {
        apply_key_bindings(state, &config.bindings, |name| {
            macos_key_code(name).is_some_and(|code| {
                // SAFETY: plain CoreGraphics query without pointers.
                unsafe { CGEventSourceKeyState(COMBINED_SESSION_STATE, code) }
            })
        });
    }
}

/// Physical button order; the position is the index used by remaps.
const PHYSICAL_BUTTONS: [(Button, Buttons); 15] = [
    (Button::South, Buttons::B),
    (Button::East, Buttons::A),
    (Button::West, Buttons::Y),
    (Button::North, Buttons::X),
    (Button::LeftTrigger, Buttons::L),
    (Button::RightTrigger, Buttons::R),
    (Button::LeftTrigger2, Buttons::ZL),
    (Button::RightTrigger2, Buttons::ZR),
    (Button::Select, Buttons::MINUS),
    (Button::Start, Buttons::PLUS),
    (Button::Mode, Buttons::HOME),
    (Button::LeftThumb, Buttons::LSTICK),
    (Button::RightThumb, Buttons::RSTICK),
    (Button::C, Buttons::NONE),
    (Button::Z, Buttons::NONE),
];

/// First connected gamepad known to gilrs.
pub struct GilrsPad {
    gilrs: Gilrs,
    latest: Option<RawSample>,
}

impl GilrsPad {
    pub fn new() -> Result<Self, gilrs::Error> {
        let gilrs = Gilrs::new()?;
        match gilrs.gamepads().next() {
            Some((_, pad)) => info!("Controller: {}", pad.name()),
            None => info!("No gamepad connected yet"),
        }
        Ok(Self {
            gilrs,
            latest: None,
        })
    }

    fn read(&mut self) -> Option<PadReading> {
        while let Some(event) = self.gilrs.next_event() {
            if let gilrs::EventType::Disconnected = event.event {
                warn!("Gamepad {} disconnected", event.id);
            }
        }
        let (_, pad) = self.gilrs.gamepads().find(|(_, pad)| pad.is_connected())?;

        let mut reading = PadReading::default();
        for (index, &(button, mapped)) in PHYSICAL_BUTTONS.iter().enumerate() {
            if pad.is_pressed(button) {
                reading.physical_buttons |= 1 << index;
                reading.buttons |= mapped;
            }
        }
        reading.dpad = DirectionFlags {
            up: pad.is_pressed(Button::DPadUp),
            down: pad.is_pressed(Button::DPadDown),
            left: pad.is_pressed(Button::DPadLeft),
            right: pad.is_pressed(Button::DPadRight),
        };
        // gilrs reports up as positive Y.
        reading.left = RawStick::new(
            raw_from_unit(pad.value(Axis::LeftStickX)),
            raw_from_unit(pad.value(Axis::LeftStickY)),
        );
        reading.right = RawStick::new(
            raw_from_unit(pad.value(Axis::RightStickX)),
            raw_from_unit(pad.value(Axis::RightStickY)),
        );
        Some(reading)
    }
}

impl CaptureBackend for GilrsPad {
    fn name(&self) -> &str {
        "gilrs"
    }

    fn poll(&mut self, state: &mut ControllerState, config: &BridgeConfig) {
        self.latest = self
            .read()
            .map(|reading| apply_pad_reading(state, &reading, config));
    }

    fn latest_raw_sample(&self) -> Option<RawSample> {
        self.latest
    }
}
