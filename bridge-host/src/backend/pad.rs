//! Built-in gamepad layouts for the Linux joystick and XInput APIs.

use switch_core::{PadReading, RawStick};
use switch_proto::{Buttons, DirectionFlags};

#[cfg(any(target_os = "linux", test))]
/// Linux joystick D-pad axis threshold.
pub const JS_DPAD_THRESHOLD: i16 = 16384;

#[cfg(any(target_os = "linux", test))]
/// Number of axes tracked from a Linux joystick.
pub const JS_AXES: usize = 8;

#[cfg(any(target_os = "linux", test))]
/// Switch button for a Linux joystick button number.
pub fn js_default_button(number: u8) -> Buttons {
    match number {
        0 => Buttons::B,
        1 => Buttons::A,
        2 => Buttons::Y,
        3 => Buttons::X,
        4 => Buttons::L,
        5 => Buttons::R,
        6 => Buttons::MINUS,
        7 => Buttons::PLUS,
        9 => Buttons::LSTICK,
        10 => Buttons::RSTICK,
        _ => Buttons::NONE,
    }
}

#[cfg(any(target_os = "linux", test))]
/// Reading for a Linux joystick's held buttons and axis values.
///
/// Axes 0/1 are the left stick, 2/3 the right stick and 6/7 the D-pad.
/// The joystick API reports "up" as negative Y.
pub fn js_reading(buttons: u64, axes: &[i16; JS_AXES]) -> PadReading {
    let mapped = (0..64u8)
        .filter(|&n| buttons & (1u64 << n) != 0)
        .fold(Buttons::NONE, |acc, n| acc | js_default_button(n));

    let dpad = DirectionFlags {
        up: axes[7] < -JS_DPAD_THRESHOLD,
        down: axes[7] > JS_DPAD_THRESHOLD,
        left: axes[6] < -JS_DPAD_THRESHOLD,
        right: axes[6] > JS_DPAD_THRESHOLD,
    };

    PadReading {
        physical_buttons: buttons,
        buttons: mapped,
        dpad,
        left: RawStick::from_y_down(axes[0], axes[1]),
        right: RawStick::from_y_down(axes[2], axes[3]),
    }
}

#[cfg(any(windows, test))]
/// XInput `wButtons` bits.
pub mod xinput {
    pub const DPAD_UP: u16 = 0x0001;
    pub const DPAD_DOWN: u16 = 0x0002;
    pub const DPAD_LEFT: u16 = 0x0004;
    pub const DPAD_RIGHT: u16 = 0x0008;
    pub const START: u16 = 0x0010;
    pub const BACK: u16 = 0x0020;
    pub const LEFT_THUMB: u16 = 0x0040;
    pub const RIGHT_THUMB: u16 = 0x0080;
    pub const LEFT_SHOULDER: u16 = 0x0100;
    pub const RIGHT_SHOULDER: u16 = 0x0200;
    pub const A: u16 = 0x1000;
    pub const B: u16 = 0x2000;
    pub const X: u16 = 0x4000;
    pub const Y: u16 = 0x8000;

    /// Physical index reported for a pulled left trigger.
    pub const LEFT_TRIGGER_INDEX: u8 = 16;
    pub const RIGHT_TRIGGER_INDEX: u8 = 17;

    /// Trigger value above which the trigger counts as pressed.
    pub const TRIGGER_THRESHOLD: u8 = 128;
}

#[cfg(any(windows, test))]
/// Raw XInput gamepad state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XInputPad {
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

#[cfg(any(windows, test))]
/// Reading for an XInput pad.
///
/// Physical indices are the `wButtons` bit positions, with the triggers
/// as 16 and 17. Face buttons follow their position, so Xbox A (bottom)
/// becomes Switch B.
pub fn xinput_reading(pad: &XInputPad) -> PadReading {
    const MAP: [(u16, Buttons); 10] = [
        (xinput::A, Buttons::B),
        (xinput::B, Buttons::A),
        (xinput::X, Buttons::Y),
        (xinput::Y, Buttons::X),
        (xinput::LEFT_SHOULDER, Buttons::L),
        (xinput::RIGHT_SHOULDER, Buttons::R),
        (xinput::BACK, Buttons::MINUS),
        (xinput::START, Buttons::PLUS),
        (xinput::LEFT_THUMB, Buttons::LSTICK),
        (xinput::RIGHT_THUMB, Buttons::RSTICK),
    ];

    let left_pulled = pad.left_trigger > xinput::TRIGGER_THRESHOLD;
    let right_pulled = pad.right_trigger > xinput::TRIGGER_THRESHOLD;

    let mut mapped = MAP
        .iter()
        .filter(|(bit, _)| pad.buttons & bit != 0)
        .fold(Buttons::NONE, |acc, &(_, button)| acc | button);
    mapped.set(Buttons::ZL, left_pulled);
    mapped.set(Buttons::ZR, right_pulled);

    let mut physical = u64::from(pad.buttons);
    if left_pulled {
        physical |= 1 << xinput::LEFT_TRIGGER_INDEX;
    }
    if right_pulled {
        physical |= 1 << xinput::RIGHT_TRIGGER_INDEX;
    }

    PadReading {
        physical_buttons: physical,
        buttons: mapped,
        dpad: DirectionFlags {
            up: pad.buttons & xinput::DPAD_UP != 0,
            down: pad.buttons & xinput::DPAD_DOWN != 0,
            left: pad.buttons & xinput::DPAD_LEFT != 0,
            right: pad.buttons & xinput::DPAD_RIGHT != 0,
        },
        left: RawStick::new(pad.thumb_lx, pad.thumb_ly),
        right: RawStick::new(pad.thumb_rx, pad.thumb_ry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switch_core::{apply_pad_reading, BridgeConfig};
    use switch_proto::{ControllerState, Hat, StickPosition};

    #[test]
    fn test_js_buttons_and_dpad() {
        let mut axes = [0i16; JS_AXES];
        axes[6] = -32767;
        axes[7] = 32767;
        let reading = js_reading(0b110_0000_0011, &axes);

        assert_eq!(reading.buttons, Buttons::B | Buttons::A | Buttons::LSTICK | Buttons::RSTICK);
        assert_eq!(reading.dpad.hat(), Hat::DownLeft);
        assert_eq!(reading.physical_buttons, 0b110_0000_0011);
    }

    #[test]
    fn test_js_dpad_threshold_is_exclusive() {
        let mut axes = [0i16; JS_AXES];
        axes[6] = JS_DPAD_THRESHOLD;
        axes[7] = -JS_DPAD_THRESHOLD;
        assert_eq!(js_reading(0, &axes).dpad, DirectionFlags::NONE);
    }

    #[test]
    fn test_js_up_is_toward_zero() {
        let mut axes = [0i16; JS_AXES];
        axes[1] = -32767;
        axes[2] = 32767;
        let mut state = ControllerState::neutral();
        apply_pad_reading(&mut state, &js_reading(0, &axes), &BridgeConfig::default());
        assert_eq!(state.left, StickPosition::new(128, 0));
        assert_eq!(state.right, StickPosition::new(255, 128));
    }

    #[test]
    fn test_xinput_face_buttons_and_triggers() {
        let pad = XInputPad {
            buttons: xinput::A | xinput::Y | xinput::START | xinput::DPAD_UP,
            left_trigger: 200,
            right_trigger: 128,
            ..XInputPad::default()
        };
        let reading = xinput_reading(&pad);

        assert_eq!(reading.buttons, Buttons::B | Buttons::X | Buttons::PLUS | Buttons::ZL);
        assert_eq!(reading.dpad.hat(), Hat::Up);
        assert_eq!(
            reading.physical_buttons,
            u64::from(pad.buttons) | (1 << xinput::LEFT_TRIGGER_INDEX)
        );
    }

    #[test]
    fn test_xinput_up_is_toward_zero() {
        let pad = XInputPad {
            thumb_ly: 32767,
            thumb_rx: -32768,
            ..XInputPad::default()
        };
        let mut state = ControllerState::neutral();
        apply_pad_reading(&mut state, &xinput_reading(&pad), &BridgeConfig::default());
        assert_eq!(state.left, StickPosition::new(128, 0));
        assert_eq!(state.right, StickPosition::new(0, 128));
    }

    #[test]
    fn test_xinput_custom_trigger_remap() {
        let mut config = BridgeConfig::default();
        config
            .bindings
            .add_controller_binding(xinput::RIGHT_TRIGGER_INDEX, Buttons::CAPTURE)
            .unwrap();
        let pad = XInputPad {
            buttons: xinput::A,
            right_trigger: 255,
            ..XInputPad::default()
        };
        let mut state = ControllerState::neutral();
        apply_pad_reading(&mut state, &xinput_reading(&pad), &config);
        assert_eq!(state.buttons, Buttons::CAPTURE);
    }
}
