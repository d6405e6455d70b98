//! Wire packet encoding and the decoded report.
//!
//! ```text
//! byte 0   0xAA      sync
//! byte 1   0x55      sync
//! byte 2-3 buttons   little-endian
//! byte 4   hat       0-8
//! byte 5   lx
//! byte 6   ly
//! byte 7   rx
//! byte 8   ry
//! byte 9   reserved  always 0
//! ```

use crate::types::{Buttons, ControllerState, Hat, STICK_CENTER};

/// Two-byte synchronization header.
pub const HEADER: [u8; 2] = [0xAA, 0x55];

/// Total packet length including the header.
pub const PACKET_LEN: usize = 10;

/// Payload length following the header.
pub const PAYLOAD_LEN: usize = PACKET_LEN - HEADER.len();

/// Encode a controller snapshot into a wire packet.
///
/// # Example
///
/// ```
/// use switch_proto::{encode, ControllerState};
///
/// let packet = encode(&ControllerState::neutral());
/// assert_eq!(packet, [0xAA, 0x55, 0x00, 0x00, 0x08, 0x80, 0x80, 0x80, 0x80, 0x00]);
/// ```
#[must_use]
pub fn encode(state: &ControllerState) -> [u8; PACKET_LEN] {
    let payload = Report::from(state).to_payload();
    let mut packet = [0u8; PACKET_LEN];
    packet[..HEADER.len()].copy_from_slice(&HEADER);
    packet[HEADER.len()..].copy_from_slice(&payload);
    packet
}

/// Payload of one frame as seen by the receiving device.
///
/// The HAT byte is carried verbatim; the receiver does not validate it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    pub buttons: Buttons,
    pub hat: u8,
    pub lx: u8,
    pub ly: u8,
    pub rx: u8,
    pub ry: u8,
    /// Reserved byte, zero from a conforming sender.
    pub vendor: u8,
}

impl Report {
    /// No buttons, neutral HAT, sticks centered.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: Buttons::NONE,
            hat: Hat::Neutral.code(),
            lx: STICK_CENTER,
            ly: STICK_CENTER,
            rx: STICK_CENTER,
            ry: STICK_CENTER,
            vendor: 0,
        }
    }

    #[must_use]
    pub const fn from_payload(payload: &[u8; PAYLOAD_LEN]) -> Self {
        Self {
            buttons: Buttons(u16::from_le_bytes([payload[0], payload[1]])),
            hat: payload[2],
            lx: payload[3],
            ly: payload[4],
            rx: payload[5],
            ry: payload[6],
            vendor: payload[7],
        }
    }

    #[must_use]
    pub const fn to_payload(&self) -> [u8; PAYLOAD_LEN] {
        let buttons = self.buttons.raw().to_le_bytes();
        [
            buttons[0],
            buttons[1],
            self.hat,
            self.lx,
            self.ly,
            self.rx,
            self.ry,
            self.vendor,
        ]
    }

    /// Parsed HAT, `None` when the byte is outside 0-8.
    #[inline]
    #[must_use]
    pub const fn hat(&self) -> Option<Hat> {
        Hat::from_code(self.hat)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::neutral()
    }
}

impl From<&ControllerState> for Report {
    fn from(state: &ControllerState) -> Self {
        Self {
            buttons: state.buttons,
            hat: state.hat().code(),
            lx: state.left.x,
            ly: state.left.y,
            rx: state.right.x,
            ry: state.right.y,
            vendor: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, StickPosition};

    #[test]
    fn test_encode_neutral_state() {
        assert_eq!(
            encode(&ControllerState::neutral()),
            [0xAA, 0x55, 0x00, 0x00, 0x08, 0x80, 0x80, 0x80, 0x80, 0x00]
        );
    }

    #[test]
    fn test_encode_a_with_dpad_up() {
        let mut state = ControllerState::neutral();
        state.buttons |= Buttons::A;
        state.dpad.set(Direction::Up, true);

        assert_eq!(
            encode(&state),
            [0xAA, 0x55, 0x04, 0x00, 0x00, 0x80, 0x80, 0x80, 0x80, 0x00]
        );
    }

    #[test]
    fn test_encode_buttons_little_endian_and_sticks() {
        let mut state = ControllerState::neutral();
        state.buttons = Buttons::HOME | Buttons::Y;
        state.left = StickPosition::new(0, 255);
        state.right = StickPosition::new(17, 42);

        let packet = encode(&state);
        assert_eq!(&packet[2..4], &[0x01, 0x10]);
        assert_eq!(&packet[5..9], &[0, 255, 17, 42]);
        assert_eq!(packet[9], 0);
    }

    #[test]
    fn test_report_payload_round_trip() {
        let report = Report {
            buttons: Buttons::ZL | Buttons::GR,
            hat: Hat::DownLeft.code(),
            lx: 1,
            ly: 2,
            rx: 3,
            ry: 4,
            vendor: 0,
        };
        assert_eq!(Report::from_payload(&report.to_payload()), report);
        assert_eq!(report.hat(), Some(Hat::DownLeft));
    }
}
