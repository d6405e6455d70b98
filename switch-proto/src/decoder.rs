//! Byte-stream frame decoder for the receiving device.
//!
//! Scans for the `0xAA 0x55` header, then collects the 8 payload bytes.
//! A second `0xAA` while waiting for `0x55` resets the search to the
//! first header byte instead of being taken as a fresh start, so
//! `AA AA 55 ...` does not synchronize. A payload that stops arriving
//! keeps the decoder in [`DecoderState::ReadPayload`] until more bytes
//! come in; there is no timeout.

use crate::packet::{Report, HEADER, PAYLOAD_LEN};

/// Position of the decoder in the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderState {
    AwaitHeaderByte1,
    AwaitHeaderByte2,
    /// Next payload byte index (0-7).
    ReadPayload(u8),
}

/// Frame decoder.
///
/// # Example
///
/// ```
/// use switch_proto::{encode, ControllerState, FrameDecoder};
///
/// let mut decoder = FrameDecoder::new();
/// let packet = encode(&ControllerState::neutral());
///
/// // Leading noise is discarded.
/// assert!(decoder.push_bytes(&[0x12, 0x34]).is_none());
/// let report = decoder.push_bytes(&packet).unwrap();
/// assert_eq!(report.hat, 8);
/// ```
#[derive(Clone, Debug)]
pub struct FrameDecoder {
    state: DecoderState,
    payload: [u8; PAYLOAD_LEN],
}

impl FrameDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecoderState::AwaitHeaderByte1,
            payload: [0u8; PAYLOAD_LEN],
        }
    }

    /// Current state, mostly useful for diagnostics.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> DecoderState {
        self.state
    }

    /// Drop any partial frame and wait for a new header.
    pub fn reset(&mut self) {
        self.state = DecoderState::AwaitHeaderByte1;
    }

    /// Feed one byte. Returns the report when this byte completes a frame.
    pub fn push_byte(&mut self, byte: u8) -> Option<Report> {
        match self.state {
            DecoderState::AwaitHeaderByte1 => {
                if byte == HEADER[0] {
                    self.state = DecoderState::AwaitHeaderByte2;
                }
                None
            }
            DecoderState::AwaitHeaderByte2 => {
                self.state = if byte == HEADER[1] {
                    DecoderState::ReadPayload(0)
                } else {
                    DecoderState::AwaitHeaderByte1
                };
                None
            }
            DecoderState::ReadPayload(index) => {
                let index = usize::from(index);
                self.payload[index] = byte;
                if index + 1 == PAYLOAD_LEN {
                    self.state = DecoderState::AwaitHeaderByte1;
                    Some(Report::from_payload(&self.payload))
                } else {
                    self.state = DecoderState::ReadPayload((index + 1) as u8);
                    None
                }
            }
        }
    }

    /// Feed a chunk of bytes and return the newest report completed in it.
    ///
    /// Reports completed earlier in the same chunk are superseded.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Option<Report> {
        bytes
            .iter()
            .fold(None, |latest, &byte| self.push_byte(byte).or(latest))
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
