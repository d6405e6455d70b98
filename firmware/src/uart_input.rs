//! UART frame input.
//!
//! Bytes arrive one at a time and go through a [`FrameDecoder`]; a
//! receive error drops the partial frame and the decoder resynchronizes
//! on the next header.
//!
//! # Pins
//!
//! UART0, 115200 8N1:
//! - GPIO 0: TX (unused)
//! - GPIO 1: RX

use defmt::warn;
use embassy_rp::uart::{Async, UartRx};
use switch_proto::{FrameDecoder, Report};

/// Baud rate shared with the host bridge.
pub const BAUD_RATE: u32 = 115_200;

pub struct UartInput<'d> {
    rx: UartRx<'d, Async>,
    decoder: FrameDecoder,
    frames: u32,
}

impl<'d> UartInput<'d> {
    #[must_use]
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self {
            rx,
            decoder: FrameDecoder::new(),
            frames: 0,
        }
    }

    /// Number of complete frames decoded so far.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Wait for the next complete frame.
    pub async fn next_report(&mut self) -> Report {
        let mut byte = [0u8; 1];
        loop {
            if let Err(e) = self.rx.read(&mut byte).await {
                warn!("UART receive error: {:?}", e);
                self.decoder.reset();
                continue;
            }
            if let Some(report) = self.decoder.push_byte(byte[0]) {
                self.frames = self.frames.wrapping_add(1);
                return report;
            }
        }
    }
}
