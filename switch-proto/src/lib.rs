//! Controller state model and wire protocol for the Switch controller bridge.
//!
//! The host captures keyboard and gamepad input into a [`ControllerState`],
//! [`encode`]s it into a fixed 10-byte packet and streams it over a serial
//! link. The receiving device runs a [`FrameDecoder`] over the byte stream
//! and emits the decoded [`Report`] as a USB report, paced by a
//! [`ReportPacer`].
//!
//! # Modules
//!
//! - [`types`]: State model ([`Buttons`], [`Hat`], [`DirectionFlags`], [`ControllerState`])
//! - [`packet`]: Packet layout, [`encode`] and [`Report`]
//! - [`decoder`]: Header-synchronized [`FrameDecoder`]
//! - [`pacing`]: [`ReportPacer`] for the device's report interval
//! - [`command`]: Text commands such as `A+B` or `LX:255` ([`parse_command`])
//!
//! # Example
//!
//! ```
//! use switch_proto::{encode, Buttons, ControllerState, Direction, FrameDecoder};
//!
//! let mut state = ControllerState::neutral();
//! state.buttons |= Buttons::A;
//! state.dpad.set(Direction::Up, true);
//!
//! let packet = encode(&state);
//! assert_eq!(packet, [0xAA, 0x55, 0x04, 0x00, 0x00, 0x80, 0x80, 0x80, 0x80, 0x00]);
//!
//! let mut decoder = FrameDecoder::new();
//! let report = decoder.push_bytes(&packet).unwrap();
//! assert_eq!(report.buttons, Buttons::A);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (error trait impls)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! so the device firmware can share it with the host.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod command;
pub mod decoder;
pub mod packet;
pub mod pacing;
pub mod types;

pub use command::{parse_command, CommandError};
pub use decoder::{DecoderState, FrameDecoder};
pub use packet::{encode, Report, HEADER, PACKET_LEN, PAYLOAD_LEN};
pub use pacing::{ReportPacer, REPORT_INTERVAL_MS};
pub use types::{
    Buttons, ControllerState, Direction, DirectionFlags, Hat, Stick, StickPosition, STICK_CENTER,
    STICK_MAX, STICK_MIN,
};
