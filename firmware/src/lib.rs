//! Switch controller bridge firmware for RP2040.
//!
//! Receives 10-byte controller frames over UART and presents the latest
//! one to the host as a Switch-compatible USB HID gamepad.
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART0 TX | 0    | Unused, claimed by the UART driver |
//! | UART0 RX | 1    | Frames from the host bridge, 115200 8N1 |
//! | LED      | 25   | Toggles on every decoded frame |
//!
//! # Architecture
//!
//! Three Embassy tasks:
//!
//! - **USB Task**: runs the USB device stack
//! - **Input Task**: decodes UART bytes and signals each complete report
//! - **Output Task**: paces reports at [`REPORT_INTERVAL_MS`] and writes
//!   the latest one while the device is configured
//!
//! The tasks share a [`Signal`](embassy_sync::signal::Signal), so the
//! output always carries the most recent frame and stale ones are dropped.
//!
//! # Features
//!
//! - **`dev-panic`** (default): `panic-probe`, panic info over RTT
//! - **`prod-panic`**: `panic-reset`, silent reset

#![no_std]

pub use switch_proto::{FrameDecoder, Report, ReportPacer, PAYLOAD_LEN, REPORT_INTERVAL_MS};

pub mod uart_input;
pub mod usb_output;

pub use uart_input::UartInput;
pub use usb_output::{
    build_device, configure_usb_hid, device_config, is_configured, UsbDriver, UsbHidOutput,
    UsbResources, UsbStateHandler, HID_REPORT_LEN, PRODUCT_ID, VENDOR_ID,
};
