//! USB HID output as a Switch-compatible gamepad.

use defmt::info;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::{HidWriter, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Handler, UsbDevice};
use portable_atomic::{AtomicBool, Ordering};
use switch_proto::{Report, PAYLOAD_LEN};

/// Nintendo.
pub const VENDOR_ID: u16 = 0x057E;
/// Pro Controller.
pub const PRODUCT_ID: u16 = 0x2009;

pub const MANUFACTURER: &str = "Nintendo";
pub const PRODUCT: &str = "Pro Controller";
pub const SERIAL_NUMBER: &str = "00000001";

/// The input report is the frame payload unchanged:
/// buttons (LE), hat, lx, ly, rx, ry, vendor.
pub const HID_REPORT_LEN: usize = PAYLOAD_LEN;

/// Interrupt endpoint size.
pub const MAX_PACKET_SIZE: usize = 64;

/// HORIPAD-style report descriptor, accepted by the Switch as a wired pad.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Buttons (16 buttons) ---
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x35, 0x00, //   Physical Minimum (0)
    0x45, 0x01, //   Physical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x10, //   Report Count (16)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x10, //   Usage Maximum (Button 16)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Hat switch, 8 = null ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x25, 0x07, //   Logical Maximum (7)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x01, //   Report Count (1)
    0x65, 0x14, //   Unit (Degrees)
    0x09, 0x39, //   Usage (Hat Switch)
    0x81, 0x42, //   Input (Data, Variable, Absolute, Null State)
    0x65, 0x00, //   Unit (None)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x01, //   Input (Constant) - 4 bit padding
    //
    // --- Sticks ---
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x46, 0xFF, 0x00, //   Physical Maximum (255)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x04, //   Report Count (4)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Vendor byte ---
    0x06, 0x00, 0xFF, //   Usage Page (Vendor Defined)
    0x09, 0x20, //   Usage (0x20)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Output report, ignored ---
    0x0A, 0x21, 0x26, //   Usage (0x2621)
    0x95, 0x08, //   Report Count (8)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

static CONFIGURED: AtomicBool = AtomicBool::new(false);

/// Whether the host has configured the device.
#[inline]
#[must_use]
pub fn is_configured() -> bool {
    CONFIGURED.load(Ordering::Relaxed)
}

/// Tracks the USB configured state for the output task.
pub struct UsbStateHandler;

impl Handler for UsbStateHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            CONFIGURED.store(false, Ordering::Relaxed);
        }
    }

    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        CONFIGURED.store(configured, Ordering::Relaxed);
        info!("USB configured: {}", configured);
    }
}

pub type UsbDriver<'d> = Driver<'d, USB>;

/// Writes [`Report`]s to the HID interrupt endpoint.
pub struct UsbHidOutput<'d> {
    writer: HidWriter<'d, UsbDriver<'d>, MAX_PACKET_SIZE>,
}

impl<'d> UsbHidOutput<'d> {
    pub fn new(writer: HidWriter<'d, UsbDriver<'d>, MAX_PACKET_SIZE>) -> Self {
        Self { writer }
    }

    pub async fn send(&mut self, report: &Report) -> Result<(), EndpointError> {
        let bytes: [u8; HID_REPORT_LEN] = report.to_payload();
        self.writer.write(&bytes).await
    }
}

/// Configure the HID class in the USB builder.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, UsbDriver<'d>>,
    state: &'d mut State<'d>,
) -> HidWriter<'d, UsbDriver<'d>, MAX_PACKET_SIZE> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: 1,
        max_packet_size: MAX_PACKET_SIZE as u16,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}

/// Memory the USB stack borrows for the lifetime of the device.
pub struct UsbResources {
    config_descriptor: [u8; 256],
    bos_descriptor: [u8; 256],
    msos_descriptor: [u8; 256],
    control_buf: [u8; 64],
    hid_state: State<'static>,
    handler: UsbStateHandler,
}

impl UsbResources {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_descriptor: [0; 256],
            bos_descriptor: [0; 256],
            msos_descriptor: [0; 256],
            control_buf: [0; 64],
            hid_state: State::new(),
            handler: UsbStateHandler,
        }
    }
}

impl Default for UsbResources {
    fn default() -> Self {
        Self::new()
    }
}

/// Device identity of a wired Pro Controller.
#[must_use]
pub fn device_config() -> embassy_usb::Config<'static> {
    let mut config = embassy_usb::Config::new(VENDOR_ID, PRODUCT_ID);
    config.manufacturer = Some(MANUFACTURER);
    config.product = Some(PRODUCT);
    config.serial_number = Some(SERIAL_NUMBER);
    config.max_power = 100;
    config.max_packet_size_0 = 64;
    config
}

/// Assemble the USB device with its single HID interface.
pub fn build_device(
    driver: UsbDriver<'static>,
    resources: &'static mut UsbResources,
) -> (UsbDevice<'static, UsbDriver<'static>>, UsbHidOutput<'static>) {
    let UsbResources {
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
        hid_state,
        handler,
    } = resources;

    let mut builder = Builder::new(
        driver,
        device_config(),
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );
    builder.handler(handler);
    let writer = configure_usb_hid(&mut builder, hid_state);
    (builder.build(), UsbHidOutput::new(writer))
}
