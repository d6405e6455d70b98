#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{UART0, USB};
use embassy_rp::uart::{self, Uart};
use embassy_rp::{bind_interrupts, usb};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Timer};
use embassy_usb::UsbDevice;
use static_cell::StaticCell;
use switch_bridge_firmware::uart_input::BAUD_RATE;
use switch_bridge_firmware::{
    build_device, is_configured, Report, ReportPacer, UartInput, UsbDriver, UsbHidOutput,
    UsbResources, REPORT_INTERVAL_MS,
};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART0_IRQ => uart::InterruptHandler<UART0>;
    USBCTRL_IRQ => usb::InterruptHandler<USB>;
});

type ReportSignal = Signal<CriticalSectionRawMutex, Report>;

/// Latest decoded report; a newer frame replaces one not yet sent.
static LATEST_REPORT: ReportSignal = Signal::new();
static USB_RESOURCES: StaticCell<UsbResources> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Switch bridge starting...");
    let p = embassy_rp::init(Default::default());

    let mut uart_config = uart::Config::default();
    uart_config.baudrate = BAUD_RATE;
    let (_tx, rx) = Uart::new(
        p.UART0, p.PIN_0, p.PIN_1, Irqs, p.DMA_CH0, p.DMA_CH1, uart_config,
    )
    .split();

    let (device, output) = build_device(
        usb::Driver::new(p.USB, Irqs),
        USB_RESOURCES.init(UsbResources::new()),
    );
    let led = Output::new(p.PIN_25, Level::Low);

    spawner.spawn(usb_task(device).unwrap());
    spawner.spawn(input_task(UartInput::new(rx), led).unwrap());
    spawner.spawn(output_task(output).unwrap());

    info!("Waiting for frames on UART0");
}

#[embassy_executor::task]
async fn usb_task(mut device: UsbDevice<'static, UsbDriver<'static>>) {
    device.run().await;
}

/// Decodes frames and publishes each one, blinking the LED.
#[embassy_executor::task]
async fn input_task(mut input: UartInput<'static>, mut led: Output<'static>) {
    loop {
        let report = input.next_report().await;
        LATEST_REPORT.signal(report);
        led.toggle();
    }
}

/// Sends the latest report once per interval while the host has the
/// device configured. Neutral until the first frame arrives.
#[embassy_executor::task]
async fn output_task(mut output: UsbHidOutput<'static>) {
    let mut report = Report::neutral();
    let mut pacer = ReportPacer::new(Instant::now().as_millis());

    loop {
        Timer::after_millis(pacer.remaining_ms(Instant::now().as_millis())).await;
        if let Some(latest) = LATEST_REPORT.try_take() {
            report = latest;
        }

        if pacer.poll(Instant::now().as_millis(), is_configured()) {
            if let Err(e) = output.send(&report).await {
                warn!("HID write failed: {:?}", e);
            }
        } else {
            Timer::after_millis(REPORT_INTERVAL_MS).await;
        }
    }
}
