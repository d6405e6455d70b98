//! Linux capture: evdev keyboard and joystick device nodes.
//!
//! Both devices are opened non-blocking and drained every poll. Held keys,
//! buttons and axes are tracked across polls since the kernel only
//! reports changes.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::mem;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;

use log::{debug, info, warn};
use switch_core::{apply_key_bindings, apply_pad_reading, BridgeConfig, CaptureBackend, RawSample};
use switch_proto::ControllerState;

use super::keymap::linux_key_code;
use super::pad::{js_reading, JS_AXES};

const EV_KEY: u16 = 0x01;
const KEY_A: usize = 30;
const KEY_MAX: usize = 0x2ff;

const JS_EVENT_BUTTON: u8 = 0x01;
const JS_EVENT_AXIS: u8 = 0x02;
const JS_EVENT_INIT: u8 = 0x80;
const JS_EVENT_SIZE: usize = 8;

/// `EVIOCGBIT(ev, len)`: read the event type or code bitmap of a device.
const fn eviocgbit(ev: u32, len: u32) -> u32 {
    const IOC_READ: u32 = 2;
    (IOC_READ << 30) | (len << 16) | ((b'E' as u32) << 8) | (0x20 + ev)
}

fn open_nonblocking(path: &PathBuf) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
}

fn test_bit(bits: &[u8], bit: usize) -> bool {
    bits.get(bit / 8).is_some_and(|byte| byte & (1 << (bit % 8)) != 0)
}

fn event_bits(file: &File, ev: u32, bits: &mut [u8]) -> io::Result<()> {
    let request = eviocgbit(ev, bits.len() as u32);
    // SAFETY: the kernel writes at most `bits.len()` bytes into `bits`.
    let ret = unsafe { libc::ioctl(file.as_raw_fd(), request as _, bits.as_mut_ptr()) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Whether the device reports key events including the letter keys.
fn is_keyboard(file: &File) -> bool {
    let mut types = [0u8; 4];
    if event_bits(file, 0, &mut types).is_err() || !test_bit(&types, usize::from(EV_KEY)) {
        return false;
    }
    let mut keys = [0u8; KEY_MAX / 8 + 1];
    event_bits(file, u32::from(EV_KEY), &mut keys).is_ok() && test_bit(&keys, KEY_A)
}

/// Read whole records until the device would block.
///
/// Returns `Err` only for errors other than `WouldBlock`.
fn drain<const N: usize>(file: &mut File, mut record: impl FnMut(&[u8; N])) -> io::Result<()> {
    let mut buf = [0u8; 1024];
    let chunk = buf.len() / N * N;
    loop {
        match file.read(&mut buf[..chunk]) {
            Ok(0) => return Ok(()),
            Ok(n) => {
                for raw in buf[..n].chunks_exact(N) {
                    if let Ok(raw) = <&[u8; N]>::try_from(raw) {
                        record(raw);
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Keyboard read from the first `/dev/input/event*` node that looks like one.
pub struct EvdevKeyboard {
    file: Option<File>,
    path: PathBuf,
    held: HashSet<u16>,
}

impl EvdevKeyboard {
    pub fn open() -> io::Result<Self> {
        for index in 0..32 {
            let path = PathBuf::from(format!("/dev/input/event{index}"));
            let Ok(file) = open_nonblocking(&path) else {
                continue;
            };
            if is_keyboard(&file) {
                info!("Keyboard: {}", path.display());
                return Ok(Self {
                    file: Some(file),
                    path,
                    held: HashSet::new(),
                });
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            "no readable keyboard in /dev/input/event0-31 (is your user in the `input` group?)",
        ))
    }

    fn pump(&mut self) {
        const EVENT_SIZE: usize = mem::size_of::<libc::input_event>();
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let held = &mut self.held;
        let result = drain::<EVENT_SIZE>(file, |raw| {
            // SAFETY: `input_event` is plain data and `raw` holds exactly one.
            let event: libc::input_event = unsafe { std::ptr::read_unaligned(raw.as_ptr().cast()) };
            if event.type_ != EV_KEY {
                return;
            }
            match event.value {
                0 => {
                    held.remove(&event.code);
                }
                // 1 is a press, 2 an autorepeat.
                _ => {
                    held.insert(event.code);
                }
            }
        });
        if let Err(e) = result {
            warn!("Keyboard {} lost: {e}", self.path.display());
            self.file = None;
            self.held.clear();
        }
    }
}

impl CaptureBackend for EvdevKeyboard {
    fn name(&self) -> &str {
        "evdev keyboard"
    }

    fn poll(&mut self, state: &mut ControllerState, config: &BridgeConfig) {
        self.pump();
        let held = &self.held;
        apply_key_bindings(state, &config.bindings, |name| {
            linux_key_code(name).is_some_and(|code| held.contains(&code))
        });
    }
}

/// Gamepad read from the first `/dev/input/js*` node.
pub struct JoystickPad {
    file: Option<File>,
    path: PathBuf,
    buttons: u64,
    axes: [i16; JS_AXES],
    latest: Option<RawSample>,
}

impl JoystickPad {
    pub fn open() -> io::Result<Self> {
        for index in 0..8 {
            let path = PathBuf::from(format!("/dev/input/js{index}"));
            if let Ok(file) = open_nonblocking(&path) {
                info!("Controller: {}", path.display());
                return Ok(Self {
                    file: Some(file),
                    path,
                    buttons: 0,
                    axes: [0; JS_AXES],
                    latest: None,
                });
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            "no joystick in /dev/input/js0-7",
        ))
    }

    fn pump(&mut self) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let (buttons, axes) = (&mut self.buttons, &mut self.axes);
        let result = drain::<JS_EVENT_SIZE>(file, |raw| {
            let value = i16::from_ne_bytes([raw[4], raw[5]]);
            let kind = raw[6] & !JS_EVENT_INIT;
            let number = raw[7];
            match kind {
                JS_EVENT_BUTTON if number < 64 => {
                    if value != 0 {
                        *buttons |= 1 << number;
                    } else {
                        *buttons &= !(1 << number);
                    }
                }
                JS_EVENT_AXIS => {
                    if let Some(axis) = axes.get_mut(usize::from(number)) {
                        *axis = value;
                    }
                }
                _ => debug!("Ignoring joystick event type {kind:#04x} number {number}"),
            }
        });
        if let Err(e) = result {
            warn!("Controller {} lost: {e}", self.path.display());
            self.file = None;
            self.buttons = 0;
            self.axes = [0; JS_AXES];
        }
    }
}

impl CaptureBackend for JoystickPad {
    fn name(&self) -> &str {
        "joystick"
    }

    fn poll(&mut self, state: &mut ControllerState, config: &BridgeConfig) {
        self.pump();
        if self.file.is_none() {
            self.latest = None;
            return;
        }
        let reading = js_reading(self.buttons, &self.axes);
        self.latest = Some(apply_pad_reading(state, &reading, config));
    }

    fn latest_raw_sample(&self) -> Option<RawSample> {
        self.latest
    }
}
