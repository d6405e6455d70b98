//! Fakes shared by the unit tests.

use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use switch_proto::ControllerState;

use crate::capture::{CaptureBackend, RawSample};
use crate::clock::Clock;
use crate::config::BridgeConfig;
use crate::transport::{Transport, TransportError};

/// Clock that only advances when slept on. Clones share the same time.
#[derive(Clone)]
pub struct VirtualClock {
    start: Instant,
    offset: Rc<Cell<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }

    /// Simulate time spent working.
    pub fn advance(&self, duration: Duration) {
        self.offset.set(self.offset.get() + duration);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.start + self.offset.get()
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

/// Backend replaying one raw sample per poll, then reporting nothing.
pub struct ScriptedBackend {
    samples: VecDeque<Option<RawSample>>,
    latest: Option<RawSample>,
    pub polls: usize,
}

impl ScriptedBackend {
    pub fn new(samples: Vec<Option<RawSample>>) -> Self {
        Self {
            samples: samples.into(),
            latest: None,
            polls: 0,
        }
    }
}

impl CaptureBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn poll(&mut self, _state: &mut ControllerState, _config: &BridgeConfig) {
        self.polls += 1;
        self.latest = self.samples.pop_front().flatten();
    }

    fn latest_raw_sample(&self) -> Option<RawSample> {
        self.latest
    }
}

/// Backend that applies a fixed closure on every poll.
pub struct FnBackend<F>(pub F);

impl<F: FnMut(&mut ControllerState)> CaptureBackend for FnBackend<F> {
    fn name(&self) -> &str {
        "fn"
    }

    fn poll(&mut self, state: &mut ControllerState, _config: &BridgeConfig) {
        (self.0)(state);
    }
}

/// Transport recording every packet, failing the writes listed in `fail_on`.
#[derive(Default)]
pub struct RecordingTransport {
    pub packets: Vec<Vec<u8>>,
    pub fail_on: Vec<usize>,
    attempts: usize,
}

impl Transport for RecordingTransport {
    fn write_packet(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_on.contains(&attempt) {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "device busy").into());
        }
        self.packets.push(packet.to_vec());
        Ok(())
    }
}
