//! Bridge: polls capture backends and streams encoded packets to a transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, error, info, warn};
use switch_proto::{encode, ControllerState, PACKET_LEN};

use crate::capture::CaptureBackend;
use crate::clock::{Clock, SystemClock};
use crate::config::BridgeConfig;
use crate::transport::{Transport, TransportError};

/// Pause after a failed write before the next cycle.
pub const WRITE_BACKOFF: Duration = Duration::from_millis(100);

/// A debug line is logged every this many packets while buttons are held.
const ACTIVITY_LOG_INTERVAL: u64 = 100;

/// Forwards controller state from capture backends to a transport.
///
/// Every cycle starts from a neutral state, lets each backend set what it
/// sees held, resolves keyboard stick directions, then encodes and writes
/// one packet.
///
/// # Error Handling
///
/// Backends never fail. A failed write is logged, followed by a short
/// backoff, and the loop carries on; the next cycle sends a fresh state.
pub struct Bridge<T, C = SystemClock> {
    transport: T,
    clock: C,
    backends: Vec<Box<dyn CaptureBackend>>,
    config: BridgeConfig,
    stats: BridgeStats,
}

/// Outcome of one cycle.
#[derive(Debug)]
pub struct Cycle {
    pub state: ControllerState,
    pub packet: [u8; PACKET_LEN],
    pub result: Result<(), TransportError>,
}

/// Packet counters kept by the bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub packets_sent: u64,
    pub write_failures: u64,
}

impl<T: Transport> Bridge<T, SystemClock> {
    /// Create a bridge driven by the wall clock.
    pub fn new(transport: T, config: BridgeConfig) -> Self {
        Self::with_clock(transport, SystemClock, config)
    }
}

impl<T: Transport, C: Clock> Bridge<T, C> {
    pub fn with_clock(transport: T, clock: C, config: BridgeConfig) -> Self {
        Self {
            transport,
            clock,
            backends: Vec::new(),
            config,
            stats: BridgeStats::default(),
        }
    }

    /// Append a backend. Backends are polled in the order they were added.
    pub fn add_backend(&mut self, backend: Box<dyn CaptureBackend>) {
        info!("Input source enabled: {}", backend.name());
        self.backends.push(backend);
    }

    /// Time between two cycles at the configured update rate, at least 1 ms.
    #[must_use]
    pub fn period(&self) -> Duration {
        let rate = self.config.general.update_rate_hz.max(1);
        Duration::from_millis(u64::from((1000 / rate).max(1)))
    }

    /// Build, encode and write a single packet.
    pub fn run_cycle(&mut self) -> Cycle {
        let mut state = ControllerState::neutral();
        for backend in &mut self.backends {
            backend.poll(&mut state, &self.config);
        }
        state.apply_stick_directions();

        let packet = encode(&state);
        let result = self.transport.write_packet(&packet);
        match result {
            Ok(()) => {
                self.stats.packets_sent += 1;
                if self.stats.packets_sent % ACTIVITY_LOG_INTERVAL == 0 && !state.buttons.is_empty() {
                    debug!(
                        "Sent {} packets, buttons {:#06x} hat {:?}",
                        self.stats.packets_sent,
                        state.buttons.raw(),
                        state.hat()
                    );
                }
            }
            Err(_) => self.stats.write_failures += 1,
        }

        Cycle {
            state,
            packet,
            result,
        }
    }

    /// Run cycles on fixed tick boundaries until `running` is cleared,
    /// then send one neutral packet.
    ///
    /// A cycle that overruns its tick re-anchors the schedule to the
    /// current time instead of firing the missed ticks back to back. A
    /// failed final neutral packet is logged and counted in
    /// [`BridgeStats::write_failures`].
    pub fn run(&mut self, running: &AtomicBool) -> BridgeStats {
        let period = self.period();
        info!(
            "Bridge running at {} Hz ({period:?} per cycle)",
            self.config.general.update_rate_hz
        );

        let mut next_tick = self.clock.now();
        while running.load(Ordering::Relaxed) {
            if let Err(e) = self.run_cycle().result {
                warn!("Packet write failed: {e}");
                self.clock.sleep(WRITE_BACKOFF);
                next_tick = self.clock.now();
                continue;
            }

            next_tick += period;
            let now = self.clock.now();
            if next_tick > now {
                self.clock.sleep_until(next_tick);
            } else {
                next_tick = now;
            }
        }

        if let Err(e) = self.shutdown() {
            self.stats.write_failures += 1;
            error!("Final neutral packet failed, the device may keep inputs held: {e}");
        }
        info!(
            "Bridge stopped after {} packets ({} failed writes)",
            self.stats.packets_sent, self.stats.write_failures
        );
        self.stats
    }

    /// Send a neutral packet so nothing stays held on the device.
    pub fn shutdown(&mut self) -> Result<(), TransportError> {
        self.send_state(&ControllerState::neutral())
    }

    /// Encode and write an explicit state, bypassing the backends.
    pub fn send_state(&mut self, state: &ControllerState) -> Result<(), TransportError> {
        let mut state = *state;
        state.apply_stick_directions();
        self.transport.write_packet(&encode(&state))
    }

    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Decompose the bridge into its transport and clock.
    pub fn into_parts(self) -> (T, C) {
        (self.transport, self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FnBackend, RecordingTransport, VirtualClock};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;
    use switch_proto::{Buttons, Direction, Stick, StickPosition};

    const NEUTRAL: [u8; PACKET_LEN] = [0xAA, 0x55, 0x00, 0x00, 0x08, 0x80, 0x80, 0x80, 0x80, 0x00];

    fn bridge_at(rate_hz: u32) -> (Bridge<RecordingTransport, VirtualClock>, VirtualClock) {
        let mut config = BridgeConfig::default();
        config.general.update_rate_hz = rate_hz;
        let clock = VirtualClock::new();
        let bridge = Bridge::with_clock(RecordingTransport::default(), clock.clone(), config);
        (bridge, clock)
    }

    /// Backend that clears `running` on its `stop_at`-th poll.
    fn stopping_backend(running: Arc<AtomicBool>, stop_at: u32) -> Box<dyn CaptureBackend> {
        let mut polls = 0;
        Box::new(FnBackend(move |_: &mut ControllerState| {
            polls += 1;
            if polls == stop_at {
                running.store(false, Ordering::Relaxed);
            }
        }))
    }

    #[test]
    fn test_cycle_encodes_polled_state() {
        let (mut bridge, _) = bridge_at(1000);
        bridge.add_backend(Box::new(FnBackend(|state: &mut ControllerState| {
            state.buttons |= Buttons::A;
            state.dpad.set(Direction::Up, true);
        })));

        let cycle = bridge.run_cycle();
        assert!(cycle.result.is_ok());
        assert_eq!(cycle.packet, [0xAA, 0x55, 0x04, 0x00, 0x00, 0x80, 0x80, 0x80, 0x80, 0x00]);
        assert_eq!(bridge.transport().packets, vec![cycle.packet.to_vec()]);
        assert_eq!(bridge.stats().packets_sent, 1);
    }

    #[test]
    fn test_state_is_rebuilt_every_cycle() {
        let (mut bridge, _) = bridge_at(1000);
        let first = Rc::new(Cell::new(true));
        let flag = first.clone();
        bridge.add_backend(Box::new(FnBackend(move |state: &mut ControllerState| {
            if flag.replace(false) {
                state.buttons |= Buttons::HOME;
            }
        })));

        assert_eq!(bridge.run_cycle().state.buttons, Buttons::HOME);
        assert_eq!(bridge.run_cycle().packet, NEUTRAL);
    }

    #[test]
    fn test_backends_share_one_state() {
        let (mut bridge, _) = bridge_at(1000);
        bridge.add_backend(Box::new(FnBackend(|state: &mut ControllerState| {
            state.buttons |= Buttons::ZL;
            state.directions_mut(Stick::Left).set(Direction::Left, true);
            state.directions_mut(Stick::Right).set(Direction::Down, true);
        })));
        bridge.add_backend(Box::new(FnBackend(|state: &mut ControllerState| {
            state.buttons |= Buttons::R;
            state.left = StickPosition::new(200, 60);
        })));

        let cycle = bridge.run_cycle();
        assert_eq!(cycle.state.buttons, Buttons::ZL | Buttons::R);
        // The moved gamepad stick wins over the key, the idle one does not.
        assert_eq!(cycle.state.left, StickPosition::new(200, 60));
        assert_eq!(cycle.state.right, StickPosition::new(128, 255));
    }

    #[test]
    fn test_period_from_update_rate() {
        assert_eq!(bridge_at(1000).0.period(), Duration::from_millis(1));
        assert_eq!(bridge_at(5000).0.period(), Duration::from_millis(1));
        assert_eq!(bridge_at(60).0.period(), Duration::from_millis(16));
        assert_eq!(bridge_at(1).0.period(), Duration::from_secs(1));
    }

    #[test]
    fn test_run_sends_neutral_on_shutdown() {
        let (mut bridge, clock) = bridge_at(100);
        let running = Arc::new(AtomicBool::new(true));
        bridge.add_backend(Box::new(FnBackend(|state: &mut ControllerState| {
            state.buttons |= Buttons::B;
        })));
        bridge.add_backend(stopping_backend(running.clone(), 3));

        let stats = bridge.run(&running);
        assert_eq!(stats.packets_sent, 3);

        let packets = &bridge.transport().packets;
        assert_eq!(packets.len(), 4);
        assert_eq!(packets[0][2], 0x02);
        assert_eq!(packets[3], NEUTRAL);
        assert_eq!(clock.elapsed(), Duration::from_millis(30));
    }

    #[test]
    fn test_overrun_reanchors_schedule() {
        let (mut bridge, clock) = bridge_at(100);
        let running = Arc::new(AtomicBool::new(true));
        let slow = clock.clone();
        let mut polls = 0;
        bridge.add_backend(Box::new(FnBackend(move |_: &mut ControllerState| {
            polls += 1;
            if polls == 1 {
                slow.advance(Duration::from_millis(25));
            }
        })));
        bridge.add_backend(stopping_backend(running.clone(), 3));

        bridge.run(&running);
        // 25 ms overrun, then two regular 10 ms ticks from there.
        assert_eq!(clock.elapsed(), Duration::from_millis(45));
    }

    #[test]
    fn test_write_failure_backs_off_and_continues() {
        let (mut bridge, clock) = bridge_at(1000);
        bridge.transport_mut().fail_on = vec![0];
        let running = Arc::new(AtomicBool::new(true));
        bridge.add_backend(stopping_backend(running.clone(), 2));

        let stats = bridge.run(&running);
        assert_eq!(stats, BridgeStats { packets_sent: 1, write_failures: 1 });
        assert_eq!(bridge.transport().packets.len(), 2);
        assert_eq!(clock.elapsed(), WRITE_BACKOFF + Duration::from_millis(1));
    }

    #[test]
    fn test_failed_shutdown_keeps_stats() {
        let (mut bridge, _clock) = bridge_at(1000);
        bridge.transport_mut().fail_on = vec![2];
        let running = Arc::new(AtomicBool::new(true));
        bridge.add_backend(stopping_backend(running.clone(), 2));

        let stats = bridge.run(&running);
        assert_eq!(stats, BridgeStats { packets_sent: 2, write_failures: 1 });
        assert_eq!(bridge.transport().packets.len(), 2);
    }

    #[test]
    fn test_cleared_flag_only_sends_neutral() {
        let (mut bridge, clock) = bridge_at(1000);
        let running = AtomicBool::new(false);

        let stats = bridge.run(&running);
        assert_eq!(stats, BridgeStats::default());
        assert_eq!(bridge.transport().packets, vec![NEUTRAL.to_vec()]);
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_send_state_resolves_directions() {
        let (mut bridge, _) = bridge_at(1000);
        let mut state = ControllerState::neutral();
        state.directions_mut(Stick::Right).set(Direction::Up, true);

        bridge.send_state(&state).unwrap();
        assert_eq!(bridge.transport().packets[0][7..9], [0x80, 0x00]);
    }
}
