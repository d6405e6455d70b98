//! Physical button detection for building controller remaps.

use std::time::Duration;

use log::debug;
use switch_proto::ControllerState;

use crate::capture::CaptureBackend;
use crate::clock::Clock;
use crate::config::BridgeConfig;

/// Interval between polls while waiting for a press.
pub const DETECT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait for the user to press a physical controller button.
///
/// Buttons already held when detection starts are ignored until they
/// are released. Returns the lowest newly pressed physical index after
/// waiting, within the same `timeout`, for that button to be released
/// again. Returns `None` when nothing was pressed in time.
pub fn detect_button<B, C>(
    backend: &mut B,
    config: &BridgeConfig,
    clock: &mut C,
    timeout: Duration,
) -> Option<u8>
where
    B: CaptureBackend + ?Sized,
    C: Clock,
{
    let deadline = clock.now() + timeout;
    let mut held = physical_buttons(backend, config);

    let index = loop {
        if clock.now() >= deadline {
            return None;
        }
        clock.sleep(DETECT_POLL_INTERVAL);
        let current = physical_buttons(backend, config);
        let pressed = current & !held;
        held = current;
        if pressed != 0 {
            break pressed.trailing_zeros() as u8;
        }
    };
    debug!("Detected physical button {index}");

    let mask = 1u64 << index;
    while clock.now() < deadline && physical_buttons(backend, config) & mask != 0 {
        clock.sleep(DETECT_POLL_INTERVAL);
    }
    Some(index)
}

fn physical_buttons<B: CaptureBackend + ?Sized>(backend: &mut B, config: &BridgeConfig) -> u64 {
    let mut scratch = ControllerState::neutral();
    backend.poll(&mut scratch, config);
    backend
        .latest_raw_sample()
        .map_or(0, |sample| sample.physical_buttons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedBackend, VirtualClock};
    use crate::RawSample;

    fn buttons(mask: u64) -> Option<RawSample> {
        Some(RawSample {
            physical_buttons: mask,
            ..RawSample::default()
        })
    }

    #[test]
    fn test_reports_lowest_new_press_and_waits_for_release() {
        let mut backend = ScriptedBackend::new(vec![
            buttons(0b1),
            buttons(0b1),
            buttons(0b1_0100_0001),
            buttons(0b0100_0000),
            buttons(0),
            buttons(0),
        ]);
        let mut clock = VirtualClock::new();

        let index = detect_button(
            &mut backend,
            &BridgeConfig::default(),
            &mut clock,
            Duration::from_secs(5),
        );
        assert_eq!(index, Some(6));
        // Baseline, two polls to the press, then two release polls.
        assert_eq!(backend.polls, 5);
        assert_eq!(clock.elapsed(), Duration::from_millis(150));
    }

    #[test]
    fn test_held_button_counts_after_release() {
        let mut backend = ScriptedBackend::new(vec![buttons(0b10), buttons(0), buttons(0b10)]);
        let mut clock = VirtualClock::new();

        let index = detect_button(
            &mut backend,
            &BridgeConfig::default(),
            &mut clock,
            Duration::from_secs(1),
        );
        assert_eq!(index, Some(1));
    }

    #[test]
    fn test_times_out_without_press() {
        let mut backend = ScriptedBackend::new(vec![]);
        let mut clock = VirtualClock::new();

        let index = detect_button(
            &mut backend,
            &BridgeConfig::default(),
            &mut clock,
            Duration::from_millis(500),
        );
        assert_eq!(index, None);
        assert_eq!(clock.elapsed(), Duration::from_millis(500));
    }
}
