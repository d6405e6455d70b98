//! Report emission pacing for the receiving device.

/// Minimum spacing between two USB reports (125 Hz).
pub const REPORT_INTERVAL_MS: u64 = 8;

/// Decides when the device may emit the next report.
///
/// Frames may arrive far faster than the USB host polls; the pacer lets
/// a report through only when the device stack is ready and the interval
/// has elapsed since the previous emission.
///
/// # Example
///
/// ```
/// use switch_proto::ReportPacer;
///
/// let mut pacer = ReportPacer::new(0);
/// assert!(!pacer.poll(5, true));
/// assert!(pacer.poll(8, true));
/// assert!(!pacer.poll(10, true));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportPacer {
    interval_ms: u64,
    last_emit_ms: u64,
}

impl ReportPacer {
    /// Pacer with the standard interval. `now_ms` counts as the last emission.
    #[must_use]
    pub const fn new(now_ms: u64) -> Self {
        Self::with_interval(now_ms, REPORT_INTERVAL_MS)
    }

    #[must_use]
    pub const fn with_interval(now_ms: u64, interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_emit_ms: now_ms,
        }
    }

    /// Milliseconds until the interval has elapsed, zero if already due.
    #[must_use]
    pub const fn remaining_ms(&self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.last_emit_ms);
        self.interval_ms.saturating_sub(elapsed)
    }

    /// Returns `true` when a report should be sent now, and records it.
    pub fn poll(&mut self, now_ms: u64, ready: bool) -> bool {
        if !ready || self.remaining_ms(now_ms) > 0 {
            return false;
        }
        self.last_emit_ms = now_ms;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waits_for_interval_from_boot() {
        let mut pacer = ReportPacer::new(100);
        assert!(!pacer.poll(100, true));
        assert!(!pacer.poll(107, true));
        assert!(pacer.poll(108, true));
    }

    #[test]
    fn test_not_ready_defers_emission() {
        let mut pacer = ReportPacer::new(0);
        assert!(!pacer.poll(20, false));
        assert!(pacer.poll(21, true));
        assert_eq!(pacer.remaining_ms(21), REPORT_INTERVAL_MS);
    }

    #[test]
    fn test_bursts_are_capped() {
        let mut pacer = ReportPacer::new(0);
        let emitted = (0..=80u64).filter(|&t| pacer.poll(t, true)).count();
        assert_eq!(emitted, 10);
    }
}
