//! Time source for the host loop and the blocking procedures.

use std::time::{Duration, Instant};

/// Monotonic time plus the ability to wait.
///
/// The bridge loop, calibration and button detection only ever see time
/// through this trait, so tests can drive them with a virtual clock.
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&mut self, duration: Duration);

    /// Sleep until `deadline`, returning at once if it already passed.
    fn sleep_until(&mut self, deadline: Instant) {
        let now = self.now();
        if deadline > now {
            self.sleep(deadline - now);
        }
    }
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
}
