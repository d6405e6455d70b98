//! Stick calibration: the two-phase measurement and the runtime remap.
//!
//! All values live in the normalized 0-255 domain, after vertical
//! inversion, which is what [`RawSample`](crate::RawSample) carries.
//!
//! # Example
//!
//! ```
//! use switch_core::{calibrate, Axis, AxisCalibration, StickCalibration};
//!
//! let stick = StickCalibration {
//!     x: AxisCalibration::new(50, 150, 220),
//!     y: AxisCalibration::default(),
//!     calibrated: true,
//! };
//! assert_eq!(calibrate(50, &stick, Axis::X), 0);
//! assert_eq!(calibrate(150, &stick, Axis::X), 128);
//! assert_eq!(calibrate(220, &stick, Axis::X), 255);
//! ```

use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use switch_proto::{ControllerState, Stick, StickPosition};

use crate::capture::CaptureBackend;
use crate::clock::Clock;
use crate::config::BridgeConfig;

/// One axis of a stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Measured travel of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisCalibration {
    pub center: i32,
    pub min: i32,
    pub max: i32,
}

impl AxisCalibration {
    #[must_use]
    pub const fn new(min: i32, center: i32, max: i32) -> Self {
        Self { center, min, max }
    }

    /// Map a sample onto 0-255 with `center` landing exactly on 128.
    ///
    /// Each side of center is scaled on its own; zero-width sides are
    /// treated as one unit wide. Computed in `i64` so any stored record,
    /// however far out of range, yields a clamped value.
    #[must_use]
    pub fn remap(&self, raw: i32) -> u8 {
        let (raw, center) = (i64::from(raw), i64::from(self.center));
        let (min, max) = (i64::from(self.min), i64::from(self.max));
        let value = if raw < center {
            (raw - min) * 128 / (center - min).max(1)
        } else {
            128 + (raw - center) * 127 / (max - center).max(1)
        };
        value.clamp(0, 255) as u8
    }

    /// Whether every field lies in the normalized 0-255 domain.
    #[must_use]
    pub fn in_domain(&self) -> bool {
        [self.min, self.center, self.max]
            .iter()
            .all(|value| (0..=255).contains(value))
    }
}

impl Default for AxisCalibration {
    fn default() -> Self {
        Self::new(0, 128, 255)
    }
}

/// Calibration for both axes of one stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StickCalibration {
    pub calibrated: bool,
    pub x: AxisCalibration,
    pub y: AxisCalibration,
}

impl StickCalibration {
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> &AxisCalibration {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

/// Remap a normalized sample through a stick's calibration.
///
/// Uncalibrated sticks pass the sample through truncated to 8 bits.
#[must_use]
pub fn calibrate(raw: i32, calibration: &StickCalibration, axis: Axis) -> u8 {
    if !calibration.calibrated {
        return raw as u8;
    }
    calibration.axis(axis).remap(raw)
}

/// Error type for the calibration procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CalibrationError {
    #[error("no controller reading while measuring the {0:?} stick center; is a controller connected?")]
    NoController(Stick),
}

/// Sample counts and intervals for both phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationPlan {
    pub center_samples: u32,
    pub center_interval: Duration,
    /// Range phase length is `range_samples * range_interval` (10 s by default).
    pub range_samples: u32,
    pub range_interval: Duration,
}

impl Default for CalibrationPlan {
    fn default() -> Self {
        Self {
            center_samples: 20,
            center_interval: Duration::from_millis(10),
            range_samples: 200,
            range_interval: Duration::from_millis(50),
        }
    }
}

impl CalibrationPlan {
    #[must_use]
    pub fn range_duration(&self) -> Duration {
        self.range_interval * self.range_samples
    }
}

/// Resting position measured by the center phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickCenter {
    pub x: i32,
    pub y: i32,
}

/// Drives a backend through the center and range phases.
///
/// The phases are separate calls so the caller can prompt the user in
/// between. Normal polling must not run concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calibrator {
    plan: CalibrationPlan,
}

impl Calibrator {
    #[must_use]
    pub const fn new(plan: CalibrationPlan) -> Self {
        Self { plan }
    }

    #[must_use]
    pub const fn plan(&self) -> &CalibrationPlan {
        &self.plan
    }

    /// Average the stick position while it is expected to be at rest.
    pub fn measure_center<B, C>(
        &self,
        backend: &mut B,
        config: &BridgeConfig,
        clock: &mut C,
        stick: Stick,
    ) -> Result<StickCenter, CalibrationError>
    where
        B: CaptureBackend + ?Sized,
        C: Clock,
    {
        let (mut sum_x, mut sum_y, mut count) = (0i64, 0i64, 0i64);
        for _ in 0..self.plan.center_samples {
            if let Some(position) = sample(backend, config, stick) {
                sum_x += i64::from(position.x);
                sum_y += i64::from(position.y);
                count += 1;
            }
            clock.sleep(self.plan.center_interval);
        }

        if count == 0 {
            return Err(CalibrationError::NoController(stick));
        }
        let center = StickCenter {
            x: (sum_x / count) as i32,
            y: (sum_y / count) as i32,
        };
        debug!("{stick:?} stick center {center:?} from {count} samples");
        Ok(center)
    }

    /// Track the extremes reached while the user sweeps the stick.
    ///
    /// Minimum and maximum start at the measured center, so an axis that
    /// never moves ends up with a zero-width range.
    pub fn measure_range<B, C>(
        &self,
        backend: &mut B,
        config: &BridgeConfig,
        clock: &mut C,
        stick: Stick,
        center: StickCenter,
    ) -> StickCalibration
    where
        B: CaptureBackend + ?Sized,
        C: Clock,
    {
        let mut x = AxisCalibration::new(center.x, center.x, center.x);
        let mut y = AxisCalibration::new(center.y, center.y, center.y);

        for _ in 0..self.plan.range_samples {
            if let Some(position) = sample(backend, config, stick) {
                let (px, py) = (i32::from(position.x), i32::from(position.y));
                x.min = x.min.min(px);
                x.max = x.max.max(px);
                y.min = y.min.min(py);
                y.max = y.max.max(py);
            }
            clock.sleep(self.plan.range_interval);
        }

        info!(
            "{stick:?} stick calibrated: x {}..{}..{}, y {}..{}..{}",
            x.min, x.center, x.max, y.min, y.center, y.max
        );
        StickCalibration {
            calibrated: true,
            x,
            y,
        }
    }
}

fn sample<B: CaptureBackend + ?Sized>(
    backend: &mut B,
    config: &BridgeConfig,
    stick: Stick,
) -> Option<StickPosition> {
    let mut scratch = ControllerState::neutral();
    backend.poll(&mut scratch, config);
    let raw = backend.latest_raw_sample()?;
    Some(match stick {
        Stick::Left => raw.left,
        Stick::Right => raw.right,
    })
}
