//! Analog axis normalization shared by every capture backend.
//!
//! Raw axes are signed 16-bit with positive X to the right and positive
//! Y physically up. The wire format wants 0-255 with Y growing downward,
//! so vertical axes are inverted after scaling.

use switch_proto::{StickPosition, STICK_CENTER};

use crate::calibration::{calibrate, Axis, StickCalibration};

/// Full-scale magnitude of a raw axis.
pub const AXIS_FULL_SCALE: i32 = 32767;

/// Whether an axis is horizontal or vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Horizontal,
    Vertical,
}

impl From<Axis> for AxisKind {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::Horizontal,
            Axis::Y => Self::Vertical,
        }
    }
}

/// Raw magnitude below which an axis reads as centered.
///
/// `percent` is clamped to 100. 10 % gives 3277.
#[inline]
#[must_use]
pub fn deadzone_threshold(percent: u8) -> i32 {
    (i32::from(percent.min(100)) * AXIS_FULL_SCALE + 50) / 100
}

/// Scale a raw axis to 0-255, inverting vertical axes.
#[inline]
#[must_use]
pub fn normalize(raw: i16, kind: AxisKind) -> u8 {
    // (raw + 32768) >> 8 is always within 0..=255.
    let scaled = ((i32::from(raw) + 32768) >> 8) as u8;
    match kind {
        AxisKind::Horizontal => scaled,
        AxisKind::Vertical => 255 - scaled,
    }
}

/// Whether `raw` lies strictly inside the deadzone.
///
/// The boundary itself is outside: with a threshold of 3277, a raw
/// value of exactly ±3277 is reported as movement.
#[inline]
#[must_use]
pub fn in_deadzone(raw: i16, threshold: i32) -> bool {
    i32::from(raw).abs() < threshold
}

/// Full per-axis pipeline: deadzone, normalization, calibration.
///
/// Inside the deadzone the result is the true center (128) for both
/// axes, calibrated or not.
#[must_use]
pub fn resolve_axis(raw: i16, axis: Axis, threshold: i32, calibration: &StickCalibration) -> u8 {
    if in_deadzone(raw, threshold) {
        return STICK_CENTER;
    }
    let normalized = normalize(raw, axis.into());
    calibrate(i32::from(normalized), calibration, axis)
}

/// Canonical raw stick reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawStick {
    pub x: i16,
    /// Positive is physically up.
    pub y: i16,
}

impl RawStick {
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Build from an API whose Y axis grows downward.
    #[must_use]
    pub const fn from_y_down(x: i16, y_down: i16) -> Self {
        Self {
            x,
            y: y_down.saturating_neg(),
        }
    }

    /// Normalized position ignoring deadzone and calibration, as fed to
    /// the calibration engine.
    #[must_use]
    pub fn normalized(self) -> StickPosition {
        StickPosition::new(
            normalize(self.x, AxisKind::Horizontal),
            normalize(self.y, AxisKind::Vertical),
        )
    }

    /// Position after deadzone and calibration.
    #[must_use]
    pub fn resolve(self, threshold: i32, calibration: &StickCalibration) -> StickPosition {
        StickPosition::new(
            resolve_axis(self.x, Axis::X, threshold, calibration),
            resolve_axis(self.y, Axis::Y, threshold, calibration),
        )
    }
}

/// Convert a floating point axis in [-1, 1] (positive up/right) to raw.
#[must_use]
pub fn raw_from_unit(value: f32) -> i16 {
    let clamped = value.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0).round().max(-32768.0) as i16
    } else {
        (clamped * 32767.0).round() as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::AxisCalibration;

    #[test]
    fn test_deadzone_threshold_rounding() {
        assert_eq!(deadzone_threshold(0), 0);
        assert_eq!(deadzone_threshold(10), 3277);
        assert_eq!(deadzone_threshold(100), 32767);
        assert_eq!(deadzone_threshold(250), 32767);
    }

    #[test]
    fn test_normalize_extremes() {
        assert_eq!(normalize(i16::MIN, AxisKind::Horizontal), 0);
        assert_eq!(normalize(i16::MAX, AxisKind::Horizontal), 255);
        assert_eq!(normalize(0, AxisKind::Horizontal), 128);
        // Up is positive raw and must land near 0.
        assert_eq!(normalize(i16::MAX, AxisKind::Vertical), 0);
        assert_eq!(normalize(i16::MIN, AxisKind::Vertical), 255);
    }

    #[test]
    fn test_deadzone_boundary_is_exclusive() {
        let threshold = deadzone_threshold(10);
        let uncalibrated = StickCalibration::default();

        assert_eq!(resolve_axis(3276, Axis::X, threshold, &uncalibrated), 128);
        assert_eq!(resolve_axis(-3276, Axis::Y, threshold, &uncalibrated), 128);
        assert_eq!(resolve_axis(3277, Axis::X, threshold, &uncalibrated), 140);
        assert_eq!(resolve_axis(-3277, Axis::X, threshold, &uncalibrated), 115);
    }

    #[test]
    fn test_deadzone_centers_vertical_axis_exactly() {
        let uncalibrated = StickCalibration::default();
        assert_eq!(normalize(0, AxisKind::Vertical), 127);
        assert_eq!(resolve_axis(0, Axis::Y, deadzone_threshold(10), &uncalibrated), 128);
    }

    #[test]
    fn test_resolve_applies_calibration_outside_deadzone() {
        let calibration = StickCalibration {
            x: AxisCalibration::new(50, 150, 220),
            y: AxisCalibration::new(50, 150, 220),
            calibrated: true,
        };
        let stick = RawStick::new(i16::MAX, 0).resolve(deadzone_threshold(10), &calibration);
        assert_eq!(stick.x, 255);
        assert_eq!(stick.y, 128);
    }

    #[test]
    fn test_from_y_down_flips_sign() {
        assert_eq!(RawStick::from_y_down(5, -32768), RawStick::new(5, 32767));
        assert_eq!(RawStick::from_y_down(0, 1000).normalized().y, 255 - 124);
    }

    #[test]
    fn test_raw_from_unit() {
        assert_eq!(raw_from_unit(0.0), 0);
        assert_eq!(raw_from_unit(1.0), 32767);
        assert_eq!(raw_from_unit(-1.0), -32768);
        assert_eq!(raw_from_unit(7.5), 32767);
    }
}
