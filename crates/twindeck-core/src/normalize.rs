//! Value normalization for console controls
//!
//! Every numeric control on the console has a fixed range:
//! - Volume, microphone gain: 0.0 to 1.0
//! - Pan, microphone pan: -1.0 to 1.0 (bipolar)
//! - Frequency: 10 to 100000
//! - Master volume: 0 to 100
//!
//! Setters never reject input. Anything out of range is clamped here, and
//! NaN falls back to the range's neutral value so no control can ever hold a
//! value outside its range.

use crate::types::{CROSSFADER_RANGE, DEFAULT_FREQUENCY, MAX_FREQUENCY, MAX_MASTER_VOLUME, MIN_FREQUENCY};

/// Predefined control value ranges
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlRange {
    /// Unit range: 0.0 to 1.0 (volume, gain)
    Unit,
    /// Bipolar range: -1.0 to 1.0 (pan)
    Bipolar,
    /// Playback rate range
    Frequency,
    /// Master volume percentage: 0 to 100
    Master,
    /// Custom range
    Custom { min: f32, max: f32 },
}

impl ControlRange {
    /// Get min value for this range
    pub fn min(&self) -> f32 {
        match self {
            Self::Unit => 0.0,
            Self::Bipolar => -1.0,
            Self::Frequency => MIN_FREQUENCY,
            Self::Master => 0.0,
            Self::Custom { min, .. } => *min,
        }
    }

    /// Get max value for this range
    pub fn max(&self) -> f32 {
        match self {
            Self::Unit => 1.0,
            Self::Bipolar => 1.0,
            Self::Frequency => MAX_FREQUENCY,
            Self::Master => MAX_MASTER_VOLUME,
            Self::Custom { max, .. } => *max,
        }
    }

    /// Value substituted for NaN input
    pub fn neutral(&self) -> f32 {
        match self {
            Self::Unit => 0.0,
            Self::Bipolar => 0.0,
            Self::Frequency => DEFAULT_FREQUENCY,
            Self::Master => 0.0,
            Self::Custom { min, .. } => *min,
        }
    }

    /// Clamp a value into this range
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.neutral();
        }
        value.clamp(self.min(), self.max())
    }
}

/// Clamp a crossfader position to [-100, 100]
#[inline]
pub fn clamp_crossfader(value: i32) -> i32 {
    value.clamp(-CROSSFADER_RANGE, CROSSFADER_RANGE)
}

/// Clamp a seek target to [0, length - 1]
///
/// Never lands exactly on `length`, which would be end-of-stream. An empty
/// source clamps to 0.
#[inline]
pub fn clamp_position(target: i64, length: u64) -> u64 {
    if target <= 0 || length == 0 {
        return 0;
    }
    (target as u64).min(length - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_clamp() {
        assert_eq!(ControlRange::Unit.clamp(1.5), 1.0);
        assert_eq!(ControlRange::Unit.clamp(-0.2), 0.0);
        assert_eq!(ControlRange::Unit.clamp(0.3), 0.3);
    }

    #[test]
    fn test_bipolar_clamp() {
        assert_eq!(ControlRange::Bipolar.clamp(-3.0), -1.0);
        assert_eq!(ControlRange::Bipolar.clamp(2.0), 1.0);
    }

    #[test]
    fn test_frequency_clamp() {
        assert_eq!(ControlRange::Frequency.clamp(5.0), 10.0);
        assert_eq!(ControlRange::Frequency.clamp(250000.0), 100000.0);
        assert_eq!(ControlRange::Frequency.clamp(48000.0), 48000.0);
    }

    #[test]
    fn test_nan_maps_to_neutral() {
        assert_eq!(ControlRange::Unit.clamp(f32::NAN), 0.0);
        assert_eq!(ControlRange::Bipolar.clamp(f32::NAN), 0.0);
        assert_eq!(ControlRange::Frequency.clamp(f32::NAN), DEFAULT_FREQUENCY);
    }

    #[test]
    fn test_infinities_clamp() {
        assert_eq!(ControlRange::Master.clamp(f32::INFINITY), 100.0);
        assert_eq!(ControlRange::Master.clamp(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_crossfader_clamp() {
        assert_eq!(clamp_crossfader(150), 100);
        assert_eq!(clamp_crossfader(-101), -100);
        assert_eq!(clamp_crossfader(7), 7);
    }

    #[test]
    fn test_position_clamp() {
        assert_eq!(clamp_position(-500, 1000), 0);
        assert_eq!(clamp_position(2000, 1000), 999);
        assert_eq!(clamp_position(1000, 1000), 999);
        assert_eq!(clamp_position(10, 0), 0);
        assert_eq!(clamp_position(500, 1000), 500);
    }
}
