use super::control_point::*;
use crate::error::*;

use derive_more::{Deref, Display};
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of equal subdivisions of a beat. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, Display)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BeatDivisor(u32);

impl BeatDivisor {
    /// The divisors an editor offers; all of them divide 48.
    pub const COMMON: [u32; 8] = [1, 2, 3, 4, 6, 8, 12, 16];

    pub fn new(divisor: u32) -> Result<Self> {
        (1 <= divisor)
            .then_some(Self(divisor))
            .ok_or(EngineError::InvalidDivisor(divisor))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for BeatDivisor {
    fn default() -> Self {
        Self(4)
    }
}

impl TryFrom<u32> for BeatDivisor {
    type Error = EngineError;

    fn try_from(divisor: u32) -> Result<Self> {
        Self::new(divisor)
    }
}

impl From<BeatDivisor> for u32 {
    fn from(divisor: BeatDivisor) -> Self {
        divisor.0
    }
}

pub fn beat_snap_length(point: &TimingPoint, divisor: BeatDivisor) -> f64 {
    point.beat_length() / divisor.get() as f64
}

/// Nearest subdivision of `point`'s grid to `time`.
///
/// Beat counts round half away from zero, so times before the point round
/// the same way as times after it. The result never reaches past `next`, the
/// start of the following timing section: a time that would round onto the
/// other side snaps to that section's start instead.
pub fn snap_to(point: &TimingPoint, next: Option<R64>, time: R64, divisor: BeatDivisor) -> R64 {
    let length = beat_snap_length(point, divisor);
    let beats = ((time - point.time()).raw() / length).round();
    let snapped = r64(point.time().raw() + beats * length);

    match next {
        Some(next) if next <= snapped => next,
        _ => snapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn point() -> TimingPoint {
        TimingPoint::new(r64(1000.), 500., 4).unwrap()
    }

    #[test_case(1000., 1, 1000.; "on the point")]
    #[test_case(1240., 1, 1000.; "below half rounds down")]
    #[test_case(1250., 1, 1500.; "half rounds away from zero")]
    #[test_case(750., 1, 500.; "negative half rounds away from zero")]
    #[test_case(760., 1, 1000.; "negative below half rounds toward point")]
    #[test_case(1130., 4, 1125.; "quarter grid")]
    #[test_case(1090., 3, 1000. + 500. / 3.; "third grid")]
    fn snapping(time: f64, divisor: u32, expected: f64) {
        let snapped = snap_to(&point(), None, r64(time), BeatDivisor::new(divisor).unwrap());
        assert!((snapped.raw() - expected).abs() < 1e-9, "{snapped} != {expected}");
    }

    #[test]
    fn snapping_never_crosses_next_section() {
        let divisor = BeatDivisor::new(1).unwrap();
        assert_eq!(snap_to(&point(), Some(r64(1400.)), r64(1300.), divisor), r64(1400.));
        assert_eq!(snap_to(&point(), Some(r64(1400.)), r64(1200.), divisor), r64(1000.));
    }

    #[test]
    fn zero_divisor_is_rejected() {
        assert!(matches!(BeatDivisor::new(0), Err(EngineError::InvalidDivisor(0))));
        assert_eq!(BeatDivisor::default().get(), 4);
        assert!(BeatDivisor::COMMON.iter().all(|divisor| 48 % divisor == 0));
    }
}
