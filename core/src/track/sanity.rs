use serde::{Deserialize, Serialize};

use crate::prelude::SanityLimits;
use crate::track::sample::{AltitudeSource, Track};

/// Outcome of [`check_sanity`]. The numeric codes are stable and end up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SanityCode {
    Sane,
    /// Mean sample interval outside the configured bounds.
    SamplingOutOfRange,
    /// Some timestamp is earlier than its predecessor.
    TimeReversal,
    /// Altitude channel spans less than the configured minimum.
    FlatAltitude,
}

impl SanityCode {
    pub fn code(self) -> u8 {
        match self {
            SanityCode::Sane => 0,
            SanityCode::SamplingOutOfRange => 1,
            SanityCode::TimeReversal => 2,
            SanityCode::FlatAltitude => 3,
        }
    }

    pub fn is_sane(self) -> bool {
        self == SanityCode::Sane
    }
}

pub fn check_sanity(track: &Track, use_baro: bool, limits: &SanityLimits) -> SanityCode {
    check_source(track, AltitudeSource::from_baro_flag(use_baro), limits)
}

pub(crate) fn check_source(
    track: &Track,
    source: AltitudeSource,
    limits: &SanityLimits,
) -> SanityCode {
    let mean_dt = track.mean_time_delta();
    if mean_dt > limits.max_mean_dt || mean_dt < limits.min_mean_dt {
        return SanityCode::SamplingOutOfRange;
    }

    if track
        .samples()
        .windows(2)
        .any(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        return SanityCode::TimeReversal;
    }

    let (lo, hi) = track
        .altitudes(source)
        .fold((i32::MAX, i32::MIN), |(lo, hi), alt| (lo.min(alt), hi.max(alt)));
    if (hi as i64 - lo as i64) < limits.min_altitude_span as i64 {
        return SanityCode::FlatAltitude;
    }

    SanityCode::Sane
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Sample;

    fn descending(timestamps: &[i64]) -> Track {
        Track::new(
            timestamps
                .iter()
                .enumerate()
                .map(|(i, &t)| {
                    let alt = 1500 - 3 * i as i32;
                    Sample::new(t, 45.0 + i as f64 * 1e-4, 6.0, alt + 20, alt)
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn well_formed_track_is_sane() {
        let track = descending(&(0..30).collect::<Vec<_>>());
        assert_eq!(check_sanity(&track, true, &SanityLimits::default()), SanityCode::Sane);
    }

    #[test]
    fn sparse_sampling_is_code_one() {
        let track = descending(&(0..30).map(|i| i * 10).collect::<Vec<_>>());
        let code = check_sanity(&track, true, &SanityLimits::default());
        assert_eq!(code, SanityCode::SamplingOutOfRange);
        assert_eq!(code.code(), 1);
    }

    #[test]
    fn frozen_clock_is_code_one() {
        let track = descending(&[5; 12]);
        assert_eq!(
            check_sanity(&track, true, &SanityLimits::default()),
            SanityCode::SamplingOutOfRange
        );
    }

    #[test]
    fn backwards_timestamp_is_code_two() {
        let mut stamps: Vec<i64> = (0..30).collect();
        stamps[10] = 8;
        let code = check_sanity(&descending(&stamps), true, &SanityLimits::default());
        assert_eq!(code.code(), 2);
    }

    #[test]
    fn constant_altitude_is_code_three() {
        let track = Track::new(
            (0..30)
                .map(|i| Sample::new(i, 45.0, 6.0 + i as f64 * 1e-4, 800, 800))
                .collect(),
        )
        .unwrap();
        let code = check_sanity(&track, true, &SanityLimits::default());
        assert_eq!(code, SanityCode::FlatAltitude);
        assert_eq!(code.code(), 3);
    }

    #[test]
    fn channel_flag_selects_altitude() {
        let track = Track::new(
            (0..30)
                .map(|i| Sample::new(i, 45.0, 6.0, 900 - 2 * i as i32, 800))
                .collect(),
        )
        .unwrap();
        let limits = SanityLimits::default();
        assert_eq!(check_sanity(&track, true, &limits), SanityCode::FlatAltitude);
        assert_eq!(check_sanity(&track, false, &limits), SanityCode::Sane);
    }
}
