use serde::{Deserialize, Serialize};

use crate::prelude::ParseError;

/// One recorded fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// UTC seconds since the Unix epoch.
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_gnss: i32,
    pub altitude_baro: i32,
}

impl Sample {
    pub fn new(
        timestamp: i64,
        latitude: f64,
        longitude: f64,
        altitude_gnss: i32,
        altitude_baro: i32,
    ) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            altitude_gnss,
            altitude_baro,
        }
    }

    pub fn altitude(&self, source: AltitudeSource) -> i32 {
        match source {
            AltitudeSource::Barometric => self.altitude_baro,
            AltitudeSource::Gnss => self.altitude_gnss,
        }
    }
}

/// Altitude channel feeding vertical deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltitudeSource {
    Barometric,
    Gnss,
}

impl AltitudeSource {
    pub fn from_baro_flag(use_baro: bool) -> Self {
        if use_baro {
            AltitudeSource::Barometric
        } else {
            AltitudeSource::Gnss
        }
    }
}

/// Ordered fixes of a single flight, in recording order.
///
/// The mean sampling interval is computed here, once, and every later
/// frame-length conversion reads it back through [`Track::mean_time_delta`].
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    samples: Vec<Sample>,
    mean_time_delta: f64,
}

impl Track {
    pub fn new(samples: Vec<Sample>) -> Result<Self, ParseError> {
        if samples.len() < 2 {
            return Err(ParseError::TooFewSamples {
                count: samples.len(),
            });
        }
        let first = samples[0].timestamp;
        let last = samples[samples.len() - 1].timestamp;
        // Mean of consecutive gaps telescopes to the end-to-end span.
        let mean_time_delta = (last - first) as f64 / (samples.len() - 1) as f64;
        Ok(Self {
            samples,
            mean_time_delta,
        })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean_time_delta(&self) -> f64 {
        self.mean_time_delta
    }

    pub fn altitudes(&self, source: AltitudeSource) -> impl Iterator<Item = i32> + '_ {
        self.samples.iter().map(move |s| s.altitude(source))
    }

    /// Converts a duration into a sample count using the track's sampling.
    pub fn samples_for(&self, seconds: f64) -> usize {
        // Saturating cast: NaN maps to 0, +inf to usize::MAX.
        (seconds / self.mean_time_delta).round_ties_even() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(timestamps: &[i64]) -> Track {
        Track::new(
            timestamps
                .iter()
                .map(|&t| Sample::new(t, 45.0, 6.0, 1000, 1000))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn single_fix_is_rejected() {
        let err = Track::new(vec![Sample::new(0, 0.0, 0.0, 0, 0)]).unwrap_err();
        assert_eq!(err, ParseError::TooFewSamples { count: 1 });
    }

    #[test]
    fn mean_time_delta_averages_gaps() {
        assert_eq!(track(&[0, 1, 3, 6]).mean_time_delta(), 2.0);
    }

    #[test]
    fn samples_for_rounds_half_to_even() {
        let t = track(&[0, 4]);
        assert_eq!(t.samples_for(10.0), 2);
        assert_eq!(t.samples_for(14.0), 4);
        assert_eq!(t.samples_for(20.0), 5);
    }

    #[test]
    fn altitude_source_selects_channel() {
        let sample = Sample::new(0, 0.0, 0.0, 120, 80);
        assert_eq!(sample.altitude(AltitudeSource::from_baro_flag(true)), 80);
        assert_eq!(sample.altitude(AltitudeSource::from_baro_flag(false)), 120);
    }
}
