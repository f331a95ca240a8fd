use serde::{Deserialize, Serialize};

use crate::interface::{GlideRecord, WingSummary};
use crate::math::stats::{angle_to_ratio, StatsHelper};
use crate::prelude::{AnalysisError, AnalysisResult, ProcessingStage};
use crate::processing::classifier::GlideMask;
use crate::processing::smoothing::SmoothedSeries;
use crate::telemetry::StageLogger;

/// Single-track glide estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlideEstimate {
    pub mean_angle: f64,
    pub glide_ratio: f64,
    pub sample_count: usize,
}

/// Smoothed glide angles of the steps the mask keeps.
pub fn masked_angles(series: &SmoothedSeries, mask: &GlideMask) -> Vec<f64> {
    series
        .glide_angles
        .iter()
        .zip(&mask.filtered)
        .filter_map(|(&angle, &on)| on.then_some(angle))
        .collect()
}

pub struct RatioEstimator;

impl<'a> ProcessingStage<'a> for RatioEstimator {
    type Input = (&'a SmoothedSeries, &'a GlideMask);
    type Output = GlideEstimate;

    fn name(&self) -> &'static str {
        "estimator"
    }

    /// Mean of the masked angles, converted once into a ratio.
    fn execute(&self, (series, mask): Self::Input) -> AnalysisResult<GlideEstimate> {
        let angles = masked_angles(series, mask);
        let mean_angle = StatsHelper::mean(&angles).ok_or(AnalysisError::EmptyMask)?;
        let estimate = GlideEstimate {
            mean_angle,
            glide_ratio: angle_to_ratio(mean_angle),
            sample_count: angles.len(),
        };
        StageLogger::for_stage(self).record(&format!(
            "ratio {:.2} from {} samples",
            estimate.glide_ratio, estimate.sample_count
        ));
        Ok(estimate)
    }
}

/// Sampling-weighted moments of glide angles across the flights of one wing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WingAccumulator {
    weighted_sum: f64,
    weighted_sum_sq: f64,
    weight: f64,
    sample_count: usize,
    flight_count: usize,
}

impl WingAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every angle of `record`, weighted by its sampling interval.
    /// Records with an unusable sampling or no angles are ignored.
    pub fn add_record(&mut self, record: &GlideRecord) -> bool {
        let w = record.sampling;
        if !w.is_finite() || w <= 0.0 || record.is_empty() {
            return false;
        }
        for &angle in record.glide_angles.iter().filter(|a| a.is_finite()) {
            self.weighted_sum += angle * w;
            self.weighted_sum_sq += angle * angle * w;
            self.weight += w;
            self.sample_count += 1;
        }
        self.flight_count += 1;
        true
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// `None` until at least one weighted sample was added.
    pub fn summary(&self) -> Option<WingSummary> {
        if self.weight <= 0.0 || self.sample_count == 0 {
            return None;
        }
        let mean_angle = self.weighted_sum / self.weight;
        let variance = (self.weighted_sum_sq / self.weight - mean_angle * mean_angle).max(0.0);
        let std_dev = variance.sqrt();
        let confidence = 2.0 * std_dev / (self.sample_count as f64).sqrt();

        let glide_ratio = angle_to_ratio(mean_angle);
        Some(WingSummary {
            mean_angle,
            std_dev,
            confidence,
            sample_count: self.sample_count,
            flight_count: self.flight_count,
            glide_ratio,
            ratio_upper_error: (angle_to_ratio(mean_angle + confidence) - glide_ratio).max(0.0),
            ratio_lower_error: (glide_ratio - angle_to_ratio(mean_angle - confidence)).max(0.0),
        })
    }
}

pub const HISTOGRAM_BINS: usize = 50;
pub const HISTOGRAM_RANGE: (f64, f64) = (-15.0, 15.0);

/// Histogram of per-sample glide ratios of masked angles.
pub fn ratio_histogram(angles: &[f64], bins: usize, lo: f64, hi: f64) -> Vec<usize> {
    StatsHelper::histogram(angles.iter().map(|&a| angle_to_ratio(a)), bins, lo, hi)
}
