use crate::math::stats::ratio_to_angle;
use crate::prelude::{AnalysisConfig, AnalysisResult, ProcessingStage};
use crate::processing::smoothing::SmoothedSeries;
use crate::telemetry::StageLogger;

/// Raw and run-length filtered classification of each step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlideMask {
    pub raw: Vec<bool>,
    pub filtered: Vec<bool>,
}

impl GlideMask {
    pub fn count(&self) -> usize {
        self.filtered.iter().filter(|&&on| on).count()
    }

    pub fn as_bits(&self) -> Vec<u8> {
        self.filtered.iter().map(|&on| on as u8).collect()
    }
}

/// Steady-glide thresholds in the units the series use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlideThresholds {
    pub max_turn_deg_per_sec: f64,
    pub min_speed_mps: f64,
    /// Shallowest accepted smoothed angle (from the max glide ratio).
    pub max_angle_deg: f64,
    /// Steepest accepted smoothed angle (from the min glide ratio).
    pub min_angle_deg: f64,
}

impl GlideThresholds {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_turn_deg_per_sec: config.max_turn_deg_per_sec,
            min_speed_mps: config.min_speed_kmh / 3.6,
            max_angle_deg: ratio_to_angle(config.max_glide_ratio),
            min_angle_deg: ratio_to_angle(config.min_glide_ratio),
        }
    }

    pub fn accepts(&self, turn_rate: f64, speed: f64, glide_angle: f64) -> bool {
        turn_rate.abs() < self.max_turn_deg_per_sec
            && speed > self.min_speed_mps
            && glide_angle < self.max_angle_deg
            && glide_angle > self.min_angle_deg
    }
}

pub struct SegmentClassifier {
    thresholds: GlideThresholds,
    min_run_samples: usize,
}

impl SegmentClassifier {
    pub fn new(thresholds: GlideThresholds, min_run_samples: usize) -> Self {
        Self {
            thresholds,
            min_run_samples,
        }
    }

    pub fn min_run_samples(&self) -> usize {
        self.min_run_samples
    }
}

impl<'a> ProcessingStage<'a> for SegmentClassifier {
    type Input = &'a SmoothedSeries;
    type Output = GlideMask;

    fn name(&self) -> &'static str {
        "classifier"
    }

    fn execute(&self, series: &'a SmoothedSeries) -> AnalysisResult<GlideMask> {
        let raw: Vec<bool> = series
            .turn_rates
            .iter()
            .zip(&series.straight_line_speeds)
            .zip(&series.glide_angles)
            .map(|((&turn, &speed), &angle)| self.thresholds.accepts(turn, speed, angle))
            .collect();
        let filtered = filter_short_runs(&raw, self.min_run_samples);

        let mask = GlideMask { raw, filtered };
        StageLogger::for_stage(self).record(&format!(
            "{} of {} steps kept (runs longer than {})",
            mask.count(),
            mask.filtered.len(),
            self.min_run_samples
        ));
        Ok(mask)
    }
}

/// Zeroes every run of `true` whose length is not strictly above `min_run`.
pub fn filter_short_runs(mask: &[bool], min_run: usize) -> Vec<bool> {
    let mut out = Vec::with_capacity(mask.len());
    let mut run_start: Option<usize> = None;
    for (i, &on) in mask.iter().enumerate() {
        match (on, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                close_run(&mut out, i - start, min_run);
                run_start = None;
                out.push(false);
            }
            (false, None) => out.push(false),
            (true, Some(_)) => {}
        }
    }
    if let Some(start) = run_start {
        close_run(&mut out, mask.len() - start, min_run);
    }
    out
}

fn close_run(out: &mut Vec<bool>, len: usize, min_run: usize) {
    out.extend(std::iter::repeat(len > min_run).take(len));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(values: &[u8]) -> Vec<bool> {
        values.iter().map(|&v| v == 1).collect()
    }

    #[test]
    fn short_leading_and_trailing_runs_are_dropped() {
        let filtered = filter_short_runs(&bits(&[1, 1, 0, 1, 1, 1, 1, 0, 1]), 3);
        assert_eq!(filtered, bits(&[0, 0, 0, 1, 1, 1, 1, 0, 0]));
    }

    #[test]
    fn run_equal_to_threshold_is_noise() {
        assert_eq!(filter_short_runs(&bits(&[0, 1, 1, 1, 0]), 3), bits(&[0; 5]));
        assert_eq!(
            filter_short_runs(&bits(&[0, 1, 1, 1, 1]), 3),
            bits(&[0, 1, 1, 1, 1])
        );
    }

    #[test]
    fn output_length_matches_input() {
        for mask in [vec![], bits(&[0]), bits(&[1]), bits(&[1, 0]), bits(&[0, 1, 1, 0, 0])] {
            assert_eq!(filter_short_runs(&mask, 0).len(), mask.len());
        }
        assert_eq!(filter_short_runs(&bits(&[1]), 0), bits(&[1]));
    }

    #[test]
    fn thresholds_bound_steepness_turn_and_speed() {
        let thresholds = GlideThresholds::from_config(&AnalysisConfig::default());
        let glide = ratio_to_angle(8.0);
        assert!(thresholds.accepts(0.0, 10.0, glide));
        assert!(thresholds.accepts(-9.9, 10.0, glide));
        assert!(!thresholds.accepts(-10.0, 10.0, glide));
        assert!(!thresholds.accepts(0.0, 25.0 / 3.6, glide));
        assert!(!thresholds.accepts(0.0, 10.0, ratio_to_angle(20.0)));
        assert!(!thresholds.accepts(0.0, 10.0, ratio_to_angle(1.5)));
        assert!(!thresholds.accepts(0.0, 10.0, 2.0));
    }

    #[test]
    fn classifier_combines_predicates_then_filters() {
        let glide = ratio_to_angle(8.0);
        let series = SmoothedSeries {
            frame_len: 2,
            glide_angles: vec![glide; 8],
            turn_rates: vec![0.0, 0.0, 30.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            straight_line_speeds: vec![10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 1.0, 10.0],
        };
        let classifier = SegmentClassifier::new(
            GlideThresholds::from_config(&AnalysisConfig::default()),
            2,
        );
        let mask = classifier.execute(&series).unwrap();
        assert_eq!(mask.raw, bits(&[1, 1, 0, 1, 1, 1, 0, 1]));
        assert_eq!(mask.filtered, bits(&[0, 0, 0, 1, 1, 1, 0, 0]));
        assert_eq!(mask.count(), 3);
        assert_eq!(mask.as_bits(), vec![0, 0, 0, 1, 1, 1, 0, 0]);
    }
}
