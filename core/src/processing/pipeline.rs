use crate::interface::{GlideRecord, SeriesReport};
use crate::prelude::{AnalysisConfig, AnalysisError, AnalysisResult, ProcessingStage};
use crate::processing::classifier::{GlideMask, GlideThresholds, SegmentClassifier};
use crate::processing::estimator::{
    masked_angles, ratio_histogram, GlideEstimate, RatioEstimator, HISTOGRAM_BINS,
    HISTOGRAM_RANGE,
};
use crate::processing::kinematics::{Kinematics, KinematicsStage};
use crate::processing::smoothing::{SmoothedSeries, SmoothingStage};
use crate::telemetry::StageLogger;
use crate::track::sanity::check_source;
use crate::track::{parse_track, AltitudeSource, Track};

/// Everything derived from one track. Read-only once built.
#[derive(Debug, Clone)]
pub struct TrackAnalysis {
    pub source: AltitudeSource,
    pub mean_time_delta: f64,
    pub frame_len_samples: usize,
    pub min_run_samples: usize,
    pub kinematics: Kinematics,
    pub smoothed: SmoothedSeries,
    pub mask: GlideMask,
}

impl TrackAnalysis {
    pub fn estimate(&self) -> AnalysisResult<GlideEstimate> {
        RatioEstimator.execute((&self.smoothed, &self.mask))
    }

    pub fn glide_ratio(&self) -> AnalysisResult<f64> {
        self.estimate().map(|estimate| estimate.glide_ratio)
    }

    pub fn masked_angles(&self) -> Vec<f64> {
        masked_angles(&self.smoothed, &self.mask)
    }

    pub fn to_record(&self) -> GlideRecord {
        GlideRecord::new(self.masked_angles(), self.mean_time_delta)
    }

    pub fn ratio_histogram(&self) -> Vec<usize> {
        let (lo, hi) = HISTOGRAM_RANGE;
        ratio_histogram(&self.masked_angles(), HISTOGRAM_BINS, lo, hi)
    }

    pub fn series_report(&self) -> SeriesReport {
        SeriesReport {
            timestamps: self.kinematics.timestamps.clone(),
            headings: self.kinematics.headings.clone(),
            turn_speeds: self.smoothed.turn_rates.clone(),
            straight_line_speeds: self.smoothed.straight_line_speeds.clone(),
            glide_angles: self.smoothed.glide_angles.clone(),
            raw_mask: self.mask.raw.iter().map(|&on| on as u8).collect(),
            glide_mask: self.mask.as_bits(),
            cumulative_distance: self.kinematics.cumulative_distance.clone(),
        }
    }
}

/// Runs the full chain on one track: channel selection, kinematics,
/// smoothing, classification.
#[derive(Debug, Clone)]
pub struct TrackAnalyser {
    config: AnalysisConfig,
}

impl TrackAnalyser {
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyse_text(&self, text: &str) -> AnalysisResult<TrackAnalysis> {
        let track = parse_track(text)?;
        self.analyse(&track)
    }

    /// Barometric altitude first, GNSS when the baro channel is not sane.
    pub fn select_source(&self, track: &Track) -> AnalysisResult<AltitudeSource> {
        let limits = &self.config.sanity;
        let baro = check_source(track, AltitudeSource::Barometric, limits);
        if baro.is_sane() {
            return Ok(AltitudeSource::Barometric);
        }
        let gnss = check_source(track, AltitudeSource::Gnss, limits);
        if gnss.is_sane() {
            StageLogger::new("analyser").notice(&format!(
                "baro channel rejected (code {}), using GNSS altitude",
                baro.code()
            ));
            return Ok(AltitudeSource::Gnss);
        }
        Err(AnalysisError::Sanity { baro, gnss })
    }

    pub fn analyse(&self, track: &Track) -> AnalysisResult<TrackAnalysis> {
        let source = self.select_source(track)?;
        self.analyse_with_source(track, source)
    }

    /// Skips the sanity gate; the caller vouches for the track.
    pub fn analyse_with_source(
        &self,
        track: &Track,
        source: AltitudeSource,
    ) -> AnalysisResult<TrackAnalysis> {
        let kinematics = KinematicsStage::new(source).execute(track)?;
        let smoothing = SmoothingStage::for_track(track, self.config.frame_len_sec);
        let smoothed = smoothing.execute((track, &kinematics))?;
        let classifier = SegmentClassifier::new(
            GlideThresholds::from_config(&self.config),
            track.samples_for(self.config.min_duration_sec),
        );
        let mask = classifier.execute(&smoothed)?;

        Ok(TrackAnalysis {
            source,
            mean_time_delta: track.mean_time_delta(),
            frame_len_samples: smoothing.frame_len(),
            min_run_samples: classifier.min_run_samples(),
            kinematics,
            smoothed,
            mask,
        })
    }
}
