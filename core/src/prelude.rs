use serde::{Deserialize, Serialize};

use crate::track::SanityCode;

/// Bounds used by the track sanity check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityLimits {
    /// Ceiling on the mean sample interval, seconds.
    pub max_mean_dt: f64,
    /// Floor on the mean sample interval, seconds.
    pub min_mean_dt: f64,
    /// Minimum max-min span of the altitude channel in use, meters.
    pub min_altitude_span: i32,
}

impl Default for SanityLimits {
    fn default() -> Self {
        Self {
            max_mean_dt: 6.0,
            min_mean_dt: 0.001,
            min_altitude_span: 10,
        }
    }
}

/// Shared configuration for every analysis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub frame_len_sec: f64,
    pub max_turn_deg_per_sec: f64,
    pub min_speed_kmh: f64,
    pub min_duration_sec: f64,
    pub max_glide_ratio: f64,
    pub min_glide_ratio: f64,
    pub sanity: SanityLimits,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_len_sec: 20.0,
            max_turn_deg_per_sec: 10.0,
            min_speed_kmh: 25.0,
            min_duration_sec: 20.0,
            max_glide_ratio: 15.0,
            min_glide_ratio: 2.0,
            sanity: SanityLimits::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> AnalysisResult<()> {
        if !(self.frame_len_sec > 0.0 && self.frame_len_sec.is_finite()) {
            return Err(AnalysisError::invalid_config(
                "frame_len_sec must be positive and finite",
            ));
        }
        if !(self.min_duration_sec >= 0.0 && self.min_duration_sec.is_finite()) {
            return Err(AnalysisError::invalid_config(
                "min_duration_sec must be finite and not negative",
            ));
        }
        if !(self.min_glide_ratio > 0.0) || !(self.max_glide_ratio > 0.0) {
            return Err(AnalysisError::invalid_config("glide ratios must be positive"));
        }
        if self.min_glide_ratio >= self.max_glide_ratio {
            return Err(AnalysisError::invalid_config(format!(
                "min_glide_ratio {} must be below max_glide_ratio {}",
                self.min_glide_ratio, self.max_glide_ratio
            )));
        }
        // Sample counts are derived by dividing by the mean interval.
        if !(self.sanity.min_mean_dt > 0.0) {
            return Err(AnalysisError::invalid_config(
                "sanity min_mean_dt must be positive",
            ));
        }
        if !(self.sanity.min_mean_dt < self.sanity.max_mean_dt) {
            return Err(AnalysisError::invalid_config(
                "sanity min_mean_dt must be below max_mean_dt",
            ));
        }
        Ok(())
    }
}

/// Failure to decode a flight-recorder file. Lines are 1-based.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: fix record truncated ({len} bytes, need {min})")]
    TruncatedRecord { line: usize, len: usize, min: usize },
    #[error("line {line}: malformed record: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("line {line}: fix record before any date header")]
    MissingDate { line: usize },
    #[error("line {line}: invalid date header: {reason}")]
    InvalidDate { line: usize, reason: String },
    #[error("track holds {count} fixes, need at least 2")]
    TooFewSamples { count: usize },
}

impl ParseError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

/// Common error type for track analysis.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("track failed sanity checks (baro: {}, gnss: {})", .baro.code(), .gnss.code())]
    Sanity { baro: SanityCode, gnss: SanityCode },
    #[error("no sample survived glide classification")]
    EmptyMask,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// A pipeline stage turning one immutable value into the next.
pub trait ProcessingStage<'a> {
    type Input;
    type Output;

    fn name(&self) -> &'static str;
    fn execute(&self, input: Self::Input) -> AnalysisResult<Self::Output>;
}
