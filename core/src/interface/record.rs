use serde::{Deserialize, Serialize};

/// Per-track result handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlideRecord {
    /// Smoothed glide angles of the masked steps, degrees.
    pub glide_angles: Vec<f64>,
    /// Mean time delta of the source track, seconds.
    pub sampling: f64,
}

impl GlideRecord {
    pub fn new(glide_angles: Vec<f64>, sampling: f64) -> Self {
        Self {
            glide_angles,
            sampling,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.glide_angles.is_empty()
    }
}

/// Aggregated glide performance of one wing across its flights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WingSummary {
    pub mean_angle: f64,
    pub std_dev: f64,
    /// 95% confidence half-width on `mean_angle`, degrees.
    pub confidence: f64,
    pub sample_count: usize,
    pub flight_count: usize,
    pub glide_ratio: f64,
    pub ratio_upper_error: f64,
    pub ratio_lower_error: f64,
}
