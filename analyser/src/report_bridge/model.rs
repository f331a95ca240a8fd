use glidecore::interface::{SeriesReport, WingSummary};
use glidecore::track::AltitudeSource;
use glidecore::TrackAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest analysis state handed to the plotting client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportModel {
    pub flight_id: Option<String>,
    pub altitude_source: Option<AltitudeSource>,
    /// Absent when the track holds no steady glide.
    pub glide_ratio: Option<f64>,
    pub ratio_histogram: Vec<usize>,
    pub series: SeriesReport,
    pub wings: BTreeMap<String, WingSummary>,
}

impl ReportModel {
    pub fn from_analysis(flight_id: Option<String>, analysis: &TrackAnalysis) -> Self {
        Self {
            flight_id,
            altitude_source: Some(analysis.source),
            glide_ratio: analysis.glide_ratio().ok(),
            ratio_histogram: analysis.ratio_histogram(),
            series: analysis.series_report(),
            wings: BTreeMap::new(),
        }
    }
}
