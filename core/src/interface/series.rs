use serde::{Deserialize, Serialize};

/// Derived series of one track, shaped for a plotting client.
///
/// Every vector except `cumulative_distance` has one entry per track step;
/// `cumulative_distance` has one per sample and starts at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub timestamps: Vec<i64>,
    pub headings: Vec<f64>,
    pub turn_speeds: Vec<f64>,
    pub straight_line_speeds: Vec<f64>,
    pub glide_angles: Vec<f64>,
    pub raw_mask: Vec<u8>,
    pub glide_mask: Vec<u8>,
    pub cumulative_distance: Vec<f64>,
}
