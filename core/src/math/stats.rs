/// Ratio reported for a perfectly level glide angle.
pub const INFINITE_GLIDE_RATIO: f64 = 1_000_000.0;

/// Glide angle (degrees, negative descending) to glide ratio.
pub fn angle_to_ratio(angle_deg: f64) -> f64 {
    if angle_deg == 0.0 {
        return INFINITE_GLIDE_RATIO;
    }
    -1.0 / angle_deg.to_radians().tan()
}

/// Glide ratio to glide angle in degrees.
pub fn ratio_to_angle(ratio: f64) -> f64 {
    (-1.0 / ratio).atan().to_degrees()
}

pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Counts `values` into `bins` equal-width bins over `[lo, hi]`.
    /// Values outside the range are dropped; `hi` falls in the last bin.
    pub fn histogram(values: impl IntoIterator<Item = f64>, bins: usize, lo: f64, hi: f64) -> Vec<usize> {
        let mut counts = vec![0; bins];
        if bins == 0 || !(hi > lo) {
            return counts;
        }
        let width = (hi - lo) / bins as f64;
        for value in values {
            if !(lo..=hi).contains(&value) {
                continue;
            }
            let idx = (((value - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn level_flight_maps_to_sentinel() {
        assert_eq!(angle_to_ratio(0.0), INFINITE_GLIDE_RATIO);
    }

    #[test]
    fn ratio_angle_round_trip() {
        for ratio in [0.5, 2.0, 7.3, 8.0, 15.0, 40.0, -6.0] {
            assert_relative_eq!(angle_to_ratio(ratio_to_angle(ratio)), ratio, max_relative = 1e-6);
        }
    }

    #[test]
    fn steeper_angle_means_lower_ratio() {
        assert!(ratio_to_angle(2.0) < ratio_to_angle(15.0));
        assert!(ratio_to_angle(15.0) < 0.0);
    }

    #[test]
    fn mean_of_empty_slice_is_none() {
        assert_eq!(StatsHelper::mean(&[]), None);
        assert_eq!(StatsHelper::mean(&[1.0, 3.0]), Some(2.0));
    }

    #[test]
    fn histogram_bins_and_drops_outliers() {
        let counts = StatsHelper::histogram([-15.0, -14.9, 0.0, 7.5, 15.0, 16.0], 4, -15.0, 15.0);
        assert_eq!(counts, vec![2, 0, 1, 2]);
    }
}
