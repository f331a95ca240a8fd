/// Mean Earth radius (IUGG), meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Heading in degrees, [0, 360), from coordinate deltas.
///
/// Quadrant correction on a plain `atan`, not `atan2`: a zero latitude
/// delta gives 0 (or 180 going west), and the south-east / north-west
/// quadrants land where the correction puts them.
pub fn heading_deg(dlat: f64, dlon: f64) -> f64 {
    let mut heading = 0.0;
    if dlat != 0.0 {
        heading = (dlon / dlat).atan().to_degrees();
    }
    if dlon < 0.0 {
        heading += 180.0;
    }
    if heading < 0.0 {
        heading += 360.0;
    }
    heading
}

/// Minimal signed difference `current - previous`, in (-180, 180].
pub fn wrap_turn_deg(current: f64, previous: f64) -> f64 {
    let turn = (current - previous + 180.0).rem_euclid(360.0) - 180.0;
    if turn <= -180.0 {
        180.0
    } else {
        turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn haversine_one_degree_of_latitude() {
        let d = haversine_distance_m(45.0, 6.0, 46.0, 6.0);
        assert_abs_diff_eq!(d, EARTH_RADIUS_M.to_radians() * 1.0, epsilon = 1e-6);
        assert_eq!(haversine_distance_m(45.0, 6.0, 45.0, 6.0), 0.0);
    }

    #[test]
    fn heading_quadrant_correction() {
        assert_eq!(heading_deg(1.0, 0.0), 0.0);
        assert_abs_diff_eq!(heading_deg(1.0, 1.0), 45.0, epsilon = 1e-12);
        assert_eq!(heading_deg(0.0, 1.0), 0.0);
        assert_eq!(heading_deg(0.0, -1.0), 180.0);
        assert_abs_diff_eq!(heading_deg(1.0, -1.0), 135.0, epsilon = 1e-12);
        assert_abs_diff_eq!(heading_deg(-1.0, 1.0), 315.0, epsilon = 1e-12);
        assert_abs_diff_eq!(heading_deg(-1.0, -1.0), 225.0, epsilon = 1e-12);
    }

    #[test]
    fn turn_wraps_through_north() {
        assert_abs_diff_eq!(wrap_turn_deg(10.0, 350.0), 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_turn_deg(350.0, 10.0), -20.0, epsilon = 1e-12);
        assert_eq!(wrap_turn_deg(180.0, 0.0), 180.0);
        assert_eq!(wrap_turn_deg(0.0, 180.0), 180.0);
        assert_eq!(wrap_turn_deg(90.0, 90.0), 0.0);
    }
}
