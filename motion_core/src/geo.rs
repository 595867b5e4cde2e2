//! Great-circle distance between position fixes.

use motion_traits::LocationSample;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two (lat, lon) pairs in degrees.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());
    EARTH_RADIUS_M * c
}

/// Distance in meters between two samples, ignoring when they were taken.
#[inline]
pub fn distance_m(a: &LocationSample, b: &LocationSample) -> f64 {
    haversine_m(a.lat, a.lon, b.lat, b.lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_m(52.52, 13.405, 52.52, 13.405), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn small_offsets_straddle_ten_meters() {
        // ~0.0000899 deg of latitude per 10 m
        let near = haversine_m(48.0, 11.0, 48.00008, 11.0);
        let far = haversine_m(48.0, 11.0, 48.00010, 11.0);
        assert!(near < 10.0, "near = {near}");
        assert!(far > 10.0, "far = {far}");
    }

    #[test]
    fn symmetric() {
        let a = haversine_m(37.7749, -122.4194, 34.0522, -118.2437);
        let b = haversine_m(34.0522, -118.2437, 37.7749, -122.4194);
        assert!((a - b).abs() < 1e-6);
    }
}
