//! Great-circle distance and implied speed between position fixes.
use crate::{
    constants::{
        Degree, Kilometer, Knot, Seconds, EARTH_RADIUS_KM, KMH_TO_KNOTS, SECONDS_PER_HOUR,
    },
    position_fix::PositionFix,
};

/// Haversine great-circle distance between two points given in degrees.
///
/// Arguments
/// ---------
/// * `lat1`, `lon1`: first point (degrees)
/// * `lat2`, `lon2`: second point (degrees)
///
/// Return
/// ------
/// * the distance in kilometers on a sphere of radius [`EARTH_RADIUS_KM`]
pub fn haversine_km(lat1: Degree, lon1: Degree, lat2: Degree, lon2: Degree) -> Kilometer {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // clamp guards asin against a hair above 1.0 for antipodal points; NaN is kept
    let s = a.sqrt();
    let s = if s > 1.0 { 1.0 } else { s };
    let c = 2.0 * s.asin();
    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two fixes, in kilometers.
#[inline]
pub fn distance_km(a: &PositionFix, b: &PositionFix) -> Kilometer {
    haversine_km(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Average speed over a segment, in knots.
///
/// The caller must ensure `elapsed_seconds > 0`: no guard against division by zero is made here.
#[inline]
pub fn speed_knots(distance_km: Kilometer, elapsed_seconds: Seconds) -> Knot {
    (distance_km / (elapsed_seconds / SECONDS_PER_HOUR)) * KMH_TO_KNOTS
}

#[cfg(test)]
mod geodesy_test {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn fix(lat: f64, lon: f64) -> PositionFix {
        PositionFix::new(1, lat, lon, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_nan_coordinate_propagates() {
        assert!(haversine_km(f64::NAN, 0.0, 0.0, 0.0).is_nan());
        assert!(distance_km(&fix(10.0, 10.0), &fix(10.0, f64::NAN)).is_nan());
    }

    #[test]
    fn test_identical_points() {
        assert_eq!(haversine_km(12.5, -40.0, 12.5, -40.0), 0.0);
        assert_eq!(distance_km(&fix(1.0, 2.0), &fix(1.0, 2.0)), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let a = fix(59.9, 10.7);
        let b = fix(55.7, 12.6);
        assert_relative_eq!(distance_km(&a, &b), distance_km(&b, &a), epsilon = 1e-12);
    }

    #[test]
    fn test_one_degree_of_meridian() {
        let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians();
        assert_relative_eq!(haversine_km(0.0, 0.0, 1.0, 0.0), expected, epsilon = 1e-9);
        assert_relative_eq!(haversine_km(0.0, 0.0, 0.0, 1.0), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_antipodal() {
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert_relative_eq!(haversine_km(0.0, 0.0, 0.0, 180.0), half, epsilon = 1e-6);
    }

    #[test]
    fn test_speed_knots() {
        // 5 km in 60 s = 300 km/h
        assert_relative_eq!(speed_knots(5.0, 60.0), 300.0 * 0.539957, epsilon = 1e-9);
        assert_relative_eq!(speed_knots(1.852, 3600.0), 1.0, epsilon = 1e-4);
    }
}
