// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Great-circle distance helpers.

/// Mean radius of the Earth in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Computes the haversine distance in kilometres between two points given
/// in degrees.
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat: f64 = (lat2 - lat1).to_radians();
    let d_lon: f64 = (lon2 - lon1).to_radians();

    let a: f64 = (lat1.to_radians().cos() * lat2.to_radians().cos())
        .mul_add((d_lon / 2.0).sin().powi(2), (d_lat / 2.0).sin().powi(2));
    let c: f64 = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Returns true if `point` lies within `radius_km` of `center` (inclusive).
///
/// Both points are `(lat, lon)` pairs in degrees.
#[must_use]
pub fn is_within_radius(center: (f64, f64), point: (f64, f64), radius_km: f64) -> bool {
    distance_km(center.0, center.1, point.0, point.1) <= radius_km
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        assert!(distance_km(18.52, 73.85, 18.52, 73.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_pune_to_mumbai() {
        let km: f64 = distance_km(18.5204, 73.8567, 19.0760, 72.8777);
        assert!((km - 120.15).abs() < 0.5, "got {km}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let there: f64 = distance_km(10.0, 20.0, -5.0, 40.0);
        let back: f64 = distance_km(-5.0, 40.0, 10.0, 20.0);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_within_radius_boundary() {
        let center: (f64, f64) = (0.0, 0.0);
        let point: (f64, f64) = (0.0, 1.0);
        let km: f64 = distance_km(0.0, 0.0, 0.0, 1.0);
        assert!(is_within_radius(center, point, km));
        assert!(!is_within_radius(center, point, km - 0.001));
    }
}
