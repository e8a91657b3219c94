// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Airtrack contributors

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Bearing step between two consecutive samples of a radius ring.
pub const CIRCLE_STEP_DEG: usize = 10;

/// 0..=360 in `CIRCLE_STEP_DEG` steps; first and last sample coincide.
pub const CIRCLE_SAMPLES: usize = 360 / CIRCLE_STEP_DEG + 1;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `None` for NaN/infinite values or values outside the valid
    /// latitude/longitude ranges.
    pub fn new_checked(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self { lat, lon })
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

impl std::str::FromStr for Point {
    type Err = String;

    /// Parses `"lat,lon"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LON but got '{}'", s))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;
        Point::new_checked(lat, lon).ok_or_else(|| format!("coordinate out of range: {}", s))
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Point, b: Point) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Point reached from `origin` after travelling `distance_km` along the
/// great circle with initial bearing `bearing_deg`.
pub fn destination_point(origin: Point, bearing_deg: f64, distance_km: f64) -> Point {
    let angular = distance_km / EARTH_RADIUS_KM;
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();

    let lat2 =
        (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    Point::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Closed ring of points at great-circle distance `radius_km` around
/// `center`, sampled every 10 degrees of bearing starting at north.
///
/// The ring has `CIRCLE_SAMPLES` points and its first and last points are
/// identical. A radius that is not a positive finite number yields an empty
/// ring. Longitudes are not normalized, so rings crossing the antimeridian
/// may report values outside ±180, and rings around a pole degenerate.
pub fn geodesic_circle(center: Point, radius_km: f64) -> Vec<Point> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Vec::new();
    }

    let mut ring: Vec<Point> = (0..360)
        .step_by(CIRCLE_STEP_DEG)
        .map(|bearing| destination_point(center, bearing as f64, radius_km))
        .collect();
    // sin(2π) is not exactly zero, so the 360° sample is closed by copy
    ring.push(ring[0]);
    ring
}

/// Allowed range for the user-adjustable search radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiusBounds {
    pub min_km: f64,
    pub max_km: f64,
    pub default_km: f64,
}

impl Default for RadiusBounds {
    fn default() -> Self {
        Self {
            min_km: 50.0,
            max_km: 2000.0,
            default_km: 500.0,
        }
    }
}

impl RadiusBounds {
    /// Clamps a finite radius into range. NaN and infinities are rejected.
    pub fn clamp(&self, km: f64) -> Option<f64> {
        if !km.is_finite() {
            return None;
        }
        Some(km.clamp(self.min_km, self.max_km))
    }

    pub fn contains(&self, km: f64) -> bool {
        km >= self.min_km && km <= self.max_km
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOSCOW: Point = Point::new(55.7558, 37.6173);

    #[test]
    fn test_circle_has_closed_ring_of_37_points() {
        let ring = geodesic_circle(MOSCOW, 250.0);
        assert_eq!(ring.len(), 37);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_circle_closes_exactly_at_any_center() {
        let centers = [
            Point::new(0.0, 0.0),
            MOSCOW,
            Point::new(-33.9461, 151.1772),
            Point::new(64.13, -21.9406),
            Point::new(40.6413, -73.7781),
        ];
        for center in centers {
            for radius in [50.0, 100.0, 500.0, 2000.0] {
                let ring = geodesic_circle(center, radius);
                assert_eq!(ring.len(), CIRCLE_SAMPLES);
                assert_eq!(
                    ring[0].lon.to_bits(),
                    ring[CIRCLE_SAMPLES - 1].lon.to_bits(),
                    "open ring at {} r={}",
                    center,
                    radius
                );
                assert_eq!(ring[0].lat.to_bits(), ring[CIRCLE_SAMPLES - 1].lat.to_bits());
            }
        }
    }

    #[test]
    fn test_circle_points_at_radius() {
        let ring = geodesic_circle(MOSCOW, 100.0);
        for p in &ring {
            let d = haversine_km(MOSCOW, *p);
            assert!((d - 100.0).abs() < 0.5, "distance {} too far from 100 km", d);
        }
    }

    #[test]
    fn test_circle_first_point_is_due_north() {
        let ring = geodesic_circle(MOSCOW, 100.0);
        let north = ring[0];
        assert!((north.lon - MOSCOW.lon).abs() < 1e-9);
        assert!(north.lat > MOSCOW.lat);
        // 90 degrees of bearing later we are east of the center
        assert!(ring[9].lon > MOSCOW.lon);
    }

    #[test]
    fn test_circle_rejects_non_positive_radius() {
        assert!(geodesic_circle(MOSCOW, 0.0).is_empty());
        assert!(geodesic_circle(MOSCOW, -10.0).is_empty());
        assert!(geodesic_circle(MOSCOW, f64::NAN).is_empty());
        assert!(geodesic_circle(MOSCOW, f64::INFINITY).is_empty());
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert_eq!(haversine_km(MOSCOW, MOSCOW), 0.0);
        assert!(haversine_km(Point::new(55.0, 37.0), Point::new(56.0, 38.0)) > 0.0);
    }

    #[test]
    fn test_point_validation() {
        assert!(Point::new_checked(55.0, 37.0).is_some());
        assert!(Point::new_checked(f64::NAN, 37.0).is_none());
        assert!(Point::new_checked(91.0, 0.0).is_none());
        assert!(Point::new_checked(0.0, -180.5).is_none());
    }

    #[test]
    fn test_point_from_str() {
        let p: Point = "55.9726, 37.4146".parse().unwrap();
        assert_eq!(p, Point::new(55.9726, 37.4146));
        assert!("55.9".parse::<Point>().is_err());
        assert!("abc,1".parse::<Point>().is_err());
    }

    #[test]
    fn test_radius_bounds_clamp() {
        let bounds = RadiusBounds::default();
        assert_eq!(bounds.clamp(10.0), Some(50.0));
        assert_eq!(bounds.clamp(750.0), Some(750.0));
        assert_eq!(bounds.clamp(5000.0), Some(2000.0));
        assert_eq!(bounds.clamp(f64::NAN), None);
    }
}
