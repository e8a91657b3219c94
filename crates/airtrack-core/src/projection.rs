// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Airtrack contributors

use crate::geo::Point;
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

// --- Spherical Web Mercator (EPSG:3857) ---
pub const MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Latitude at which Web Mercator becomes a square.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Number of segments an arc is split into; the arc has one more point.
pub const ARC_SEGMENTS: usize = 20;

/// Perpendicular displacement of the control point, relative to the chord.
pub const ARC_BEND: f64 = 0.2;

/// A point on the projected map plane, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanePoint {
    pub x: f64,
    pub y: f64,
}

impl PlanePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The vector rotated 90 degrees counter-clockwise.
    pub fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for PlanePoint {
    type Output = PlanePoint;

    fn add(self, rhs: PlanePoint) -> PlanePoint {
        PlanePoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PlanePoint {
    type Output = PlanePoint;

    fn sub(self, rhs: PlanePoint) -> PlanePoint {
        PlanePoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for PlanePoint {
    type Output = PlanePoint;

    fn mul(self, k: f64) -> PlanePoint {
        PlanePoint::new(self.x * k, self.y * k)
    }
}

pub fn to_web_mercator(p: Point) -> PlanePoint {
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = MERCATOR_RADIUS_M * p.lon.to_radians();
    let y = MERCATOR_RADIUS_M * (PI / 4.0 + lat / 2.0).tan().ln();
    PlanePoint::new(x, y)
}

pub fn from_web_mercator(p: PlanePoint) -> Point {
    let lon = (p.x / MERCATOR_RADIUS_M).to_degrees();
    let lat = (2.0 * (p.y / MERCATOR_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    Point::new(lat, lon)
}

/// Quadratic Bézier from `start` to `end` bending to the left of the
/// direction of travel, sampled at `t = i / 20` for `i` in `0..=20`.
///
/// The single control point sits on the perpendicular through the chord
/// midpoint at a distance of `ARC_BEND` times the chord length, so every
/// arc has the same relative curvature regardless of distance or heading.
pub fn quadratic_arc(start: PlanePoint, end: PlanePoint) -> Vec<PlanePoint> {
    let mid = (start + end) * 0.5;
    let control = mid + (end - start).perpendicular() * ARC_BEND;

    (0..=ARC_SEGMENTS)
        .map(|i| {
            let t = i as f64 / ARC_SEGMENTS as f64;
            let u = 1.0 - t;
            start * (u * u) + control * (2.0 * u * t) + end * (t * t)
        })
        .collect()
}

/// Curved display line between two coordinates, computed on the Web
/// Mercator plane and returned as coordinates.
pub fn flight_arc(start: Point, end: Point) -> Vec<Point> {
    quadratic_arc(to_web_mercator(start), to_web_mercator(end))
        .into_iter()
        .map(from_web_mercator)
        .collect()
}
