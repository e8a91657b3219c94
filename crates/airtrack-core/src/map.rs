// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Airtrack contributors

use crate::airport::{Airport, Flight, FlightKind};
use crate::api::{AirportApi, ApiError};
use crate::geo::{geodesic_circle, Point, RadiusBounds};
use crate::projection::flight_arc;
use crate::sequence::{RequestId, RequestSequencer};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

pub const DEFAULT_CENTER: Point = Point::new(55.7558, 37.6173); // Moscow
pub const DEFAULT_ZOOM: u8 = 5;
pub const SINGLE_AIRPORT_ZOOM: u8 = 10;

/// Zoom level that fits a radius ring of `radius_km` on screen.
pub fn zoom_for_radius(radius_km: f64) -> u8 {
    if radius_km > 1000.0 {
        5
    } else if radius_km > 500.0 {
        6
    } else if radius_km > 200.0 {
        7
    } else {
        8
    }
}

/// Inputs for one radius search, captured when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusTicket {
    pub id: RequestId,
    pub center: Point,
    pub center_icao: String,
    pub radius_km: f64,
}

/// Center airport, radius and whatever was found around them.
#[derive(Debug)]
pub struct MapSelection {
    center: Option<Airport>,
    radius_km: f64,
    bounds: RadiusBounds,
    airports: Vec<Airport>,
    flights: Vec<Flight>,
    requests: RequestSequencer,
}

impl Default for MapSelection {
    fn default() -> Self {
        Self::new(RadiusBounds::default())
    }
}

impl MapSelection {
    pub fn new(bounds: RadiusBounds) -> Self {
        Self {
            center: None,
            radius_km: bounds.default_km,
            bounds,
            airports: Vec::new(),
            flights: Vec::new(),
            requests: RequestSequencer::new(),
        }
    }

    pub fn center(&self) -> Option<&Airport> {
        self.center.as_ref()
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    /// Replaces the center. Results for the previous center are dropped.
    pub fn set_center(&mut self, center: Option<Airport>) {
        self.center = center;
        self.airports.clear();
        self.flights.clear();
        self.requests.invalidate();
    }

    /// Sets the radius clamped to bounds and returns the value kept.
    /// Non-finite input leaves the radius unchanged.
    pub fn set_radius(&mut self, km: f64) -> f64 {
        if let Some(km) = self.bounds.clamp(km) {
            if km != self.radius_km {
                self.radius_km = km;
                self.requests.invalidate();
            }
        }
        self.radius_km
    }

    /// Issues a search when a center with valid coordinates and a positive
    /// radius are both set.
    pub fn begin_search(&mut self) -> Option<RadiusTicket> {
        let center = self.center.as_ref()?;
        let point = center.point()?;
        if self.radius_km <= 0.0 {
            return None;
        }
        let center_icao = center.icao.clone();
        Some(RadiusTicket {
            id: self.requests.issue(),
            center: point,
            center_icao,
            radius_km: self.radius_km,
        })
    }

    // Both result kinds of one ticket share its id, so acceptance only
    // peeks at the sequencer instead of consuming the slot.

    pub fn airports_received(
        &mut self,
        id: RequestId,
        result: Result<Vec<Airport>, ApiError>,
    ) -> bool {
        if !self.requests.is_active(id) {
            debug!("Discarding stale radius search response; request={}", id);
            return false;
        }
        match result {
            Ok(airports) => {
                debug!("Radius search applied; request={} count={}", id, airports.len());
                self.airports = airports;
            }
            Err(e) => {
                warn!("Radius search failed; radius_km={} error={}", self.radius_km, e);
                self.airports.clear();
            }
        }
        true
    }

    pub fn flights_received(&mut self, id: RequestId, result: Result<Vec<Flight>, ApiError>) -> bool {
        if !self.requests.is_active(id) {
            debug!("Discarding stale flights response; request={}", id);
            return false;
        }
        match result {
            Ok(flights) => self.flights = flights,
            Err(e) => {
                warn!("Flight lookup failed; radius_km={} error={}", self.radius_km, e);
                self.flights.clear();
            }
        }
        true
    }
}

/// Runs radius searches for a [`MapSelection`] against an API.
pub struct RadiusSearch {
    api: Arc<dyn AirportApi>,
    selection: Mutex<MapSelection>,
}

impl RadiusSearch {
    pub fn new(api: Arc<dyn AirportApi>, bounds: RadiusBounds) -> Self {
        Self {
            api,
            selection: Mutex::new(MapSelection::new(bounds)),
        }
    }

    pub fn with_selection<R>(&self, f: impl FnOnce(&mut MapSelection) -> R) -> R {
        let mut selection = self.selection.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut selection)
    }

    pub fn set_center(&self, center: Option<Airport>) {
        self.with_selection(|s| s.set_center(center))
    }

    pub fn set_radius(&self, km: f64) -> f64 {
        self.with_selection(|s| s.set_radius(km))
    }

    /// Fetches airports and flights for the current selection. Returns
    /// `false` when nothing was issued or a newer refresh superseded this one.
    pub async fn refresh(&self) -> bool {
        let Some(ticket) = self.with_selection(MapSelection::begin_search) else {
            return false;
        };
        debug!(
            "Radius search issued; request={} center={} icao={} radius_km={}",
            ticket.id, ticket.center, ticket.center_icao, ticket.radius_km
        );

        let airports = self.api.airports_in_radius(ticket.center, ticket.radius_km);
        let flights = async {
            if ticket.center_icao.is_empty() {
                Ok(Vec::new())
            } else {
                self.api
                    .flights_with_radius(&ticket.center_icao, ticket.radius_km)
                    .await
            }
        };
        let (airports, flights) = tokio::join!(airports, flights);

        self.with_selection(|s| {
            let applied = s.airports_received(ticket.id, airports);
            applied && s.flights_received(ticket.id, flights)
        })
    }

    pub fn scene(&self) -> MapScene {
        self.with_selection(|s| MapScene::build(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: Point,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub icao: String,
    pub name: String,
    pub point: Point,
    pub is_center: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightArc {
    pub callsign: String,
    pub kind: FlightKind,
    pub source: String,
    pub destination: String,
    pub points: Vec<Point>,
}

/// Everything the map page draws, independent of any map library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene {
    pub view: MapView,
    pub radius_km: f64,
    pub radius_ring: Vec<Point>,
    pub markers: Vec<Marker>,
    pub arcs: Vec<FlightArc>,
}

impl MapScene {
    pub fn build(selection: &MapSelection) -> Self {
        let center = selection.center();
        let center_point = center.and_then(Airport::point);
        let radius_km = selection.radius_km();

        let view = if let Some(point) = center_point {
            MapView {
                center: point,
                zoom: zoom_for_radius(radius_km),
            }
        } else if let Some(point) = selection.airports().iter().find_map(Airport::point) {
            MapView {
                center: point,
                zoom: SINGLE_AIRPORT_ZOOM,
            }
        } else {
            MapView {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
            }
        };

        let radius_ring = match center_point {
            Some(point) if radius_km > 0.0 => geodesic_circle(point, radius_km),
            _ => Vec::new(),
        };

        let mut markers = Vec::new();
        let mut positions: HashMap<String, Point> = HashMap::new();

        if let (Some(airport), Some(point)) = (center, center_point) {
            markers.push(Marker {
                icao: airport.icao.clone(),
                name: airport.name.clone(),
                point,
                is_center: true,
            });
            positions.insert(airport.icao.to_uppercase(), point);
        }

        for airport in selection.airports() {
            if center.is_some_and(|c| c.matches_icao(&airport.icao)) {
                continue;
            }
            let Some(point) = airport.point() else {
                debug!("Skipping airport without coordinates; icao={}", airport.icao);
                continue;
            };
            markers.push(Marker {
                icao: airport.icao.clone(),
                name: airport.name.clone(),
                point,
                is_center: false,
            });
            positions.entry(airport.icao.to_uppercase()).or_insert(point);
        }

        let arcs = selection
            .flights()
            .iter()
            .filter_map(|flight| {
                let source = flight.source.as_deref()?.trim().to_uppercase();
                let destination = flight.destination.as_deref()?.trim().to_uppercase();
                let from = *positions.get(&source)?;
                let to = *positions.get(&destination)?;
                Some(FlightArc {
                    callsign: flight.callsign.clone(),
                    kind: flight.kind,
                    source,
                    destination,
                    points: flight_arc(from, to),
                })
            })
            .collect();

        Self {
            view,
            radius_km,
            radius_ring,
            markers,
            arcs,
        }
    }

    /// GeoJSON `FeatureCollection`; the view is attached as a foreign member.
    pub fn to_geojson(&self) -> Value {
        fn coords(points: &[Point]) -> Vec<[f64; 2]> {
            points.iter().map(|p| [p.lon, p.lat]).collect()
        }

        let mut features = Vec::new();

        if !self.radius_ring.is_empty() {
            // bearing order runs clockwise; GeoJSON outer rings are counter-clockwise
            let mut ring = coords(&self.radius_ring);
            ring.reverse();
            features.push(json!({
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [ring] },
                "properties": { "layer": "radius", "radius_km": self.radius_km },
            }));
        }

        for marker in &self.markers {
            features.push(json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [marker.point.lon, marker.point.lat] },
                "properties": {
                    "layer": "airports",
                    "icao": marker.icao,
                    "name": marker.name,
                    "is_center": marker.is_center,
                },
            }));
        }

        for arc in &self.arcs {
            features.push(json!({
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": coords(&arc.points) },
                "properties": {
                    "layer": "flights",
                    "callsign": arc.callsign,
                    "type": arc.kind,
                    "source": arc.source,
                    "destination": arc.destination,
                },
            }));
        }

        json!({
            "type": "FeatureCollection",
            "view": {
                "center": [self.view.center.lon, self.view.center.lat],
                "zoom": self.view.zoom,
            },
            "features": features,
        })
    }
}
