// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Airtrack contributors

pub mod airport;
pub mod api;
pub mod config;
pub mod geo;
pub mod map;
pub mod projection;
pub mod search;
pub mod sequence;

pub use airport::{Airport, Flight, FlightKind};
pub use api::{AirportApi, ApiError, HttpAirportApi};
pub use config::AppConfig;
pub use geo::{geodesic_circle, haversine_km, Point, RadiusBounds};
pub use map::{MapScene, MapSelection, RadiusSearch};
pub use projection::{flight_arc, quadratic_arc, PlanePoint};
pub use search::{AutocompleteSession, QueryChange, SearchSettings, SearchSnapshot, SearchState};
