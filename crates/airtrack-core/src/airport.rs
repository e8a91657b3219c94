use crate::geo::Point;
use serde::{Deserialize, Serialize};

/// An airport record as returned by the search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub icao: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata: Option<String>,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Display label supplied by the autocomplete endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Distance from the search center in km (radius endpoint only).
    #[serde(default, alias = "distance_km", skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl Airport {
    /// Coordinates, if both are present and valid.
    pub fn point(&self) -> Option<Point> {
        Point::new_checked(self.latitude?, self.longitude?)
    }

    pub fn label(&self) -> String {
        match &self.text {
            Some(text) if !text.trim().is_empty() => text.clone(),
            _ => format!("{} ({})", self.name, self.icao),
        }
    }

    pub fn matches_icao(&self, icao: &str) -> bool {
        self.icao.eq_ignore_ascii_case(icao.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightKind {
    Departure,
    Arrival,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub callsign: String,
    #[serde(rename = "type")]
    pub kind: FlightKind,
    /// ICAO code of the departure airport
    #[serde(default)]
    pub source: Option<String>,
    /// ICAO code of the arrival airport
    #[serde(default)]
    pub destination: Option<String>,
}
