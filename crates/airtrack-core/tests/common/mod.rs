#![allow(dead_code)]

use airtrack_core::{haversine_km, Airport, AirportApi, ApiError, Flight, FlightKind, Point};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub fn init_logging() {
    let _ = simplelog::TestLogger::init(log::LevelFilter::Debug, simplelog::Config::default());
}

pub fn airport(icao: &str, name: &str, city: &str, lat: f64, lon: f64) -> Airport {
    Airport {
        icao: icao.to_string(),
        iata: None,
        name: name.to_string(),
        city: city.to_string(),
        country: String::new(),
        latitude: Some(lat),
        longitude: Some(lon),
        text: None,
        distance: None,
    }
}

pub fn fixture_airports() -> Vec<Airport> {
    vec![
        airport("UUEE", "Sheremetyevo", "Moscow", 55.9726, 37.4146),
        airport("UUDD", "Domodedovo", "Moscow", 55.4088, 37.9063),
        airport("UUWW", "Vnukovo", "Moscow", 55.5915, 37.2615),
        airport("ULLI", "Pulkovo", "Saint Petersburg", 59.8003, 30.2625),
        airport("EGLL", "Heathrow", "London", 51.4700, -0.4543),
    ]
}

pub fn fixture_flights() -> Vec<Flight> {
    let f = |callsign: &str, kind, source: &str, destination: &str| Flight {
        callsign: callsign.to_string(),
        kind,
        source: Some(source.to_string()),
        destination: Some(destination.to_string()),
    };
    vec![
        f("AFL1", FlightKind::Departure, "UUEE", "ULLI"),
        f("AFL2", FlightKind::Arrival, "ULLI", "UUEE"),
        f("BAW1", FlightKind::Arrival, "EGLL", "UUEE"),
    ]
}

/// In-memory API with call recording and scripted latency.
pub struct MockApi {
    airports: Vec<Airport>,
    flights: Vec<Flight>,
    query_delays: Mutex<HashMap<String, Duration>>,
    /// Radius lookups take one millisecond per kilometre when set.
    pub slow_radius: AtomicBool,
    pub fail: AtomicBool,
    pub autocomplete_calls: Mutex<Vec<(String, Instant)>>,
    pub radius_calls: Mutex<Vec<f64>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            airports: fixture_airports(),
            flights: fixture_flights(),
            query_delays: Mutex::new(HashMap::new()),
            slow_radius: AtomicBool::new(false),
            fail: AtomicBool::new(false),
            autocomplete_calls: Mutex::new(Vec::new()),
            radius_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn delay_query(&self, query: &str, delay: Duration) {
        self.query_delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
    }

    pub fn autocomplete_queries(&self) -> Vec<String> {
        self.autocomplete_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _)| q.clone())
            .collect()
    }

    fn failure(&self) -> Option<ApiError> {
        self.fail
            .load(Ordering::SeqCst)
            .then(|| ApiError::Rejected("mock failure".to_string()))
    }
}

#[async_trait]
impl AirportApi for MockApi {
    async fn autocomplete(&self, query: &str) -> Result<Vec<Airport>, ApiError> {
        self.autocomplete_calls
            .lock()
            .unwrap()
            .push((query.to_string(), Instant::now()));

        let delay = self.query_delays.lock().unwrap().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(e) = self.failure() {
            return Err(e);
        }

        let q = query.to_lowercase();
        Ok(self
            .airports
            .iter()
            .filter(|a| {
                a.icao.to_lowercase().contains(&q)
                    || a.name.to_lowercase().contains(&q)
                    || a.city.to_lowercase().contains(&q)
            })
            .cloned()
            .collect())
    }

    async fn airports_in_radius(
        &self,
        center: Point,
        radius_km: f64,
    ) -> Result<Vec<Airport>, ApiError> {
        self.radius_calls.lock().unwrap().push(radius_km);
        if self.slow_radius.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(radius_km as u64)).await;
        }
        if let Some(e) = self.failure() {
            return Err(e);
        }

        Ok(self
            .airports
            .iter()
            .filter_map(|a| {
                let d = haversine_km(center, a.point()?);
                (d <= radius_km).then(|| Airport {
                    distance: Some(d),
                    ..a.clone()
                })
            })
            .collect())
    }

    async fn airport(&self, icao: &str) -> Result<Airport, ApiError> {
        self.airports
            .iter()
            .find(|a| a.matches_icao(icao))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("airport {}", icao)))
    }

    async fn flights_with_radius(
        &self,
        center_icao: &str,
        _radius_km: f64,
    ) -> Result<Vec<Flight>, ApiError> {
        if let Some(e) = self.failure() {
            return Err(e);
        }
        Ok(self
            .flights
            .iter()
            .filter(|f| {
                f.source.as_deref() == Some(center_icao)
                    || f.destination.as_deref() == Some(center_icao)
            })
            .cloned()
            .collect())
    }
}
