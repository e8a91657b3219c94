// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Airtrack contributors

//! Client for the airport search REST API.
//!
//! [`AirportApi`] is the seam the search and map state drivers are written
//! against; [`HttpAirportApi`] is the `reqwest` implementation used by the
//! CLI. Every call is a single GET with a JSON body and no retries.

use crate::airport::{Airport, Flight};
use crate::geo::Point;
use async_trait::async_trait;
use log::debug;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("airtrack/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),
}

#[async_trait]
pub trait AirportApi: Send + Sync {
    /// `GET /api/airport-autocomplete/?q=`
    async fn autocomplete(&self, query: &str) -> Result<Vec<Airport>, ApiError>;

    /// `GET /api/airports-in-radius/?lat=&lon=&radius=`
    async fn airports_in_radius(
        &self,
        center: Point,
        radius_km: f64,
    ) -> Result<Vec<Airport>, ApiError>;

    /// `GET /api/airport/<ICAO>/`
    async fn airport(&self, icao: &str) -> Result<Airport, ApiError>;

    /// `GET /api/flights-with-radius/?center_icao=&radius=`
    async fn flights_with_radius(
        &self,
        center_icao: &str,
        radius_km: f64,
    ) -> Result<Vec<Flight>, ApiError>;
}

#[derive(Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    results: Vec<Airport>,
}

#[derive(Deserialize)]
struct RadiusResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    airports: Vec<Airport>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct FlightsResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    flights: Vec<Flight>,
    #[serde(default)]
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

fn rejected(error: Option<String>) -> ApiError {
    ApiError::Rejected(error.unwrap_or_else(|| "success=false".to_string()))
}

pub struct HttpAirportApi {
    client: reqwest::Client,
    base_url: String,
    base: Url,
}

impl HttpAirportApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            base,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base>/<segments...>/`, each segment percent-encoded so user input
    /// cannot add path components, a query or a fragment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        not_found: impl FnOnce() -> String,
    ) -> Result<T, ApiError> {
        debug!("GET {} params={:?}", url, query);

        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(not_found()));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        debug!("Response from {}: status={} bytes={}", url, status, bytes.len());
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl AirportApi for HttpAirportApi {
    async fn autocomplete(&self, query: &str) -> Result<Vec<Airport>, ApiError> {
        let body: AutocompleteResponse = self
            .get_json(
                self.endpoint(&["api", "airport-autocomplete"]),
                &[("q", query.to_string())],
                || format!("autocomplete endpoint at {}", self.base_url),
            )
            .await?;
        Ok(body.results)
    }

    async fn airports_in_radius(
        &self,
        center: Point,
        radius_km: f64,
    ) -> Result<Vec<Airport>, ApiError> {
        let body: RadiusResponse = self
            .get_json(
                self.endpoint(&["api", "airports-in-radius"]),
                &[
                    ("lat", center.lat.to_string()),
                    ("lon", center.lon.to_string()),
                    ("radius", radius_km.to_string()),
                ],
                || format!("radius endpoint at {}", self.base_url),
            )
            .await?;
        if !body.success {
            return Err(rejected(body.error));
        }
        Ok(body.airports)
    }

    async fn airport(&self, icao: &str) -> Result<Airport, ApiError> {
        let code = icao.trim().to_uppercase();
        if code.is_empty() {
            return Err(ApiError::NotFound("airport with empty code".to_string()));
        }
        let url = self.endpoint(&["api", "airport", &code]);
        self.get_json(url, &[], || format!("airport {}", code)).await
    }

    async fn flights_with_radius(
        &self,
        center_icao: &str,
        radius_km: f64,
    ) -> Result<Vec<Flight>, ApiError> {
        let code = center_icao.trim().to_uppercase();
        let body: FlightsResponse = self
            .get_json(
                self.endpoint(&["api", "flights-with-radius"]),
                &[
                    ("center_icao", code.clone()),
                    ("radius", radius_km.to_string()),
                ],
                || format!("airport {}", code),
            )
            .await?;
        if !body.success {
            return Err(rejected(body.error));
        }
        Ok(body.flights)
    }
}
