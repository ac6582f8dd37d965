//! Minimal Google Maps client used to look up addresses for new locations.
//!
//! Only the two calls the location setup flow needs are covered: free-text
//! place search and geocoding of a place id. The caller supplies the API key.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Candidate returned by place search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    pub name: String,
    pub formatted_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Geocoded address with exact coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geocode {
    pub place_id: String,
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    place_id: String,
    formatted_address: String,
    geometry: Geometry,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

impl From<GeocodeResult> for Geocode {
    fn from(raw: GeocodeResult) -> Self {
        Self {
            place_id: raw.place_id,
            formatted_address: raw.formatted_address,
            latitude: raw.geometry.location.lat,
            longitude: raw.geometry.location.lng,
            address_components: raw.address_components,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    candidates: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

/// Google reports failures inside a 200 body
fn check_status(status: &str, error_message: Option<&str>) -> Result<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(ApiError::RemoteRejected(format!(
            "Google API request failed with status {}: {}",
            other,
            error_message.unwrap_or("")
        ))),
    }
}

pub struct GoogleMaps {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleMaps {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Google Maps request");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Search for places matching free text, typically an address
    pub async fn find_place_from_text(&self, text: &str) -> Result<Vec<Place>> {
        let response: FindPlaceResponse = self
            .get_json(
                "/place/findplacefromtext/json",
                &[
                    ("input", text),
                    ("inputtype", "textquery"),
                    ("fields", "formatted_address,name,place_id"),
                ],
            )
            .await?;
        check_status(&response.status, response.error_message.as_deref())?;
        Ok(response.candidates)
    }

    pub async fn geocode_from_place_id(&self, place_id: &str) -> Result<Vec<Geocode>> {
        let response: GeocodeResponse = self
            .get_json("/geocode/json", &[("place_id", place_id)])
            .await?;
        check_status(&response.status, response.error_message.as_deref())?;
        Ok(response.results.into_iter().map(Geocode::from).collect())
    }
}
