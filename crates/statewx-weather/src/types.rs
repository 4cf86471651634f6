use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifying User-Agent sent with every outbound request
pub const USER_AGENT: &str = "weather-app/1.0";

/// National Weather Service API base URL
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Nominatim (OpenStreetMap) search endpoint
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Timeout applied to every weather request
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upstream service locations and client settings shared by both modules.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub nominatim_url: String,
    pub nws_api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            nominatim_url: NOMINATIM_SEARCH_URL.to_string(),
            nws_api_url: NWS_API_BASE.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Endpoints {
    /// Point both services at a single base URL (mock servers, proxies).
    ///
    /// Geocoding is served from `<base>/search`, weather from `<base>`.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            nominatim_url: format!("{}/search", base),
            nws_api_url: base.to_string(),
            ..Self::default()
        }
    }
}

/// Geographic coordinates resolved by geocoding.
///
/// Both fields are `None` until a lookup succeeds and are only ever
/// replaced together.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// The "no coordinates" value held before and after failed lookups
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn as_pair(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Input to the forecast operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
}

impl ForecastRequest {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), WeatherError> {
        if self.latitude.is_finite() && self.longitude.is_finite() {
            Ok(())
        } else {
            Err(WeatherError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

impl TryFrom<Coordinates> for ForecastRequest {
    type Error = WeatherError;

    fn try_from(coords: Coordinates) -> Result<Self, Self::Error> {
        coords
            .as_pair()
            .map(|(latitude, longitude)| Self::new(latitude, longitude))
            .ok_or(WeatherError::MissingCoordinates)
    }
}

/// One forecast period, reduced to the fields the app displays.
///
/// Deserializing an upstream NWS period into this type drops every other
/// field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPeriod {
    pub name: String,
    /// Kept as upstream sent it (`54`, not `54.0`)
    pub temperature: serde_json::Number,
    pub temperature_unit: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub detailed_forecast: String,
}

// Nominatim search result
#[derive(Debug, Deserialize)]
pub(crate) struct NominatimPlace {
    pub lat: String,
    pub lon: String,
}

/// A single active alert from `/alerts/active/area/{state}`.
#[derive(Debug, Default, Deserialize)]
pub struct AlertFeature {
    #[serde(default)]
    pub properties: AlertProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProperties {
    pub event: Option<String>,
    pub area_desc: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PointsResponse {
    pub properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PointsProperties {
    pub forecast: String,
}

// Periods stay raw so only the ones we keep have to project cleanly
#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastProperties {
    pub periods: Vec<serde_json::Value>,
}

/// Weather operation errors.
///
/// The first three messages are displayed verbatim by consumers.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Unable to fetch alerts or no alerts found.")]
    AlertsUnavailable,
    #[error("Unable to fetch forecast data for this location.")]
    LocationUnavailable,
    #[error("Unable to fetch detailed forecast.")]
    ForecastUnavailable,
    #[error("Invalid coordinates: {latitude},{longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("Coordinates have not been resolved")]
    MissingCoordinates,
    #[error("Unexpected response format: {0}")]
    Format(String),
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Geocoding errors. Transport failures are surfaced, not swallowed.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("No coordinates found for state: {0}")]
    NoResults(String),
    #[error("Invalid coordinate value: {0}")]
    InvalidValue(String),
    #[error("{0}")]
    Network(#[from] reqwest::Error),
}
