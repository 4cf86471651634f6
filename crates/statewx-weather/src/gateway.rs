//! Single choke point for NWS requests.
//!
//! Every failure (transport, status, body) is logged and turned into `None`.
//! Callers decide what a missing payload means.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::types::{Endpoints, WeatherError};

const GEO_JSON: &str = "application/geo+json";

#[derive(Debug, Clone)]
pub struct FetchGateway {
    client: Client,
    nws_base: Url,
}

impl FetchGateway {
    pub fn new(endpoints: &Endpoints) -> Result<Self, WeatherError> {
        let nws_base = Url::parse(&endpoints.nws_api_url)
            .map_err(|e| WeatherError::InvalidEndpoint(format!("{}: {}", endpoints.nws_api_url, e)))?;
        if nws_base.cannot_be_a_base() {
            return Err(WeatherError::InvalidEndpoint(endpoints.nws_api_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GEO_JSON));

        let client = Client::builder()
            .timeout(endpoints.timeout)
            .user_agent(endpoints.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client, nws_base })
    }

    /// `GET <nws>/alerts/active/area/<state>`
    pub fn alerts_url(&self, state_code: &str) -> Url {
        self.nws_url(&["alerts", "active", "area", state_code])
    }

    /// `GET <nws>/points/<lat>,<lon>`
    pub fn points_url(&self, latitude: f64, longitude: f64) -> Url {
        self.nws_url(&["points", &format!("{},{}", latitude, longitude)])
    }

    fn nws_url(&self, segments: &[&str]) -> Url {
        let mut url = self.nws_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Fetch `url` and decode the body as JSON.
    ///
    /// Returns `None` for network errors, timeouts, non-2xx statuses,
    /// undecodable bodies and a literal `null` body.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn fetch_json(&self, url: &str) -> Option<Value> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Error fetching {}: status {}", url, status);
            return None;
        }

        match response.json::<Value>().await {
            Ok(Value::Null) => {
                tracing::debug!("Empty payload from {}", url);
                None
            }
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("Error decoding response from {}: {}", url, e);
                None
            }
        }
    }
}
