//! Forward geocoding: convert a US state code to coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.
//!
//! Unlike the NWS gateway, transport errors are returned to the caller so a
//! dependent forecast lookup can be skipped.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Client;

use crate::state::{failure_message, GeocodingState, LoadingGuard, SharedState};
use crate::types::{Coordinates, Endpoints, GeocodeError, NominatimPlace};

const FALLBACK_ERROR: &str = "Failed to get coordinates";

/// Owns the geocoding state slice.
#[derive(Debug, Clone)]
pub struct GeocodingModule {
    client: Client,
    search_url: String,
    state: SharedState<GeocodingState>,
}

impl GeocodingModule {
    pub fn new(endpoints: &Endpoints) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(endpoints.timeout)
            .user_agent(endpoints.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            search_url: endpoints.nominatim_url.clone(),
            state: Arc::new(RwLock::new(GeocodingState::default())),
        })
    }

    pub fn state(&self) -> SharedState<GeocodingState> {
        Arc::clone(&self.state)
    }

    pub fn snapshot(&self) -> GeocodingState {
        self.state.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn has_coordinates(&self) -> bool {
        self.state.read().has_coordinates()
    }

    pub fn coordinates(&self) -> Coordinates {
        self.state.read().coordinates
    }

    /// Resolve a two-letter state code to coordinates.
    ///
    /// The result is committed to state and also returned. On failure the
    /// coordinates are reset, the message is stored in `error`, and the
    /// error is returned.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn get_state_coordinates(
        &self,
        state_code: &str,
    ) -> Result<Coordinates, GeocodeError> {
        let guard = LoadingGuard::<GeocodingState, Coordinates>::acquire(&self.state);

        let result = self.lookup(state_code).await;
        match &result {
            Ok(coords) => {
                tracing::info!("Geocoded {} to {:?}", state_code, coords.as_pair());
                guard.commit(Ok(*coords));
            }
            Err(e) => {
                tracing::warn!("Geocoding {} failed: {}", state_code, e);
                guard.commit(Err(failure_message(e, FALLBACK_ERROR)));
            }
        }

        result
    }

    async fn lookup(&self, state_code: &str) -> Result<Coordinates, GeocodeError> {
        tracing::debug!("Searching Nominatim for state {}", state_code);

        let places: Option<Vec<NominatimPlace>> = self
            .client
            .get(&self.search_url)
            .query(&[
                ("state", state_code),
                ("country", "USA"),
                ("format", "json"),
                ("limit", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let place = places
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResults(state_code.to_string()))?;

        Ok(Coordinates::new(
            parse_coordinate(&place.lat)?,
            parse_coordinate(&place.lon)?,
        ))
    }
}

fn parse_coordinate(value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::InvalidValue(value.to_string()))
}
