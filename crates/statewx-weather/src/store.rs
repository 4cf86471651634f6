//! Application-owned container for both data modules.

use crate::geocode::GeocodingModule;
use crate::types::{Endpoints, ForecastRequest, GeocodeError, WeatherError};
use crate::weather::WeatherModule;

/// Errors raised while wiring the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

/// Both module state slices, constructed once at startup and passed by
/// reference to whatever drives the operations.
#[derive(Debug, Clone)]
pub struct Store {
    pub weather: WeatherModule,
    pub geocoding: GeocodingModule,
}

impl Store {
    pub fn new(endpoints: &Endpoints) -> Result<Self, StoreError> {
        Ok(Self {
            weather: WeatherModule::new(endpoints)?,
            geocoding: GeocodingModule::new(endpoints)?,
        })
    }

    /// Resolve a state's coordinates, then fetch its forecast.
    ///
    /// The forecast is skipped when geocoding fails; the geocoding error is
    /// returned and also left in the geocoding state.
    pub async fn load_state_forecast(&self, state_code: &str) -> Result<(), GeocodeError> {
        let coords = self.geocoding.get_state_coordinates(state_code).await?;
        if let Some((latitude, longitude)) = coords.as_pair() {
            self.weather
                .get_forecast(ForecastRequest::new(latitude, longitude))
                .await;
        }
        Ok(())
    }
}
