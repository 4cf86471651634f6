//! Weather data layer for StateWx
//!
//! Resolves US state codes to coordinates via Nominatim and fetches active
//! alerts and short-range forecasts from the National Weather Service.
//! Each module owns a state slice that readers observe while operations run.

pub mod gateway;
pub mod geocode;
pub mod state;
pub mod store;
pub mod types;
pub mod weather;

pub use gateway::FetchGateway;
pub use geocode::GeocodingModule;
pub use state::{GeocodingState, SharedState, Transition, WeatherState, MAX_FORECAST_PERIODS};
pub use store::{Store, StoreError};
pub use types::*;
pub use weather::{format_alert, WeatherModule, NO_ACTIVE_ALERTS};
