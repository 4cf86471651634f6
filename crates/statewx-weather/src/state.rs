//! State slices owned by the weather and geocoding modules.
//!
//! Each slice is mutated only through [`StateSlice::apply`], and every
//! operation holds a [`LoadingGuard`] for its whole duration so `loading`
//! drops back to `false` on every exit path, including a cancelled future.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::types::{Coordinates, WeatherPeriod};

/// Upper bound on committed forecast periods
pub const MAX_FORECAST_PERIODS: usize = 5;

/// Handle to a state slice shared between a module and its readers.
pub type SharedState<S> = Arc<RwLock<S>>;

/// The closed set of state changes an operation can make.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<T> {
    /// Operation started: `loading = true`, `error = None`
    Loading,
    /// Replace the data field
    Success(T),
    /// Record the message and reset the data field
    Failure(String),
    /// Operation finished: `loading = false`
    Settled,
}

/// A state slice that accepts transitions carrying `T`.
pub trait StateSlice<T> {
    fn apply(&mut self, transition: Transition<T>);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeocodingState {
    pub loading: bool,
    pub error: Option<String>,
    pub coordinates: Coordinates,
}

impl GeocodingState {
    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_set()
    }
}

impl StateSlice<Coordinates> for GeocodingState {
    fn apply(&mut self, transition: Transition<Coordinates>) {
        match transition {
            Transition::Loading => {
                self.loading = true;
                self.error = None;
            }
            Transition::Success(coordinates) => self.coordinates = coordinates,
            Transition::Failure(message) => {
                self.error = Some(message);
                self.coordinates = Coordinates::unset();
            }
            Transition::Settled => self.loading = false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherState {
    pub alerts: Vec<String>,
    pub forecasts: Vec<WeatherPeriod>,
    pub loading: bool,
    pub error: Option<String>,
}

impl WeatherState {
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    pub fn has_forecast(&self) -> bool {
        !self.forecasts.is_empty()
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }
}

impl StateSlice<Vec<String>> for WeatherState {
    fn apply(&mut self, transition: Transition<Vec<String>>) {
        match transition {
            Transition::Loading => self.begin(),
            Transition::Success(alerts) => self.alerts = alerts,
            Transition::Failure(message) => {
                self.error = Some(message);
                self.alerts = Vec::new();
            }
            Transition::Settled => self.loading = false,
        }
    }
}

impl StateSlice<Vec<WeatherPeriod>> for WeatherState {
    fn apply(&mut self, transition: Transition<Vec<WeatherPeriod>>) {
        match transition {
            Transition::Loading => self.begin(),
            Transition::Success(mut forecasts) => {
                forecasts.truncate(MAX_FORECAST_PERIODS);
                self.forecasts = forecasts;
            }
            Transition::Failure(message) => {
                self.error = Some(message);
                self.forecasts = Vec::new();
            }
            Transition::Settled => self.loading = false,
        }
    }
}

/// Marks a slice as loading for as long as it is alive.
///
/// The lock is taken only inside `acquire`, `commit` and `drop`, never
/// across an `.await`.
pub struct LoadingGuard<'a, S, T>
where
    S: StateSlice<T>,
{
    state: &'a RwLock<S>,
    _data: PhantomData<fn(T)>,
}

impl<'a, S, T> LoadingGuard<'a, S, T>
where
    S: StateSlice<T>,
{
    pub fn acquire(state: &'a RwLock<S>) -> Self {
        state.write().apply(Transition::Loading);
        Self {
            state,
            _data: PhantomData,
        }
    }

    /// Commit the terminal outcome. `loading` is released when the guard drops.
    pub fn commit(&self, outcome: Result<T, String>) {
        let transition = match outcome {
            Ok(data) => Transition::Success(data),
            Err(message) => Transition::Failure(message),
        };
        self.state.write().apply(transition);
    }
}

impl<S, T> Drop for LoadingGuard<'_, S, T>
where
    S: StateSlice<T>,
{
    fn drop(&mut self) {
        self.state.write().apply(Transition::Settled);
    }
}

/// Message committed to `error`, falling back when the error renders empty.
pub(crate) fn failure_message(err: &dyn std::error::Error, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
