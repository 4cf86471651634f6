//! Centralized error types for the StateWx application.
//!
//! This module provides a typed error hierarchy that:
//! - Maps weather and geocoding failures onto a small set of categories
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for debugging/logging

use statewx_weather::{GeocodeError, WeatherError as ServiceWeatherError};
use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Geocoding error: {0}")]
    Geocoding(#[from] GeocodingError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    ///
    /// These messages are designed to be actionable and non-technical.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Geocoding(e) => e.user_message(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Weather errors as seen by the application.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather API error: {0}")]
    ApiError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::ApiError(_) => "Weather service error. Please try again.",
            WeatherError::InvalidInput(_) => "Invalid location. Check and try again.",
            WeatherError::ServiceUnavailable(_) => {
                "Weather service unavailable. Please try again later."
            }
        }
    }
}

/// Geocoding errors as seen by the application.
///
/// Transport failures are reported as [`NetworkError`] instead.
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("No coordinates found for state: {0}")]
    NoResults(String),

    #[error("Invalid coordinate value: {0}")]
    InvalidValue(String),
}

impl GeocodingError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeocodingError::NoResults(_) => "Location not found. Check the state code.",
            GeocodingError::InvalidValue(_) => {
                "Received invalid location data. Please try again."
            }
        }
    }
}

impl From<ServiceWeatherError> for AppError {
    fn from(e: ServiceWeatherError) -> Self {
        let message = e.to_string();
        match e {
            ServiceWeatherError::AlertsUnavailable
            | ServiceWeatherError::LocationUnavailable
            | ServiceWeatherError::ForecastUnavailable => {
                AppError::Weather(WeatherError::ServiceUnavailable(message))
            }
            ServiceWeatherError::InvalidCoordinates { .. }
            | ServiceWeatherError::MissingCoordinates => {
                AppError::Weather(WeatherError::InvalidInput(message))
            }
            ServiceWeatherError::Format(_) => AppError::Weather(WeatherError::ApiError(message)),
            ServiceWeatherError::InvalidEndpoint(_) => AppError::Config(ConfigError::Invalid(message)),
            ServiceWeatherError::Client(e) => AppError::Network(e.into_network_error()),
        }
    }
}

impl From<GeocodeError> for AppError {
    fn from(e: GeocodeError) -> Self {
        match e {
            GeocodeError::NoResults(code) => AppError::Geocoding(GeocodingError::NoResults(code)),
            GeocodeError::InvalidValue(v) => AppError::Geocoding(GeocodingError::InvalidValue(v)),
            GeocodeError::Network(e) => AppError::Network(e.into_network_error()),
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_results_maps_to_location_not_found() {
        let app_err: AppError = GeocodeError::NoResults("ZZ".into()).into();
        assert!(matches!(
            app_err,
            AppError::Geocoding(GeocodingError::NoResults(ref code)) if code == "ZZ"
        ));
        assert_eq!(
            app_err.to_string(),
            "Geocoding error: No coordinates found for state: ZZ"
        );
        assert_eq!(
            app_err.user_message(),
            "Location not found. Check the state code."
        );

        let app_err: AppError = GeocodeError::InvalidValue("north".into()).into();
        assert!(matches!(
            app_err,
            AppError::Geocoding(GeocodingError::InvalidValue(ref v)) if v == "north"
        ));
        assert_eq!(
            app_err.user_message(),
            "Received invalid location data. Please try again."
        );
    }

    #[test]
    fn test_service_errors_keep_message() {
        let app_err: AppError = ServiceWeatherError::ForecastUnavailable.into();
        assert!(app_err.to_string().contains("Unable to fetch detailed forecast."));
        assert_eq!(
            app_err.user_message(),
            "Weather service unavailable. Please try again later."
        );
    }

    #[test]
    fn test_invalid_coordinates_is_input_error() {
        let app_err: AppError = ServiceWeatherError::InvalidCoordinates {
            latitude: f64::NAN,
            longitude: 0.0,
        }
        .into();
        assert!(matches!(app_err, AppError::Weather(WeatherError::InvalidInput(_))));
    }

    #[test]
    fn test_server_error_user_message_by_status() {
        let err = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(
            err.user_message(),
            "The server is experiencing issues. Please try again later."
        );

        let err = NetworkError::ServerError {
            status: 404,
            message: "missing".into(),
        };
        assert_eq!(err.user_message(), "The request failed. Please try again.");
    }

    #[test]
    fn test_config_error_conversion() {
        let app_err: AppError = ConfigError::Invalid("timeout".into()).into();
        assert!(matches!(app_err, AppError::Config(ConfigError::Invalid(_))));
    }
}
