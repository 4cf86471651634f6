//! Active alerts and short-range forecasts from the National Weather Service.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;

use crate::gateway::FetchGateway;
use crate::state::{
    failure_message, LoadingGuard, SharedState, WeatherState, MAX_FORECAST_PERIODS,
};
use crate::types::{
    AlertFeature, AlertProperties, Endpoints, ForecastRequest, ForecastResponse, PointsResponse,
    WeatherError, WeatherPeriod,
};

/// Sole alerts entry when the state has no active alerts
pub const NO_ACTIVE_ALERTS: &str = "No active alerts for this state.";

const FALLBACK_ERROR: &str = "An error occurred";

/// Owns the weather state slice and the operations that mutate it.
#[derive(Debug, Clone)]
pub struct WeatherModule {
    gateway: FetchGateway,
    state: SharedState<WeatherState>,
}

impl WeatherModule {
    pub fn new(endpoints: &Endpoints) -> Result<Self, WeatherError> {
        Ok(Self::with_gateway(FetchGateway::new(endpoints)?))
    }

    pub fn with_gateway(gateway: FetchGateway) -> Self {
        Self {
            gateway,
            state: Arc::new(RwLock::new(WeatherState::default())),
        }
    }

    /// Shared handle for readers that outlive a borrow of the module
    pub fn state(&self) -> SharedState<WeatherState> {
        Arc::clone(&self.state)
    }

    pub fn snapshot(&self) -> WeatherState {
        self.state.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn has_alerts(&self) -> bool {
        self.state.read().has_alerts()
    }

    pub fn has_forecast(&self) -> bool {
        self.state.read().has_forecast()
    }

    /// Fetch active alerts for a two-letter state code.
    ///
    /// On success `alerts` holds one formatted block per alert, or the single
    /// [`NO_ACTIVE_ALERTS`] entry. On failure `alerts` is emptied and `error`
    /// holds the message.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn get_alerts(&self, state_code: &str) {
        let guard = LoadingGuard::<WeatherState, Vec<String>>::acquire(&self.state);

        let outcome = match self.fetch_alerts(state_code).await {
            Ok(alerts) => {
                tracing::info!("Loaded {} alert entries for {}", alerts.len(), state_code);
                Ok(alerts)
            }
            Err(e) => {
                tracing::warn!("Alerts for {} failed: {}", state_code, e);
                Err(failure_message(&e, FALLBACK_ERROR))
            }
        };

        guard.commit(outcome);
    }

    async fn fetch_alerts(&self, state_code: &str) -> Result<Vec<String>, WeatherError> {
        let url = self.gateway.alerts_url(state_code);
        let data = self.gateway.fetch_json(url.as_str()).await;

        let features = data
            .as_ref()
            .and_then(|d| d.get("features"))
            .and_then(Value::as_array)
            .ok_or(WeatherError::AlertsUnavailable)?;

        if features.is_empty() {
            return Ok(vec![NO_ACTIVE_ALERTS.to_string()]);
        }

        features
            .iter()
            .map(|feature| {
                AlertFeature::deserialize(feature)
                    .map(|f| format_alert(&f.properties))
                    .map_err(|e| WeatherError::Format(format!("alert feature: {}", e)))
            })
            .collect()
    }

    /// Fetch the first five forecast periods for a coordinate pair.
    ///
    /// Resolves the forecast URL through `/points` first. On failure
    /// `forecasts` is emptied and `error` holds the message.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn get_forecast(&self, request: ForecastRequest) {
        let guard = LoadingGuard::<WeatherState, Vec<WeatherPeriod>>::acquire(&self.state);

        let outcome = match self.fetch_forecast(request).await {
            Ok(periods) => {
                tracing::info!("Loaded {} forecast periods", periods.len());
                Ok(periods)
            }
            Err(e) => {
                tracing::warn!(
                    "Forecast for {},{} failed: {}",
                    request.latitude,
                    request.longitude,
                    e
                );
                Err(failure_message(&e, FALLBACK_ERROR))
            }
        };

        guard.commit(outcome);
    }

    async fn fetch_forecast(
        &self,
        request: ForecastRequest,
    ) -> Result<Vec<WeatherPeriod>, WeatherError> {
        request.validate()?;

        let points_url = self.gateway.points_url(request.latitude, request.longitude);
        let points = self
            .gateway
            .fetch_json(points_url.as_str())
            .await
            .ok_or(WeatherError::LocationUnavailable)?;
        let points = PointsResponse::deserialize(&points)
            .map_err(|e| WeatherError::Format(format!("points response: {}", e)))?;

        let forecast = self
            .gateway
            .fetch_json(&points.properties.forecast)
            .await
            .ok_or(WeatherError::ForecastUnavailable)?;
        let forecast = ForecastResponse::deserialize(&forecast)
            .map_err(|e| WeatherError::Format(format!("forecast response: {}", e)))?;

        forecast
            .properties
            .periods
            .iter()
            .take(MAX_FORECAST_PERIODS)
            .map(|period| {
                WeatherPeriod::deserialize(period)
                    .map_err(|e| WeatherError::Format(format!("forecast period: {}", e)))
            })
            .collect()
    }
}

/// Render one alert as a labelled text block.
///
/// Missing or empty fields fall back to placeholders.
pub fn format_alert(props: &AlertProperties) -> String {
    fn or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
        value.as_deref().filter(|s| !s.is_empty()).unwrap_or(default)
    }

    format!(
        "\nEvent: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}\n",
        or(&props.event, "Unknown"),
        or(&props.area_desc, "Unknown"),
        or(&props.severity, "Unknown"),
        or(&props.description, "No description available"),
        or(&props.instruction, "No specific instructions provided"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_alert_full() {
        let props = AlertProperties {
            event: Some("Heat Advisory".into()),
            area_desc: Some("Fresno County".into()),
            severity: Some("Moderate".into()),
            description: Some("Hot temperatures expected.".into()),
            instruction: Some("Drink plenty of fluids.".into()),
        };
        let text = format_alert(&props);
        assert_eq!(
            text,
            "\nEvent: Heat Advisory\nArea: Fresno County\nSeverity: Moderate\n\
             Description: Hot temperatures expected.\nInstructions: Drink plenty of fluids.\n"
        );
    }

    #[test]
    fn test_format_alert_defaults() {
        let text = format_alert(&AlertProperties::default());
        assert!(text.contains("Event: Unknown"));
        assert!(text.contains("Area: Unknown"));
        assert!(text.contains("Severity: Unknown"));
        assert!(text.contains("Description: No description available"));
        assert!(text.contains("Instructions: No specific instructions provided"));
    }

    #[test]
    fn test_format_alert_empty_string_uses_default() {
        let props = AlertProperties {
            event: Some(String::new()),
            ..Default::default()
        };
        assert!(format_alert(&props).contains("Event: Unknown"));
    }

    #[test]
    fn test_new_module_is_idle() {
        let module = WeatherModule::new(&Endpoints::default()).unwrap();
        assert!(!module.is_loading());
        assert!(!module.has_alerts());
        assert!(!module.has_forecast());
        assert_eq!(module.error(), None);
    }
}
