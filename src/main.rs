use anyhow::Result;
use statewx_core::{AppError, Config};
use statewx_weather::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    statewx_core::init()?;

    let (config, _) = Config::load_validated()?;
    let store = Store::new(&config.services.endpoints())?;

    let state_code = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.defaults.state_code.clone())
        .to_uppercase();

    tracing::info!("StateWx started for {}", state_code);

    if let Err(e) = store.load_state_forecast(&state_code).await {
        let app_err = AppError::from(e);
        eprintln!("{} ({})", app_err.user_message(), app_err);
    }
    // Both weather operations share one error field
    let forecast_error = store.weather.error();
    store.weather.get_alerts(&state_code).await;

    let geocoding = store.geocoding.snapshot();
    let weather = store.weather.snapshot();

    println!("StateWx - {}", state_code);
    if let Some((lat, lon)) = geocoding.coordinates.as_pair() {
        println!("  Coordinates: {:.4}, {:.4}", lat, lon);
    }

    println!("\nForecast:");
    if let Some(error) = &forecast_error {
        println!("  {}", error);
    }
    for period in &weather.forecasts {
        println!(
            "  {}: {}°{}, wind {} {}",
            period.name,
            period.temperature,
            period.temperature_unit,
            period.wind_speed,
            period.wind_direction
        );
        println!("    {}", period.detailed_forecast);
    }

    println!("\nAlerts:");
    for alert in &weather.alerts {
        println!("{}", alert.trim_end());
    }
    if let Some(error) = &weather.error {
        println!("  {}", error);
    }

    Ok(())
}
