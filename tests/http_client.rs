use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use weather_etl::collectors::{Collector, ObservationSource, OpenMeteoClient};
use weather_etl::config::PipelineConfig;
use weather_etl::error::{PipelineError, Result};
use weather_etl::models::Location;

async fn forecast(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    let fields = params.get("current").cloned().unwrap_or_default();
    if !fields.contains("temperature_2m") || !params.contains_key("timezone") {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": true })));
    }

    (
        StatusCode::OK,
        Json(json!({
            "latitude": params.get("latitude"),
            "current": {
                "time": "2024-01-01T10:00",
                "interval": 900,
                "temperature_2m": 12.345,
                "relative_humidity_2m": 80,
                "weather_code": 0,
                "wind_speed_10m": "3.2"
            }
        })),
    )
}

async fn air_quality() -> Json<Value> {
    Json(json!({
        "current": {
            "time": "2024-01-01T10:00",
            "european_aqi": 24.6,
            "pm2_5": 4.4,
            "nitrogen_dioxide": null,
            "ozone": 61.2
        }
    }))
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "current": { "time": "2024-01-01T10:00" } }))
}

async fn no_current() -> Json<Value> {
    Json(json!({ "latitude": 38.7, "hourly": {} }))
}

async fn spawn_provider() -> SocketAddr {
    let app = Router::new()
        .route("/forecast", get(forecast))
        .route("/air-quality", get(air_quality))
        .route("/unavailable", get(unavailable))
        .route("/no-current", get(no_current))
        .route("/slow", get(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr, weather_path: &str, air_path: &str) -> PipelineConfig {
    let mut config = PipelineConfig::default()
        .with_locations(vec![Location::new("Lisbon", 38.7223, -9.1393)])
        .with_timeout_secs(5);
    config.weather_url = format!("http://{}{}", addr, weather_path);
    config.air_quality_url = format!("http://{}{}", addr, air_path);
    config
}

#[tokio::test]
async fn test_fetches_both_current_blocks() -> Result<()> {
    let addr = spawn_provider().await;
    let config = config_for(addr, "/forecast", "/air-quality");
    let client = OpenMeteoClient::new(&config)?;
    let lisbon = &config.locations[0];

    let weather = client.fetch_weather(lisbon).await?;
    assert_eq!(weather.temperature_2m, Some(12.345));
    assert_eq!(weather.wind_speed_10m, Some(3.2));

    let air = client.fetch_air_quality(lisbon).await?;
    assert_eq!(air.european_aqi, Some(24.6));
    assert_eq!(air.nitrogen_dioxide, None);
    Ok(())
}

#[tokio::test]
async fn test_collector_merges_responses() -> Result<()> {
    let addr = spawn_provider().await;
    let config = config_for(addr, "/forecast", "/air-quality");
    let collector = Collector::new(OpenMeteoClient::new(&config)?);

    let records = collector.collect(&config.locations, None).await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].city, "Lisbon");
    assert_eq!(records[0].time.as_deref(), Some("2024-01-01T10:00"));
    assert_eq!(records[0].ozone, Some(61.2));
    Ok(())
}

#[tokio::test]
async fn test_non_success_status_is_an_error() -> Result<()> {
    let addr = spawn_provider().await;
    let config = config_for(addr, "/unavailable", "/air-quality");
    let client = OpenMeteoClient::new(&config)?;

    let err = client.fetch_weather(&config.locations[0]).await.unwrap_err();
    match err {
        PipelineError::HttpStatus { status, url } => {
            assert_eq!(status.as_u16(), 503);
            assert!(url.contains("/unavailable"));
        }
        other => panic!("unexpected error: {}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_current_block_is_malformed() -> Result<()> {
    let addr = spawn_provider().await;
    let config = config_for(addr, "/forecast", "/no-current");
    let client = OpenMeteoClient::new(&config)?;

    let err = client
        .fetch_air_quality(&config.locations[0])
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::MalformedResponse { ref location, .. } if location == "Lisbon"));
    Ok(())
}

#[tokio::test]
async fn test_one_failing_endpoint_fails_the_collection() -> Result<()> {
    let addr = spawn_provider().await;
    let config = config_for(addr, "/forecast", "/unavailable");
    let collector = Collector::new(OpenMeteoClient::new(&config)?);

    assert!(collector.collect(&config.locations, None).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_slow_provider_times_out() -> Result<()> {
    let addr = spawn_provider().await;
    let config = config_for(addr, "/slow", "/air-quality").with_timeout_secs(1);
    let client = OpenMeteoClient::new(&config)?;

    let started = Instant::now();
    let err = client.fetch_weather(&config.locations[0]).await.unwrap_err();

    assert!(matches!(err, PipelineError::Http(ref e) if e.is_timeout()));
    assert!(started.elapsed() < Duration::from_secs(4));
    Ok(())
}
