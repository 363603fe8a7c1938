use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::forecast_engine;
use crate::models::{DailyReading, ForecastDay, ForecastSequence};
use crate::predictors::ModelBundle;
use crate::web::AppState;
use crate::{Result, WeathercastError};

/// A validated forecast request, shared by the page and the JSON endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastInput {
    pub date: NaiveDate,
    pub reading: DailyReading,
    /// Collected from the user but not fed to any model
    pub description: Option<String>,
}

impl ForecastInput {
    pub fn new(date: NaiveDate, reading: DailyReading, description: Option<String>) -> Result<Self> {
        if !reading.is_finite() {
            return Err(WeathercastError::validation("readings must be finite numbers"));
        }
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(Self {
            date,
            reading,
            description,
        })
    }

    pub fn run(&self, bundle: &ModelBundle) -> Result<ForecastSequence> {
        if let Some(description) = &self.description {
            debug!(%description, "Current description supplied (not used by the models)");
        }
        forecast_engine::forecast(self.date, self.reading, bundle)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    pub dew_point: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn status_for(err: &WeathercastError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(err: &WeathercastError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        warn!("Forecast failed: {}", err);
    }
    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
        }),
    )
        .into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forecast", post(post_forecast))
        .route("/health", get(health))
}

async fn post_forecast(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ForecastRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(&WeathercastError::validation(rejection.body_text()));
        }
    };

    let reading = DailyReading::new(
        request.temp_min,
        request.temp_max,
        request.humidity,
        request.dew_point,
    );
    let result = ForecastInput::new(request.date, reading, request.description)
        .and_then(|input| input.run(&state.bundle));

    match result {
        Ok(sequence) => Json(ForecastResponse {
            days: sequence.into_days(),
        })
        .into_response(),
        Err(err) => error_response(&err),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_rejects_non_finite_readings() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let reading = DailyReading::new(1.0, f64::NAN, 1.0, 1.0);
        let err = ForecastInput::new(date, reading, None).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let input = ForecastInput::new(date, DailyReading::default(), Some("  ".to_string())).unwrap();
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&WeathercastError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&WeathercastError::inference("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_request_description_is_optional() {
        let request: ForecastRequest = serde_json::from_str(
            r#"{"date":"2024-01-01","temp_min":25.0,"temp_max":35.0,"humidity":70.0,"dew_point":24.0}"#,
        )
        .unwrap();
        assert!(request.description.is_none());
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
