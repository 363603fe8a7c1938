//! Data models for the weathercast application
//!
//! - Reading: one day's four weather values and the model feature vector
//! - Forecast: predicted days and the five-day sequence

pub mod forecast;
pub mod reading;

// Re-export all public types for convenient access
pub use forecast::{FORECAST_DAYS, ForecastDay, ForecastSequence, round2};
pub use reading::{DailyReading, FEATURE_COUNT, Features};
