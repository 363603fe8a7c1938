//! Weathercast - five-day autoregressive weather forecasts
//!
//! Pre-trained models are downloaded once into a local directory, loaded into
//! a [`ModelBundle`], and chained day by day: each day's predicted readings
//! become the next day's inputs. A small web page collects today's readings
//! and shows the forecast.

pub mod api;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod forecast_engine;
pub mod logging;
pub mod models;
pub mod page;
pub mod predictors;
pub mod web;

// Re-export core types for public API
pub use artifacts::{ArtifactSource, ArtifactStore, EnsureOutcome, HttpArtifactSource, load_bundle};
pub use config::WeathercastConfig;
pub use error::WeathercastError;
pub use forecast_engine::{StepPrediction, forecast, next_reading, predict_step};
pub use models::{DailyReading, ForecastDay, ForecastSequence};
pub use predictors::ModelBundle;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeathercastError>;
