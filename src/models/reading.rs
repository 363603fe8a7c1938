//! Daily weather reading and the feature vector the models consume

use serde::{Deserialize, Serialize};

/// Number of features every model is trained on
pub const FEATURE_COUNT: usize = 4;

/// One day's observed or predicted weather
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReading {
    /// Minimum temperature in Celsius
    pub temp_min: f64,
    /// Maximum temperature in Celsius
    pub temp_max: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Dew point in Celsius
    pub dew_point: f64,
}

impl DailyReading {
    #[must_use]
    pub fn new(temp_min: f64, temp_max: f64, humidity: f64, dew_point: f64) -> Self {
        Self {
            temp_min,
            temp_max,
            humidity,
            dew_point,
        }
    }

    /// Feature vector in model order: min, max, humidity, dew
    #[must_use]
    pub fn features(&self) -> Features {
        Features([self.temp_min, self.temp_max, self.humidity, self.dew_point])
    }

    /// All four fields are finite numbers
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.features().0.iter().all(|v| v.is_finite())
    }
}

impl Default for DailyReading {
    /// The values the input page starts with
    fn default() -> Self {
        Self::new(25.0, 35.0, 70.0, 24.0)
    }
}

/// Fixed-order feature vector shared by the scaler and every model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features(pub [f64; FEATURE_COUNT]);

impl Features {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.0.iter().sum::<f64>() / FEATURE_COUNT as f64
    }
}
