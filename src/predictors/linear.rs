//! Linear regression and linear (one-vs-rest) classification

use serde::{Deserialize, Serialize};

use crate::models::{FEATURE_COUNT, Features};
use crate::{Result, WeathercastError};

fn dot(coefficients: &[f64; FEATURE_COUNT], features: &Features) -> f64 {
    coefficients
        .iter()
        .zip(features.as_slice())
        .map(|(c, x)| c * x)
        .sum()
}

/// `y = w · x + b`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub coefficients: [f64; FEATURE_COUNT],
    pub intercept: f64,
}

impl LinearRegressor {
    #[must_use]
    pub fn predict(&self, features: &Features) -> f64 {
        dot(&self.coefficients, features) + self.intercept
    }
}

/// One row of weights per class; the highest score wins.
///
/// A single row is the binary case: a positive score means class 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub coefficients: Vec<[f64; FEATURE_COUNT]>,
    pub intercepts: Vec<f64>,
}

impl LinearClassifier {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("linear classifier has no coefficient rows".to_string());
        }
        if self.coefficients.len() != self.intercepts.len() {
            return Err(format!(
                "linear classifier has {} coefficient rows but {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            ));
        }
        Ok(())
    }

    pub fn predict_class(&self, features: &Features) -> Result<usize> {
        let scores: Vec<f64> = self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| dot(row, features) + b)
            .collect();

        if scores.iter().any(|s| s.is_nan()) {
            return Err(WeathercastError::inference(
                "linear classifier produced a NaN score",
            ));
        }

        if let [score] = scores.as_slice() {
            return Ok(usize::from(*score > 0.0));
        }

        let mut best = 0;
        for (index, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = index;
            }
        }
        Ok(best)
    }
}
