//! Forecast output records and display formatting

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of days a forecast covers
pub const FORECAST_DAYS: usize = 5;

/// Round to two decimal places for display. Exact ties round away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One predicted day, with display-rounded values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Calendar date of the prediction (serialised as `YYYY-MM-DD`)
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    pub dew_point: f64,
    /// Decoded weather label, e.g. "Clear sky"
    pub description: String,
}

impl ForecastDay {
    /// Create a day, rounding every numeric field to two decimals
    #[must_use]
    pub fn new(
        date: NaiveDate,
        temp_min: f64,
        temp_max: f64,
        humidity: f64,
        dew_point: f64,
        description: String,
    ) -> Self {
        Self {
            date,
            temp_min: round2(temp_min),
            temp_max: round2(temp_max),
            humidity: round2(humidity),
            dew_point: round2(dew_point),
            description,
        }
    }

    /// ISO date string
    #[must_use]
    pub fn format_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Format temperature range with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("Min: {:.2}°C | Max: {:.2}°C", self.temp_min, self.temp_max)
    }

    /// Format humidity and dew point with units
    #[must_use]
    pub fn format_moisture(&self) -> String {
        format!("Humidity: {:.2}% | Dew: {:.2}°C", self.humidity, self.dew_point)
    }

    #[must_use]
    pub fn format_description(&self) -> String {
        format!("Description: {}", self.description)
    }
}

/// Exactly [`FORECAST_DAYS`] consecutive forecast days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSequence {
    days: Vec<ForecastDay>,
}

impl ForecastSequence {
    /// Wrap a completed run. Returns `None` unless the days are exactly
    /// [`FORECAST_DAYS`] long and one calendar day apart.
    #[must_use]
    pub fn from_days(days: Vec<ForecastDay>) -> Option<Self> {
        if days.len() != FORECAST_DAYS {
            return None;
        }
        let consecutive = days
            .windows(2)
            .all(|pair| pair[0].date.succ_opt() == Some(pair[1].date));
        consecutive.then_some(Self { days })
    }

    #[must_use]
    pub fn days(&self) -> &[ForecastDay] {
        &self.days
    }

    #[must_use]
    pub fn first_date(&self) -> NaiveDate {
        self.days[0].date
    }

    #[must_use]
    pub fn into_days(self) -> Vec<ForecastDay> {
        self.days
    }
}

impl<'a> IntoIterator for &'a ForecastSequence {
    type Item = &'a ForecastDay;
    type IntoIter = std::slice::Iter<'a, ForecastDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}
