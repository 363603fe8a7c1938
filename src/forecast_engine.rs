//! Five-day autoregressive forecast
//!
//! Each day is predicted from the previous day's raw (unrounded) model
//! outputs. Rounding only happens when a [`ForecastDay`] is built for display.

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::models::{DailyReading, FORECAST_DAYS, ForecastDay, ForecastSequence, round2};
use crate::predictors::{ModelBundle, Regressor};
use crate::{Result, WeathercastError};

/// Raw outputs of one forecast step
#[derive(Debug, Clone, PartialEq)]
pub struct StepPrediction {
    /// Regressor outputs at model precision
    pub reading: DailyReading,
    pub class_index: usize,
    pub description: String,
}

/// Tag a model failure with the day and model it came from
fn inference_failure(day: usize, model: &str, err: WeathercastError) -> WeathercastError {
    let detail = match err {
        WeathercastError::Inference { message } => message,
        other => other.to_string(),
    };
    WeathercastError::inference(format!("day {day}, {model}: {detail}"))
}

/// Reject outputs that cannot be fed back or shown with two decimals
fn finite(day: usize, model: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(WeathercastError::inference(format!(
            "day {day}, {model}: produced non-finite value {value}"
        )));
    }
    if !round2(value).is_finite() {
        return Err(WeathercastError::inference(format!(
            "day {day}, {model}: value {value:e} is out of range"
        )));
    }
    Ok(value)
}

/// Run the scaler, the four regressors, the classifier and the label decoder
/// once on `reading`. `day` is only used to label errors.
pub fn predict_step(bundle: &ModelBundle, reading: &DailyReading, day: usize) -> Result<StepPrediction> {
    let scaled = bundle
        .scaler()
        .transform(&reading.features())
        .map_err(|e| inference_failure(day, "scaler", e))?;

    let regressors = bundle.regressors();
    let regress = |name: &str, model: &dyn Regressor| -> Result<f64> {
        let value = model
            .predict(&scaled)
            .map_err(|e| inference_failure(day, name, e))?;
        finite(day, name, value)
    };

    let predicted = DailyReading::new(
        regress("temp_min regressor", regressors.temp_min.as_ref())?,
        regress("temp_max regressor", regressors.temp_max.as_ref())?,
        regress("humidity regressor", regressors.humidity.as_ref())?,
        regress("dew_point regressor", regressors.dew_point.as_ref())?,
    );

    let class_index = bundle
        .classifier()
        .predict_class(&scaled)
        .map_err(|e| inference_failure(day, "classifier", e))?;
    let description = bundle
        .label_decoder()
        .decode(class_index)
        .map_err(|e| inference_failure(day, "label decoder", e))?;

    Ok(StepPrediction {
        reading: predicted,
        class_index,
        description,
    })
}

/// State transition: the next day's input is this day's raw prediction
#[must_use]
pub fn next_reading(step: &StepPrediction) -> DailyReading {
    step.reading
}

/// Forecast the five days after `start_date`.
///
/// Either all five days are returned or the first error is; partial
/// forecasts are never produced.
#[instrument(skip(bundle), fields(start = %start_date))]
pub fn forecast(
    start_date: NaiveDate,
    start_reading: DailyReading,
    bundle: &ModelBundle,
) -> Result<ForecastSequence> {
    let mut date = start_date;
    let mut reading = start_reading;
    let mut days = Vec::with_capacity(FORECAST_DAYS);

    for day in 1..=FORECAST_DAYS {
        date = date.succ_opt().ok_or_else(|| {
            WeathercastError::validation(format!("cannot forecast past {date}"))
        })?;

        let step = predict_step(bundle, &reading, day)?;
        debug!(
            day,
            %date,
            temp_min = step.reading.temp_min,
            temp_max = step.reading.temp_max,
            humidity = step.reading.humidity,
            dew_point = step.reading.dew_point,
            class = step.class_index,
            description = %step.description,
            "Predicted day"
        );

        days.push(ForecastDay::new(
            date,
            step.reading.temp_min,
            step.reading.temp_max,
            step.reading.humidity,
            step.reading.dew_point,
            step.description.clone(),
        ));
        reading = next_reading(&step);
    }

    info!("Forecast complete for {} days after {}", FORECAST_DAYS, start_date);
    ForecastSequence::from_days(days)
        .ok_or_else(|| WeathercastError::inference("forecast did not produce consecutive days"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Features, round2};
    use crate::predictors::{Classifier, FeatureScaler, LabelDecoder, RegressorSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn identity() -> Box<dyn FeatureScaler> {
        Box::new(|f: &Features| -> Result<Features> { Ok(*f) })
    }

    fn mean() -> Box<dyn Regressor> {
        Box::new(|f: &Features| -> Result<f64> { Ok(f.mean()) })
    }

    fn always(class: usize) -> Box<dyn Classifier> {
        Box::new(move |_: &Features| -> Result<usize> { Ok(class) })
    }

    fn clear_sky() -> Box<dyn LabelDecoder> {
        Box::new(|i: usize| -> Result<String> {
            match i {
                0 => Ok("Clear sky".to_string()),
                _ => Err(WeathercastError::inference(format!("unknown class {i}"))),
            }
        })
    }

    fn mean_bundle() -> ModelBundle {
        ModelBundle::new(
            identity(),
            RegressorSet {
                temp_min: mean(),
                temp_max: mean(),
                humidity: mean(),
                dew_point: mean(),
            },
            always(0),
            clear_sky(),
        )
    }

    fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_golden_path_with_mean_models() {
        let seq = forecast(jan_first(), DailyReading::default(), &mean_bundle()).unwrap();

        let dates: Vec<String> = seq.days().iter().map(ForecastDay::format_date).collect();
        assert_eq!(
            dates,
            ["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05", "2024-01-06"]
        );
        for day in &seq {
            assert_eq!(day.description, "Clear sky");
            assert_eq!(day.temp_min, 38.5);
            assert_eq!(day.temp_max, 38.5);
            assert_eq!(day.humidity, 38.5);
            assert_eq!(day.dew_point, 38.5);
        }
    }

    #[test]
    fn test_dates_cross_month_and_leap_day() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let seq = forecast(start, DailyReading::default(), &mean_bundle()).unwrap();
        let last = seq.days().last().unwrap().date;
        assert_eq!(seq.days()[1].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    }

    #[test]
    fn test_deterministic() {
        let bundle = mean_bundle();
        let reading = DailyReading::new(12.3, 19.7, 55.5, 8.1);
        let a = forecast(jan_first(), reading, &bundle).unwrap();
        let b = forecast(jan_first(), reading, &bundle).unwrap();
        assert_eq!(a, b);
    }

    /// Regressors divide their own feature by three; the min regressor
    /// records every vector it sees.
    fn thirds_bundle(seen: Arc<Mutex<Vec<Features>>>) -> ModelBundle {
        let third = |i: usize| -> Box<dyn Regressor> {
            Box::new(move |f: &Features| -> Result<f64> { Ok(f.0[i] / 3.0) })
        };
        ModelBundle::new(
            identity(),
            RegressorSet {
                temp_min: Box::new(move |f: &Features| -> Result<f64> {
                    seen.lock().unwrap().push(*f);
                    Ok(f.0[0] / 3.0)
                }),
                temp_max: third(1),
                humidity: third(2),
                dew_point: third(3),
            },
            always(0),
            clear_sky(),
        )
    }

    #[test]
    fn test_feedback_uses_raw_predictions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let bundle = thirds_bundle(seen.clone());
        let start = DailyReading::default();
        forecast(jan_first(), start, &bundle).unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], start.features());
        for k in 0..4 {
            let raw = Features(seen[k].0.map(|x| x / 3.0));
            assert_eq!(seen[k + 1], raw, "day {} input must be day {} raw output", k + 2, k + 1);
        }
    }

    #[test]
    fn test_rounded_feedback_would_change_next_day() {
        let bundle = thirds_bundle(Arc::new(Mutex::new(Vec::new())));
        let first = predict_step(&bundle, &DailyReading::default(), 1).unwrap();

        let raw_next = predict_step(&bundle, &next_reading(&first), 2).unwrap();
        let r = first.reading;
        let rounded = DailyReading::new(
            round2(r.temp_min),
            round2(r.temp_max),
            round2(r.humidity),
            round2(r.dew_point),
        );
        let rounded_next = predict_step(&bundle, &rounded, 2).unwrap();

        assert_ne!(raw_next.reading, rounded_next.reading);
    }

    #[test]
    fn test_display_values_have_two_decimals() {
        let bundle = thirds_bundle(Arc::new(Mutex::new(Vec::new())));
        let seq = forecast(jan_first(), DailyReading::default(), &bundle).unwrap();
        for day in &seq {
            for value in [day.temp_min, day.temp_max, day.humidity, day.dew_point] {
                assert_eq!(value, round2(value));
            }
        }
        assert_eq!(seq.days()[0].temp_min, 8.33);
    }

    #[test]
    fn test_failure_at_day_three_returns_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let bundle = ModelBundle::new(
            identity(),
            RegressorSet {
                temp_min: mean(),
                temp_max: mean(),
                humidity: Box::new(move |f: &Features| -> Result<f64> {
                    if counter.fetch_add(1, Ordering::SeqCst) == 2 {
                        Err(WeathercastError::inference("overflow"))
                    } else {
                        Ok(f.mean())
                    }
                }),
                dew_point: mean(),
            },
            always(0),
            clear_sky(),
        );

        let err = forecast(jan_first(), DailyReading::default(), &bundle).unwrap_err();
        assert!(matches!(err, WeathercastError::Inference { .. }));
        assert!(err.to_string().contains("day 3, humidity regressor: overflow"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_non_finite_output_is_inference_error() {
        let bundle = ModelBundle::new(
            identity(),
            RegressorSet {
                temp_min: mean(),
                temp_max: Box::new(|_: &Features| -> Result<f64> { Ok(f64::NAN) }),
                humidity: mean(),
                dew_point: mean(),
            },
            always(0),
            clear_sky(),
        );
        let err = forecast(jan_first(), DailyReading::default(), &bundle).unwrap_err();
        assert!(err.to_string().contains("temp_max regressor"));
    }

    #[test]
    fn test_output_too_large_to_display_is_inference_error() {
        let bundle = ModelBundle::new(
            identity(),
            RegressorSet {
                temp_min: Box::new(|_: &Features| -> Result<f64> { Ok(1e307) }),
                temp_max: mean(),
                humidity: mean(),
                dew_point: mean(),
            },
            always(0),
            clear_sky(),
        );
        let err = forecast(jan_first(), DailyReading::default(), &bundle).unwrap_err();
        assert!(matches!(err, WeathercastError::Inference { .. }));
        assert!(err.to_string().contains("day 1, temp_min regressor"));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_decoder_failure_aborts() {
        let bundle = ModelBundle::new(
            identity(),
            RegressorSet {
                temp_min: mean(),
                temp_max: mean(),
                humidity: mean(),
                dew_point: mean(),
            },
            always(7),
            clear_sky(),
        );
        let err = forecast(jan_first(), DailyReading::default(), &bundle).unwrap_err();
        assert!(matches!(err, WeathercastError::Inference { .. }));
        assert!(err.to_string().contains("label decoder"));
    }

    #[test]
    fn test_scaler_errors_are_reported_as_inference() {
        let bundle = ModelBundle::new(
            Box::new(|_: &Features| -> Result<Features> {
                Err(WeathercastError::validation("bad shape"))
            }),
            RegressorSet {
                temp_min: mean(),
                temp_max: mean(),
                humidity: mean(),
                dew_point: mean(),
            },
            always(0),
            clear_sky(),
        );
        let err = forecast(jan_first(), DailyReading::default(), &bundle).unwrap_err();
        assert!(matches!(err, WeathercastError::Inference { .. }));
        assert!(err.to_string().contains("scaler"));
    }

    #[test]
    fn test_end_of_calendar_is_validation_error() {
        let err = forecast(NaiveDate::MAX, DailyReading::default(), &mean_bundle()).unwrap_err();
        assert!(err.is_client_error());
    }
}
