//! The single input/output page
//!
//! `GET /` shows the form with default readings, `POST /forecast` re-renders
//! it with either the five forecast days or an error message.

use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::Html,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::warn;

use crate::api::{ForecastInput, status_for};
use crate::models::{DailyReading, ForecastSequence};
use crate::web::AppState;
use crate::{Result, WeathercastError};

/// Raw form fields, kept as text so they can be shown back unchanged
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastForm {
    pub date: String,
    pub temp_min: String,
    pub temp_max: String,
    pub humidity: String,
    pub dew_point: String,
    #[serde(default)]
    pub description: String,
}

impl ForecastForm {
    /// Form pre-filled for `today`
    #[must_use]
    pub fn defaults(today: NaiveDate) -> Self {
        let reading = DailyReading::default();
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            temp_min: format!("{:.1}", reading.temp_min),
            temp_max: format!("{:.1}", reading.temp_max),
            humidity: format!("{:.1}", reading.humidity),
            dew_point: format!("{:.1}", reading.dew_point),
            description: "Clear sky".to_string(),
        }
    }

    pub fn parse(&self) -> Result<ForecastInput> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            WeathercastError::validation(format!("'{}' is not a date (YYYY-MM-DD)", self.date))
        })?;
        let reading = DailyReading::new(
            parse_number("Minimum temperature", &self.temp_min)?,
            parse_number("Maximum temperature", &self.temp_max)?,
            parse_number("Humidity", &self.humidity)?,
            parse_number("Dew point", &self.dew_point)?,
        );
        ForecastInput::new(date, reading, Some(self.description.clone()))
    }
}

fn parse_number(label: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| WeathercastError::validation(format!("{label} must be a number, got '{raw}'")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(WeathercastError::validation(format!("{label} must be a finite number")))
    }
}

/// What to show under the form
pub enum Outcome {
    Empty,
    Forecast(ForecastSequence),
    Failed(String),
}

pub async fn index() -> Html<String> {
    let form = ForecastForm::defaults(Local::now().date_naive());
    Html(render(&form, &Outcome::Empty))
}

pub async fn submit(
    State(state): State<AppState>,
    form: std::result::Result<Form<ForecastForm>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            let err = WeathercastError::validation(rejection.body_text());
            let form = ForecastForm::defaults(Local::now().date_naive());
            return (
                status_for(&err),
                Html(render(&form, &Outcome::Failed(err.user_message()))),
            );
        }
    };
    match form.parse().and_then(|input| input.run(&state.bundle)) {
        Ok(sequence) => (StatusCode::OK, Html(render(&form, &Outcome::Forecast(sequence)))),
        Err(err) => {
            let status = status_for(&err);
            if status.is_server_error() {
                warn!("Forecast failed: {}", err);
            }
            (status, Html(render(&form, &Outcome::Failed(err.user_message()))))
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn input(label: &str, name: &str, kind: &str, value: &str) -> String {
    let step = if kind == "number" { r#" step="any""# } else { "" };
    format!(
        r#"<label>{label}<input type="{kind}" name="{name}" value="{value}"{step} required></label>"#,
        value = escape_html(value),
    )
}

fn render_days(sequence: &ForecastSequence) -> String {
    let mut html = String::from("<h2>📅 5-Day Weather Forecast</h2>\n");
    for day in sequence {
        html.push_str(&format!(
            "<section class=\"day\">\n<h3>{}</h3>\n<p>🌡️ {}</p>\n<p>💧 {}</p>\n<p>🌈 {}</p>\n</section>\n<hr>\n",
            day.format_date(),
            day.format_temperature(),
            day.format_moisture(),
            escape_html(&day.format_description()),
        ));
    }
    html
}

/// Full page: form plus the outcome of the last submission
#[must_use]
pub fn render(form: &ForecastForm, outcome: &Outcome) -> String {
    let results = match outcome {
        Outcome::Empty => String::new(),
        Outcome::Forecast(sequence) => render_days(sequence),
        Outcome::Failed(message) => {
            format!("<p class=\"error\" role=\"alert\">{}</p>", escape_html(message))
        }
    };

    let description = format!(
        r#"<label>Current Description (optional)<input type="text" name="description" value="{}"></label>"#,
        escape_html(&form.description)
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Weather Forecast</title>
<style>
body {{ font-family: sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; }}
label {{ display: block; margin: 0.5rem 0; }}
input {{ display: block; width: 100%; padding: 0.3rem; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<h1>🌤️ Weather Forecast - 5 Day Prediction</h1>
<p>Enter today's weather to get the next 5 days forecast using ML models.</p>
<form method="post" action="/forecast">
{date}
{temp_min}
{temp_max}
{humidity}
{dew_point}
{description}
<button type="submit">🔮 Predict 5-Day Forecast</button>
</form>
{results}
</body>
</html>
"#,
        date = input("Today's Date", "date", "date", &form.date),
        temp_min = input("Minimum Temperature (°C)", "temp_min", "number", &form.temp_min),
        temp_max = input("Maximum Temperature (°C)", "temp_max", "number", &form.temp_max),
        humidity = input("Humidity (%)", "humidity", "number", &form.humidity),
        dew_point = input("Dew Point (°C)", "dew_point", "number", &form.dew_point),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastDay;

    fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_defaults() {
        let form = ForecastForm::defaults(jan_first());
        assert_eq!(form.date, "2024-01-01");
        assert_eq!(form.temp_min, "25.0");
        assert_eq!(form.temp_max, "35.0");
        assert_eq!(form.humidity, "70.0");
        assert_eq!(form.dew_point, "24.0");

        let input = form.parse().unwrap();
        assert_eq!(input.reading, DailyReading::default());
        assert_eq!(input.description.as_deref(), Some("Clear sky"));
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        let mut form = ForecastForm::defaults(jan_first());
        form.date = "01/02/2024".to_string();
        assert!(form.parse().unwrap_err().to_string().contains("not a date"));

        let mut form = ForecastForm::defaults(jan_first());
        form.humidity = "wet".to_string();
        assert!(form.parse().unwrap_err().to_string().contains("Humidity must be a number"));

        let mut form = ForecastForm::defaults(jan_first());
        form.dew_point = "inf".to_string();
        assert!(form.parse().unwrap_err().to_string().contains("finite"));
    }

    #[test]
    fn test_empty_page_has_form_and_defaults() {
        let html = render(&ForecastForm::defaults(jan_first()), &Outcome::Empty);
        assert!(html.contains(r#"name="temp_min" value="25.0""#));
        assert!(html.contains(r#"value="2024-01-01""#));
        assert!(html.contains("Predict 5-Day Forecast"));
        assert!(!html.contains("5-Day Weather Forecast</h2>"));
    }

    #[test]
    fn test_forecast_blocks_rendered() {
        let days: Vec<ForecastDay> = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .iter_days()
            .take(5)
            .map(|d| ForecastDay::new(d, 24.0, 33.456, 68.0, 22.1, "Rain".to_string()))
            .collect();
        let sequence = ForecastSequence::from_days(days).unwrap();
        let html = render(&ForecastForm::defaults(jan_first()), &Outcome::Forecast(sequence));

        assert_eq!(html.matches("<section class=\"day\">").count(), 5);
        assert!(html.contains("<h3>2024-01-06</h3>"));
        assert!(html.contains("Min: 24.00°C | Max: 33.46°C"));
        assert!(html.contains("Humidity: 68.00% | Dew: 22.10°C"));
        assert!(html.contains("Description: Rain"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut form = ForecastForm::defaults(jan_first());
        form.description = "<script>\"x\"</script>".to_string();
        let html = render(&form, &Outcome::Failed("bad <input>".to_string()));
        assert!(html.contains("&lt;script&gt;&quot;x&quot;&lt;/script&gt;"));
        assert!(html.contains("bad &lt;input&gt;"));
        assert!(!html.contains("<script>"));
    }
}
