//! Fixtures shared by the integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use weathercast::config::ArtifactCatalog;
use weathercast::models::Features;
use weathercast::predictors::RegressorSet;
use weathercast::{ModelBundle, WeathercastError};

const MEAN_REGRESSOR: &str =
    r#"{"kind":"linear","coefficients":[0.25,0.25,0.25,0.25],"intercept":0.0}"#;

/// Rain when the scaled max temperature is at most 30, clear otherwise
const CLASSIFIER: &str = r#"{
    "kind": "tree",
    "children_left": [1, -1, -1],
    "children_right": [2, -1, -1],
    "feature": [1, 0, 0],
    "threshold": [30.0, 0.0, 0.0],
    "value": [0.0, 1.0, 0.0]
}"#;

const LABELS: &str = r#"{"classes":["Clear sky","Rain"]}"#;

const SCALER: &str = r#"{"kind":"standard","mean":[0.0,0.0,0.0,0.0],"scale":[1.0,1.0,1.0,1.0]}"#;

/// File contents keyed by the default catalogue's file names
pub fn artifact_files() -> Vec<(String, &'static str)> {
    let catalog = ArtifactCatalog::default();
    vec![
        (catalog.classifier.file_name, CLASSIFIER),
        (catalog.label_encoder.file_name, LABELS),
        (catalog.scaler.file_name, SCALER),
        (catalog.dew_point.file_name, MEAN_REGRESSOR),
        (catalog.humidity.file_name, MEAN_REGRESSOR),
        (catalog.temp_max.file_name, MEAN_REGRESSOR),
        (catalog.temp_min.file_name, MEAN_REGRESSOR),
    ]
}

/// File contents keyed by the default catalogue's remote ids
pub fn remote_files() -> Vec<(String, &'static str)> {
    let catalog = ArtifactCatalog::default();
    let ids = catalog.entries().map(|e| e.remote_id.clone());
    ids.into_iter()
        .zip(artifact_files().into_iter().map(|(_, body)| body))
        .collect()
}

pub fn write_artifacts(dir: &Path) {
    for (name, body) in artifact_files() {
        fs::write(dir.join(name), body).unwrap();
    }
}

fn mean() -> Box<dyn weathercast::predictors::Regressor> {
    Box::new(|f: &Features| -> weathercast::Result<f64> { Ok(f.mean()) })
}

/// Every regressor returns the mean of its inputs; always "Clear sky"
pub fn mean_bundle() -> ModelBundle {
    ModelBundle::new(
        Box::new(|f: &Features| -> weathercast::Result<Features> { Ok(*f) }),
        RegressorSet {
            temp_min: mean(),
            temp_max: mean(),
            humidity: mean(),
            dew_point: mean(),
        },
        Box::new(|_: &Features| -> weathercast::Result<usize> { Ok(0) }),
        Box::new(|i: usize| -> weathercast::Result<String> {
            if i == 0 {
                Ok("Clear sky".to_string())
            } else {
                Err(WeathercastError::inference(format!("unknown class {i}")))
            }
        }),
    )
}

/// Like [`mean_bundle`] but the dew point model always fails
pub fn failing_bundle() -> ModelBundle {
    ModelBundle::new(
        Box::new(|f: &Features| -> weathercast::Result<Features> { Ok(*f) }),
        RegressorSet {
            temp_min: mean(),
            temp_max: mean(),
            humidity: mean(),
            dew_point: Box::new(|_: &Features| -> weathercast::Result<f64> {
                Err(WeathercastError::inference("numeric overflow"))
            }),
        },
        Box::new(|_: &Features| -> weathercast::Result<usize> { Ok(0) }),
        Box::new(|_: usize| -> weathercast::Result<String> { Ok("Clear sky".to_string()) }),
    )
}
