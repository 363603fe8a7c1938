use serde::{Deserialize, Serialize};

use super::{Artifact, LabelDecoder};
use crate::{Result, WeathercastError};

/// Class labels in index order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelDecoder for LabelEncoder {
    fn decode(&self, index: usize) -> Result<String> {
        self.classes.get(index).cloned().ok_or_else(|| {
            WeathercastError::inference(format!(
                "class index {index} is outside the {} known labels",
                self.classes.len()
            ))
        })
    }
}

impl Artifact for LabelEncoder {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.classes.is_empty() {
            Err("label encoder has no classes".to_string())
        } else {
            Ok(())
        }
    }
}
