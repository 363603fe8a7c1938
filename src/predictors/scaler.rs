//! Feature scalers

use serde::{Deserialize, Serialize};

use super::{Artifact, FeatureScaler};
use crate::Result;
use crate::models::{FEATURE_COUNT, Features};

/// `(x - mean) / scale`; a zero scale leaves the centred value as is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; FEATURE_COUNT],
    pub scale: [f64; FEATURE_COUNT],
}

/// `x * scale + min`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: [f64; FEATURE_COUNT],
    pub scale: [f64; FEATURE_COUNT],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
    Identity,
}

impl FeatureScaler for ScalerArtifact {
    fn transform(&self, features: &Features) -> Result<Features> {
        let x = features.0;
        let scaled = match self {
            ScalerArtifact::Standard(s) => std::array::from_fn(|i| {
                let scale = if s.scale[i] == 0.0 { 1.0 } else { s.scale[i] };
                (x[i] - s.mean[i]) / scale
            }),
            ScalerArtifact::MinMax(s) => std::array::from_fn(|i| x[i] * s.scale[i] + s.min[i]),
            ScalerArtifact::Identity => x,
        };
        Ok(Features(scaled))
    }
}

impl Artifact for ScalerArtifact {
    fn validate(&self) -> std::result::Result<(), String> {
        let params: Vec<f64> = match self {
            ScalerArtifact::Standard(s) => s.mean.iter().chain(&s.scale).copied().collect(),
            ScalerArtifact::MinMax(s) => s.min.iter().chain(&s.scale).copied().collect(),
            ScalerArtifact::Identity => Vec::new(),
        };
        if params.iter().all(|p| p.is_finite()) {
            Ok(())
        } else {
            Err("scaler parameters must be finite".to_string())
        }
    }
}
