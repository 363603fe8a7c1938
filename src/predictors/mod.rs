//! Model capabilities and the bundle of loaded models
//!
//! The forecast engine only talks to the four traits defined here. Concrete
//! backends live in the submodules and are deserialized from artifact files;
//! plain closures implement the traits as well, which keeps test doubles short.

pub mod label_encoder;
pub mod linear;
pub mod scaler;
pub mod tree;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::models::Features;

pub use label_encoder::LabelEncoder;
pub use linear::{LinearClassifier, LinearRegressor};
pub use scaler::{MinMaxScaler, ScalerArtifact, StandardScaler};
pub use tree::{DecisionTree, Forest};

/// Predicts one continuous value from a scaled feature vector
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &Features) -> Result<f64>;
}

/// Predicts a class index from a scaled feature vector
pub trait Classifier: Send + Sync {
    fn predict_class(&self, features: &Features) -> Result<usize>;
}

/// Maps a class index back to its label
pub trait LabelDecoder: Send + Sync {
    fn decode(&self, index: usize) -> Result<String>;
}

/// Stateless transform from raw to model-scaled features
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, features: &Features) -> Result<Features>;
}

impl<F> Regressor for F
where
    F: Fn(&Features) -> Result<f64> + Send + Sync,
{
    fn predict(&self, features: &Features) -> Result<f64> {
        self(features)
    }
}

impl<F> Classifier for F
where
    F: Fn(&Features) -> Result<usize> + Send + Sync,
{
    fn predict_class(&self, features: &Features) -> Result<usize> {
        self(features)
    }
}

impl<F> LabelDecoder for F
where
    F: Fn(usize) -> Result<String> + Send + Sync,
{
    fn decode(&self, index: usize) -> Result<String> {
        self(index)
    }
}

impl<F> FeatureScaler for F
where
    F: Fn(&Features) -> Result<Features> + Send + Sync,
{
    fn transform(&self, features: &Features) -> Result<Features> {
        self(features)
    }
}

/// A deserializable model file with self-consistency checks
pub trait Artifact: DeserializeOwned {
    /// Reject parameters that cannot serve the four-feature contract
    fn validate(&self) -> std::result::Result<(), String>;
}

/// Regressor backends an artifact file may contain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorArtifact {
    Linear(LinearRegressor),
    Tree(DecisionTree),
    Forest(Forest),
}

impl Regressor for RegressorArtifact {
    fn predict(&self, features: &Features) -> Result<f64> {
        match self {
            RegressorArtifact::Linear(model) => Ok(model.predict(features)),
            RegressorArtifact::Tree(tree) => Ok(tree.leaf_value(features)),
            RegressorArtifact::Forest(forest) => Ok(forest.mean(features)),
        }
    }
}

impl Artifact for RegressorArtifact {
    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            RegressorArtifact::Linear(_) => Ok(()),
            RegressorArtifact::Tree(tree) => tree.validate(),
            RegressorArtifact::Forest(forest) => forest.validate(),
        }
    }
}

/// Classifier backends an artifact file may contain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    Linear(LinearClassifier),
    Tree(DecisionTree),
    Forest(Forest),
}

impl Classifier for ClassifierArtifact {
    fn predict_class(&self, features: &Features) -> Result<usize> {
        match self {
            ClassifierArtifact::Linear(model) => model.predict_class(features),
            ClassifierArtifact::Tree(model) => tree::class_index(model.leaf_value(features)),
            ClassifierArtifact::Forest(forest) => forest.vote(features),
        }
    }
}

impl Artifact for ClassifierArtifact {
    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            ClassifierArtifact::Linear(model) => model.validate(),
            ClassifierArtifact::Tree(model) => {
                model.validate()?;
                model.validate_class_leaves()
            }
            ClassifierArtifact::Forest(forest) => {
                forest.validate()?;
                forest
                    .trees
                    .iter()
                    .try_for_each(DecisionTree::validate_class_leaves)
            }
        }
    }
}

/// The four regressors, one per forecast field
pub struct RegressorSet {
    pub temp_min: Box<dyn Regressor>,
    pub temp_max: Box<dyn Regressor>,
    pub humidity: Box<dyn Regressor>,
    pub dew_point: Box<dyn Regressor>,
}

/// Everything one forecast step needs. Built once, then only read.
pub struct ModelBundle {
    scaler: Box<dyn FeatureScaler>,
    regressors: RegressorSet,
    classifier: Box<dyn Classifier>,
    label_decoder: Box<dyn LabelDecoder>,
}

impl ModelBundle {
    #[must_use]
    pub fn new(
        scaler: Box<dyn FeatureScaler>,
        regressors: RegressorSet,
        classifier: Box<dyn Classifier>,
        label_decoder: Box<dyn LabelDecoder>,
    ) -> Self {
        Self {
            scaler,
            regressors,
            classifier,
            label_decoder,
        }
    }

    pub fn scaler(&self) -> &dyn FeatureScaler {
        self.scaler.as_ref()
    }

    pub fn regressors(&self) -> &RegressorSet {
        &self.regressors
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn label_decoder(&self) -> &dyn LabelDecoder {
        self.label_decoder.as_ref()
    }
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle").finish_non_exhaustive()
    }
}
