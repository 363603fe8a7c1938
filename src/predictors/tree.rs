//! Array-encoded decision trees and tree ensembles
//!
//! Node `i` is a leaf when `children_left[i] == -1`. Internal nodes send a
//! sample left when `x[feature[i]] <= threshold[i]`, right otherwise. This is
//! the layout scikit-learn exports, so fitted trees convert without reshaping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{FEATURE_COUNT, Features};
use crate::{Result, WeathercastError};

const LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<usize>,
    pub threshold: Vec<f64>,
    /// Leaf output: the regression value, or the class index for classifiers
    pub value: Vec<f64>,
}

impl DecisionTree {
    /// Check that every walk from the root ends at a leaf
    pub fn validate(&self) -> std::result::Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("decision tree has no nodes".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("decision tree node arrays differ in length".to_string());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {node} has only a right child"));
                }
                continue;
            }
            if self.feature[node] >= FEATURE_COUNT {
                return Err(format!(
                    "node {node} splits on feature {} but models take {FEATURE_COUNT}",
                    self.feature[node]
                ));
            }
            // Children always come after their parent, so walks cannot loop.
            for child in [left, right] {
                let in_range = usize::try_from(child).is_ok_and(|c| c > node && c < n);
                if !in_range {
                    return Err(format!("node {node} has invalid child index {child}"));
                }
            }
        }
        Ok(())
    }

    /// Leaves must hold non-negative whole numbers to be class indices
    pub fn validate_class_leaves(&self) -> std::result::Result<(), String> {
        for (node, value) in self.value.iter().enumerate() {
            if self.children_left[node] == LEAF && class_index(*value).is_err() {
                return Err(format!("leaf {node} holds {value}, not a class index"));
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf and return its value.
    /// Callers must have validated the tree.
    #[must_use]
    pub fn leaf_value(&self, features: &Features) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return self.value[node];
            }
            let x = features.as_slice()[self.feature[node]];
            let next = if x <= self.threshold[node] {
                left
            } else {
                self.children_right[node]
            };
            node = next as usize;
        }
    }
}

/// Convert a leaf value into a class index
pub fn class_index(value: f64) -> Result<usize> {
    if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(WeathercastError::inference(format!(
            "classifier produced {value}, which is not a class index"
        )))
    }
}

/// An ensemble of trees: mean for regression, majority vote for classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    pub trees: Vec<DecisionTree>,
}

impl Forest {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.validate().map_err(|e| format!("tree {i}: {e}")))
    }

    #[must_use]
    pub fn mean(&self, features: &Features) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.leaf_value(features)).sum();
        total / self.trees.len() as f64
    }

    /// Most common class across trees; ties go to the lowest index
    pub fn vote(&self, features: &Features) -> Result<usize> {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for tree in &self.trees {
            *counts.entry(class_index(tree.leaf_value(features))?).or_default() += 1;
        }
        let mut best: Option<(usize, usize)> = None;
        for (class, count) in counts {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((class, count));
            }
        }
        best.map(|(class, _)| class)
            .ok_or_else(|| WeathercastError::inference("forest has no trees"))
    }
}
