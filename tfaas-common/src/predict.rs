//! Prediction request and classification result types.

use serde::{Deserialize, Serialize};

/// A row of feature values sent by a client for classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Row {
    /// Attribute names, informational only.
    #[serde(default)]
    pub keys: Vec<String>,
    /// Attribute values, fed to the model as a single 1xK row.
    pub values: Vec<f32>,
    /// Model name. Empty means the server's default model.
    #[serde(default)]
    pub model: String,
    /// Number of ranked labels to return (all when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

impl Row {
    /// Model name if one was given.
    pub fn model_name(&self) -> Option<&str> {
        let name = self.model.trim();
        (!name.is_empty()).then_some(name)
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.values)
    }
}

/// A single label with its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelResult {
    pub label: String,
    pub probability: f32,
}

/// Result of classifying one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyResult {
    /// Identifier of the classified input (file name or model name).
    pub filename: String,
    /// Labels ordered by descending probability.
    pub labels: Vec<LabelResult>,
}
