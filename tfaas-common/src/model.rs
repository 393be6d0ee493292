//! Model descriptor types.

use serde::{Deserialize, Serialize};

/// Metadata describing a model's files and graph endpoints.
///
/// Stored as `params.json` in each model directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model name
    pub name: String,
    /// Graph file name, relative to the model directory
    pub model: String,
    /// Labels file name, relative to the model directory
    pub labels: String,
    /// Free-form model options
    #[serde(default)]
    pub options: Vec<String>,
    /// Name of the graph node receiving the input tensor
    #[serde(rename = "inputNode")]
    pub input_node: String,
    /// Name of the graph node producing probabilities
    #[serde(rename = "outputNode")]
    pub output_node: String,
}

impl std::fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<ModelDescriptor: name={} model={} labels={} options={:?} inputNode={} outputNode={}>",
            self.name, self.model, self.labels, self.options, self.input_node, self.output_node
        )
    }
}
