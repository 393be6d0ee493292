//! Model loading and caching.
//!
//! A model lives in its own directory of the model area and consists of a
//! `params.json` descriptor, a frozen TensorFlow graph and a labels file.

mod registry;
mod store;

pub use registry::ModelRegistry;
pub use store::{parse_labels, FsModelStore, ModelStore, DESCRIPTOR_FILE};

use std::path::Path;

use tfaas_common::ModelDescriptor;
use tract_tensorflow::prelude::*;

use crate::error::{Error, Result};

/// A model whose graph and labels are fully loaded.
///
/// Immutable once built; shared between requests behind an `Arc`.
#[derive(Debug)]
pub struct LoadedModel {
    name: String,
    descriptor: ModelDescriptor,
    labels: Vec<String>,
    graph: InferenceModel,
}

impl LoadedModel {
    /// Read descriptor, graph and labels of `name` from `store`.
    ///
    /// Either every part loads or an error is returned; nothing is kept
    /// from a failed attempt.
    pub fn load(store: &dyn ModelStore, name: &str) -> Result<Self> {
        let descriptor = store.read_descriptor(name)?;
        if descriptor.name != name {
            tracing::warn!(
                model = %name,
                descriptor_name = %descriptor.name,
                "Descriptor name differs from model directory, using directory name"
            );
        }

        let graph_bytes = store.read_graph(name, &descriptor)?;
        let graph = parse_graph(&store.model_path(name, &descriptor.model), &graph_bytes)?;
        let labels = store.read_labels(name, &descriptor)?;

        tracing::info!(
            model = %name,
            graph = %store.model_path(name, &descriptor.model).display(),
            labels = labels.len(),
            "Loaded TF model"
        );

        Ok(Self {
            name: name.to_string(),
            descriptor,
            labels,
            graph,
        })
    }

    /// Registry key of this model (its directory name).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// Labels, index-aligned with the graph's output vector.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The parsed graph. Never mutated after load.
    pub fn graph(&self) -> &InferenceModel {
        &self.graph
    }
}

/// Parse frozen `GraphDef` bytes.
pub fn parse_graph(path: &Path, bytes: &[u8]) -> Result<InferenceModel> {
    tract_tensorflow::tensorflow()
        .model_for_read(&mut &bytes[..])
        .map_err(|e| Error::Graph {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util;

    #[test]
    fn test_load_fixture_model() {
        let tmp = tempfile::tempdir().unwrap();
        test_util::write_model(tmp.path(), "animals", &["cat", "dog", "fish"]);

        let store = FsModelStore::new(tmp.path());
        let model = LoadedModel::load(&store, "animals").unwrap();
        assert_eq!(model.name(), "animals");
        assert_eq!(model.labels(), ["cat", "dog", "fish"]);
        assert_eq!(model.descriptor().input_node, test_util::INPUT_NODE);
    }

    #[test]
    fn test_malformed_graph() {
        let tmp = tempfile::tempdir().unwrap();
        test_util::write_model(tmp.path(), "animals", &["cat"]);
        std::fs::write(tmp.path().join("animals").join(test_util::GRAPH_FILE), b"\xff\xff\xff").unwrap();

        let store = FsModelStore::new(tmp.path());
        let err = LoadedModel::load(&store, "animals").unwrap_err();
        assert!(matches!(err, Error::Graph { .. }), "unexpected error: {err}");
    }

    #[test]
    fn test_missing_labels() {
        let tmp = tempfile::tempdir().unwrap();
        test_util::write_model(tmp.path(), "animals", &["cat"]);
        std::fs::remove_file(tmp.path().join("animals").join(test_util::LABELS_FILE)).unwrap();

        let store = FsModelStore::new(tmp.path());
        let err = LoadedModel::load(&store, "animals").unwrap_err();
        assert!(matches!(err, Error::Storage { .. }), "unexpected error: {err}");
    }
}
