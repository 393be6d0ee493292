//! Model storage: descriptors, graph bytes and label files on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tfaas_common::ModelDescriptor;

use crate::error::{Error, Result};

/// Name of the descriptor file inside each model directory.
pub const DESCRIPTOR_FILE: &str = "params.json";

/// Read access to the model area.
///
/// The registry only talks to storage through this trait so that loads can
/// be observed (and counted) in tests.
pub trait ModelStore: Send + Sync {
    /// Names of all models in the store, sorted.
    fn list_models(&self) -> Result<Vec<String>>;

    /// Read and parse the descriptor of `name`.
    fn read_descriptor(&self, name: &str) -> Result<ModelDescriptor>;

    /// Raw graph bytes for the model at `dir`.
    fn read_graph(&self, dir: &str, descriptor: &ModelDescriptor) -> Result<Vec<u8>>;

    /// Ordered labels for the model at `dir`.
    fn read_labels(&self, dir: &str, descriptor: &ModelDescriptor) -> Result<Vec<String>>;

    /// Path used for logging and error reporting.
    fn model_path(&self, dir: &str, file: &str) -> PathBuf;
}

/// Filesystem layout: `<root>/<model>/<file>`.
#[derive(Debug, Clone)]
pub struct FsModelStore {
    root: PathBuf,
}

impl FsModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|source| Error::Storage {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ModelStore for FsModelStore {
    fn list_models(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| Error::Storage {
            path: self.root.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Storage {
                path: self.root.clone(),
                source,
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_descriptor(&self, name: &str) -> Result<ModelDescriptor> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::ModelNotFound(name.to_string()));
        }

        let path = self.model_path(name, DESCRIPTOR_FILE);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ModelNotFound(name.to_string()))
            }
            Err(source) => return Err(Error::Storage { path, source }),
        };

        serde_json::from_slice(&data).map_err(|source| Error::Parse { path, source })
    }

    fn read_graph(&self, dir: &str, descriptor: &ModelDescriptor) -> Result<Vec<u8>> {
        Self::read(&self.model_path(dir, &descriptor.model))
    }

    fn read_labels(&self, dir: &str, descriptor: &ModelDescriptor) -> Result<Vec<String>> {
        let path = self.model_path(dir, &descriptor.labels);
        let data = Self::read(&path)?;
        let text = String::from_utf8(data).map_err(|e| Error::Storage {
            path: path.clone(),
            source: std::io::Error::new(ErrorKind::InvalidData, e),
        })?;
        Ok(parse_labels(&text))
    }

    fn model_path(&self, dir: &str, file: &str) -> PathBuf {
        self.root.join(dir).join(file)
    }
}

/// Split a labels file into one label per line.
///
/// Line order is output-index order. Trailing blank lines are dropped,
/// blank lines in the middle keep their slot.
pub fn parse_labels(text: &str) -> Vec<String> {
    let mut labels: Vec<String> = text
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect();
    while labels.last().is_some_and(|l| l.trim().is_empty()) {
        labels.pop();
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_model(root: &Path, name: &str, params: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(DESCRIPTOR_FILE), params).unwrap();
    }

    #[test]
    fn test_parse_labels_trailing_blank_lines() {
        assert_eq!(parse_labels("cat\ndog\nfish\n\n\n"), vec!["cat", "dog", "fish"]);
    }

    #[test]
    fn test_parse_labels_keeps_inner_blank_and_strips_cr() {
        assert_eq!(parse_labels("a\r\n\r\nb\r\n"), vec!["a", "", "b"]);
        assert!(parse_labels("").is_empty());
    }

    #[test]
    fn test_list_models_only_dirs_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        write_model(tmp.path(), "zeta", "{}");
        write_model(tmp.path(), "alpha", "{}");
        std::fs::write(tmp.path().join("README"), "not a model").unwrap();

        let store = FsModelStore::new(tmp.path());
        assert_eq!(store.list_models().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_list_models_missing_root() {
        let store = FsModelStore::new("/nonexistent/tfaas/models");
        assert!(matches!(store.list_models(), Err(Error::Storage { .. })));
    }

    #[test]
    fn test_read_descriptor() {
        let tmp = tempfile::tempdir().unwrap();
        write_model(
            tmp.path(),
            "iris",
            r#"{"name": "iris", "model": "model.pb", "labels": "labels.txt",
                "options": [], "inputNode": "x", "outputNode": "y"}"#,
        );

        let store = FsModelStore::new(tmp.path());
        let desc = store.read_descriptor("iris").unwrap();
        assert_eq!(desc.model, "model.pb");
        assert_eq!(desc.input_node, "x");
        assert_eq!(
            store.model_path("iris", &desc.labels),
            tmp.path().join("iris").join("labels.txt")
        );
    }

    #[test]
    fn test_read_descriptor_missing_and_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        write_model(tmp.path(), "broken", r#"{"name": "broken""#);

        let store = FsModelStore::new(tmp.path());
        assert!(matches!(
            store.read_descriptor("absent"),
            Err(Error::ModelNotFound(name)) if name == "absent"
        ));
        assert!(matches!(
            store.read_descriptor("broken"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            store.read_descriptor("../etc"),
            Err(Error::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_read_labels_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("iris")).unwrap();
        let store = FsModelStore::new(tmp.path());
        let desc = ModelDescriptor {
            name: "iris".into(),
            model: "model.pb".into(),
            labels: "labels.txt".into(),
            options: vec![],
            input_node: "x".into(),
            output_node: "y".into(),
        };
        assert!(matches!(
            store.read_labels("iris", &desc),
            Err(Error::Storage { .. })
        ));
        assert!(matches!(
            store.read_graph("iris", &desc),
            Err(Error::Storage { .. })
        ));
    }
}
