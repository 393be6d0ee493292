//! Fixtures shared by unit and integration tests.

pub mod graph_def;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tfaas_common::ModelDescriptor;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{FsModelStore, ModelStore, DESCRIPTOR_FILE};

pub const INPUT_NODE: &str = "input";
pub const OUTPUT_NODE: &str = "probs";
pub const GRAPH_FILE: &str = "model.pb";
pub const LABELS_FILE: &str = "labels.txt";

/// Write a model directory whose graph is `probs = relu(input)`.
///
/// Feeding K values yields K "probabilities", so a row sized like the label
/// list round-trips through ranking.
pub fn write_model(root: &Path, name: &str, labels: &[&str]) -> ModelDescriptor {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).expect("create model dir");

    let descriptor = ModelDescriptor {
        name: name.to_string(),
        model: GRAPH_FILE.to_string(),
        labels: LABELS_FILE.to_string(),
        options: vec![],
        input_node: INPUT_NODE.to_string(),
        output_node: OUTPUT_NODE.to_string(),
    };

    std::fs::write(
        dir.join(DESCRIPTOR_FILE),
        serde_json::to_vec_pretty(&descriptor).expect("serialize descriptor"),
    )
    .expect("write descriptor");
    std::fs::write(dir.join(GRAPH_FILE), graph_def::relu_graph(INPUT_NODE, OUTPUT_NODE))
        .expect("write graph");

    let mut text = labels.join("\n");
    text.push('\n');
    std::fs::write(dir.join(LABELS_FILE), text).expect("write labels");

    descriptor
}

/// Config pointing at `dir` with defaults elsewhere.
pub fn test_config(dir: &Path) -> Config {
    Config::with_model_dir(dir)
}

/// Filesystem store that counts reads and can slow down or fail graph reads.
pub struct CountingStore {
    inner: FsModelStore,
    descriptor_reads: AtomicUsize,
    graph_reads: AtomicUsize,
    label_reads: AtomicUsize,
    graph_delay: Option<Duration>,
    graph_failures: AtomicUsize,
}

impl CountingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: FsModelStore::new(root),
            descriptor_reads: AtomicUsize::new(0),
            graph_reads: AtomicUsize::new(0),
            label_reads: AtomicUsize::new(0),
            graph_delay: None,
            graph_failures: AtomicUsize::new(0),
        }
    }

    /// Sleep this long inside every graph read.
    pub fn with_graph_delay(mut self, delay: Duration) -> Self {
        self.graph_delay = Some(delay);
        self
    }

    /// Fail this many graph reads (after the delay) before reading normally.
    pub fn with_graph_failures(self, count: usize) -> Self {
        self.graph_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn descriptor_reads(&self) -> usize {
        self.descriptor_reads.load(Ordering::SeqCst)
    }

    pub fn graph_reads(&self) -> usize {
        self.graph_reads.load(Ordering::SeqCst)
    }

    pub fn label_reads(&self) -> usize {
        self.label_reads.load(Ordering::SeqCst)
    }
}

impl ModelStore for CountingStore {
    fn list_models(&self) -> Result<Vec<String>> {
        self.inner.list_models()
    }

    fn read_descriptor(&self, name: &str) -> Result<ModelDescriptor> {
        self.descriptor_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_descriptor(name)
    }

    fn read_graph(&self, dir: &str, descriptor: &ModelDescriptor) -> Result<Vec<u8>> {
        self.graph_reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.graph_delay {
            std::thread::sleep(delay);
        }

        let failing = self
            .graph_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::Storage {
                path: self.model_path(dir, &descriptor.model),
                source: std::io::Error::new(std::io::ErrorKind::Other, "graph read failed"),
            });
        }
        self.inner.read_graph(dir, descriptor)
    }

    fn read_labels(&self, dir: &str, descriptor: &ModelDescriptor) -> Result<Vec<String>> {
        self.label_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_labels(dir, descriptor)
    }

    fn model_path(&self, dir: &str, file: &str) -> PathBuf {
        self.inner.model_path(dir, file)
    }
}
